//! Intensity conditioning for scanned plot rasters.
//!
//! - [`clahe_u8`]: tile-based contrast-limited adaptive histogram
//!   equalization. Tiles that do not divide the image evenly are filled with
//!   reflect-101 samples; the per-pixel result is a bilinear blend of the four
//!   nearest tile mappings.
//! - [`median_blur_u8`]: square rank-order filter with replicated borders.
//!   Suppresses salt-and-pepper noise while keeping step edges sharp.
//! - [`median_intensity`]: the statistical median of all pixels, used for
//!   brightness-adaptive edge thresholds.

mod clahe;
mod median;
mod stats;

pub use clahe::{ClaheConfig, clahe_u8};
pub use median::median_blur_u8;
pub use stats::{histogram_u8, median_intensity};
