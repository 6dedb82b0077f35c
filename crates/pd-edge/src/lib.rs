//! Edge detection on 8-bit rasters.
//!
//! [`CannyDetector`] implements the classic gradient / non-maximum
//! suppression / hysteresis chain and returns an [`pd_core::EdgeMask`].
//! The detector owns its scratch buffers so repeated calls on same-sized
//! images do not allocate.

pub mod canny;

pub use canny::{CannyConfig, CannyDetector, canny_u8};
