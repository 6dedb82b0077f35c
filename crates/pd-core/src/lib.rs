//! Foundational primitives for plot digitization.
//!
//! ## Rasters
//! [`Image<T>`] is an owned, row-major, tightly packed buffer with the origin
//! at the top-left pixel. [`ImageView`] borrows pixels with an element stride
//! (not byte stride), so it can wrap buffers handed over by image decoders
//! without copying.
//!
//! ## Edge Masks
//! [`EdgeMask`] is a binary raster whose samples are exactly [`BACKGROUND`]
//! or [`EDGE`]. Every constructor normalizes its input, so downstream stages
//! can rely on the two-value domain.
//!
//! ## Border Modes
//! Neighborhood operators resolve out-of-range indices with clamp, constant
//! fill, or reflect-101. Reflect-101 mirrors around edge pixels without
//! repeating edge elements.
//!
//! ## Coordinates
//! Integer coordinates refer to pixel centers. Raster drawing in [`raster`]
//! treats a pixel as covered when its center is covered.

mod border;
mod error;
mod geom;
mod image;
mod mask;
pub mod raster;

pub use border::{BorderMode, resolve_index};
pub use error::Error;
pub use geom::{Point2f, Point2i, Segment2i, Vec2f};
pub use image::{Image, ImageView};
pub use mask::{BACKGROUND, EDGE, EdgeMask};
