//! External contour extraction from binary edge masks.
//!
//! [`find_external_contours`] follows the outer border of every 8-connected
//! foreground component, in raster order of each component's top-left pixel.
//! Components that lie inside an earlier component's outer border are not
//! reported. Borders are traced counterclockwise on screen starting from the
//! component's first pixel in raster order.
//!
//! Contours are stored in a [`ContourSet`] arena and addressed by
//! [`ContourId`]. Each contour carries its shoelace area and closed perimeter
//! measured on pixel centers.

mod set;
mod trace;

pub use set::{Contour, ContourId, ContourSet, circularity, polygon_area, polygon_perimeter};
pub use trace::{ChainApprox, find_external_contours};
