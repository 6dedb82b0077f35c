//! Umbrella crate for the plot-digitizer workspace.
//!
//! Re-exports the pipeline together with the geometry and contour types that
//! appear in its results.

pub use pd_contour::{Contour, ContourId, ContourSet};
pub use pd_core::{EdgeMask, Image, ImageView, Point2f, Point2i, Segment2i};
pub use pd_digitize::*;
pub use pd_spline::{ParametricSpline, SplineError};
