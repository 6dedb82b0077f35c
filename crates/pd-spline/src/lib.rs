//! Smoothing cubic splines.
//!
//! [`ParametricSpline::fit`] parametrizes an ordered point sequence by
//! normalized chord length and fits one natural cubic smoothing spline per
//! coordinate with a shared smoothing weight. The weight is chosen so that
//! the residual sum of squares does not exceed the requested `smoothing`.
//!
//! The fit follows the Reinsch formulation: with knot spacings `h`, the
//! second-derivative values `γ` solve `(R + αQᵀQ)γ = Qᵀy`, a symmetric
//! pentadiagonal system factored once per trial weight.

mod banded;
mod error;
mod natural;
mod parametric;

pub use error::SplineError;
pub use natural::NaturalCubic;
pub use parametric::{MIN_POINTS, ParametricSpline};
