use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    #[error("need at least {min} distinct points, got {got}")]
    TooFewPoints { got: usize, min: usize },

    #[error("degenerate spline system")]
    Degenerate,

    #[error("non-finite value in spline input or result")]
    NonFinite,
}
