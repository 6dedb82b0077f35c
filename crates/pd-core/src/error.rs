use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch {
        expected: usize,
        actual: usize,
    },
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    InvalidStride,
    EmptyImage,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::DimensionMismatch { expected, actual } => write!(
                f,
                "dimension mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::InvalidStride => write!(f, "invalid stride"),
            Self::EmptyImage => write!(f, "image has zero width or height"),
        }
    }
}

impl std::error::Error for Error {}
