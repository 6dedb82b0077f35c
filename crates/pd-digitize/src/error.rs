use std::path::PathBuf;

use pd_hough::HoughError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read image {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image {} has zero width or height", path.display())]
    Empty { path: PathBuf },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Decode { path, .. } | LoadError::Empty { path } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("invalid preprocessing config: {0}")]
    InvalidConfig(String),
    #[error("image error: {0}")]
    Image(#[from] pd_core::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
}

impl PipelineError {
    /// True when the input file could not be read or decoded.
    pub fn is_load_error(&self) -> bool {
        matches!(self, PipelineError::Preprocess(PreprocessError::Load(_)))
    }
}

/// Failure inside a best-effort stage. Never leaves the crate: the stage
/// logs it and hands back its input unchanged.
#[derive(Debug, Error)]
pub(crate) enum StageError {
    #[error(transparent)]
    Image(#[from] pd_core::Error),
    #[error("line detection: {0}")]
    Lines(#[from] HoughError),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{LoadError, PipelineError, PreprocessError};

    #[test]
    fn load_errors_are_classified() {
        let load = PipelineError::from(PreprocessError::from(LoadError::Empty {
            path: PathBuf::from("blank.png"),
        }));
        assert!(load.is_load_error());
        assert!(load.to_string().contains("blank.png"));

        let cfg = PipelineError::from(PreprocessError::InvalidConfig("bad".into()));
        assert!(!cfg.is_load_error());
        let img = PipelineError::from(PreprocessError::from(pd_core::Error::EmptyImage));
        assert!(!img.is_load_error());
    }
}
