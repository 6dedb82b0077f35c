use std::path::Path;

use log::debug;
use pd_core::{EdgeMask, Image};
use pd_edge::{CannyConfig, CannyDetector};
use pd_filter::{ClaheConfig, clahe_u8, median_blur_u8};
use pd_morph::{StructuringElement, close};

use crate::config::PreprocessConfig;
use crate::error::{LoadError, PreprocessError};

/// Decodes any supported raster format and converts it to 8-bit grayscale.
pub fn load_gray(path: &Path) -> Result<Image<u8>, PreprocessError> {
    let decoded = image::open(path).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let gray = decoded.to_luma8();
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        }
        .into());
    }

    Ok(Image::from_vec(w as usize, h as usize, gray.into_raw())?)
}

/// Loads `path` and runs [`preprocess_image`] on it.
pub fn preprocess(path: &Path, cfg: &PreprocessConfig) -> Result<EdgeMask, PreprocessError> {
    let img = load_gray(path)?;
    debug!(
        "preprocess: loaded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    preprocess_image(&img, cfg)
}

/// Grayscale image to binary stroke mask.
///
/// Contrast equalization, then a median filter, then hysteresis edges, then
/// a morphological closing that bridges the small gaps the edge detector
/// leaves along strokes.
pub fn preprocess_image(img: &Image<u8>, cfg: &PreprocessConfig) -> Result<EdgeMask, PreprocessError> {
    cfg.validate().map_err(PreprocessError::InvalidConfig)?;
    if img.is_empty() {
        return Err(pd_core::Error::EmptyImage.into());
    }

    let clahe_cfg = ClaheConfig {
        clip_limit: cfg.clahe_clip_limit,
        tiles_x: cfg.clahe_tiles.0,
        tiles_y: cfg.clahe_tiles.1,
    };
    let equalized = clahe_u8(&img.as_view(), &clahe_cfg);
    let filtered = median_blur_u8(&equalized.as_view(), cfg.median_ksize);

    let (low, high) = cfg.edge_thresholds.resolve(&filtered.as_view());
    let canny_cfg = CannyConfig {
        low_thresh: low,
        high_thresh: high,
    };
    let edges = CannyDetector::new().detect_u8(&filtered.as_view(), &canny_cfg);
    debug!(
        "preprocess: thresholds low={} high={} edge_px={}",
        low,
        high,
        edges.count()
    );

    let closed = close(
        &edges,
        StructuringElement::Square(cfg.close_size),
        cfg.close_iterations,
    );
    Ok(closed)
}
