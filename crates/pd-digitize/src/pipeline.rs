use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use pd_core::{EdgeMask, Image};

use crate::config::{GraphTypeHint, PipelineConfig};
use crate::error::PipelineError;
use crate::grid::remove_grid;
use crate::preprocess::{load_gray, preprocess_image};
use crate::refine::{RefinedCurve, refine};
use crate::segment::segment;
use crate::symbols::remove_symbols;

/// Result of running the pipeline on one plot.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Curves {
        /// Stroke mask after symbol and grid removal.
        mask: EdgeMask,
        curves: Vec<RefinedCurve>,
    },
    /// The image was readable but no stroke survived cleaning.
    NoCurvesFound { mask: EdgeMask },
}

impl Extraction {
    pub fn mask(&self) -> &EdgeMask {
        match self {
            Extraction::Curves { mask, .. } | Extraction::NoCurvesFound { mask } => mask,
        }
    }

    pub fn curves(&self) -> &[RefinedCurve] {
        match self {
            Extraction::Curves { curves, .. } => curves,
            Extraction::NoCurvesFound { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Extraction::NoCurvesFound { .. })
    }
}

/// Per-image results of [`process_bode_pair`]; one failing image does not
/// affect the other.
#[derive(Debug)]
pub struct BodeExtraction {
    pub magnitude: Result<Extraction, PipelineError>,
    pub phase: Result<Extraction, PipelineError>,
}

/// Loads `path` and extracts its curves.
pub fn process_graph(path: impl AsRef<Path>, cfg: &PipelineConfig) -> Result<Extraction, PipelineError> {
    let path = path.as_ref();
    let img = load_gray(path)?;
    info!(
        "process_graph {} ({}x{}, {})",
        path.display(),
        img.width(),
        img.height(),
        cfg.hint
    );
    process_image(&img, cfg)
}

/// [`process_graph`] with the built-in preset for `hint`.
pub fn process_graph_with_hint(path: impl AsRef<Path>, hint: GraphTypeHint) -> Result<Extraction, PipelineError> {
    process_graph(path, &PipelineConfig::for_hint(hint))
}

/// Runs every stage on an already decoded grayscale image.
pub fn process_image(img: &Image<u8>, cfg: &PipelineConfig) -> Result<Extraction, PipelineError> {
    let start = Instant::now();
    debug!(
        "process_image start w={} h={} hint={}",
        img.width(),
        img.height(),
        cfg.hint
    );

    let edges = preprocess_image(img, &cfg.preprocess)?;
    debug!("process_image: preprocessed edge_px={}", edges.count());

    let without_symbols = remove_symbols(&edges, &cfg.symbols);
    let mask = remove_grid(&without_symbols, &cfg.grid);
    debug!(
        "process_image: cleaned edge_px={} (symbols -{}, grid -{})",
        mask.count(),
        edges.count() - without_symbols.count(),
        without_symbols.count() - mask.count()
    );

    let contours = segment(&mask, &cfg.segment);
    let curves = refine(&contours, &cfg.refine);

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    if curves.is_empty() {
        info!("no curves found ({elapsed_ms:.1} ms)");
        return Ok(Extraction::NoCurvesFound { mask });
    }
    info!(
        "extracted {} curve(s) from {} contour(s) in {elapsed_ms:.1} ms",
        curves.len(),
        contours.len()
    );
    Ok(Extraction::Curves { mask, curves })
}

/// Processes a magnitude and a phase plot with the same configuration.
///
/// With the `parallel` feature the two images run concurrently.
pub fn process_bode_pair(
    magnitude: impl AsRef<Path>,
    phase: impl AsRef<Path>,
    cfg: &PipelineConfig,
) -> BodeExtraction {
    let (magnitude, phase) = (magnitude.as_ref(), phase.as_ref());

    #[cfg(feature = "parallel")]
    let (magnitude, phase) = rayon::join(|| process_graph(magnitude, cfg), || process_graph(phase, cfg));
    #[cfg(not(feature = "parallel"))]
    let (magnitude, phase) = (process_graph(magnitude, cfg), process_graph(phase, cfg));

    BodeExtraction { magnitude, phase }
}

#[cfg(test)]
mod tests {
    use pd_core::{EdgeMask, Image};

    use super::{Extraction, process_image};
    use crate::config::PipelineConfig;
    use crate::error::{PipelineError, PreprocessError};

    #[test]
    fn blank_page_has_no_curves() {
        let img = Image::new_fill(64, 48, 255u8);
        let out = process_image(&img, &PipelineConfig::default()).expect("runs");
        assert!(out.is_empty());
        assert!(out.curves().is_empty());
        assert_eq!(out.mask().dims(), (64, 48));
        assert!(out.mask().is_blank());
    }

    #[test]
    fn empty_image_is_an_error() {
        let img = Image::new_fill(0, 0, 0u8);
        let err = process_image(&img, &PipelineConfig::default()).expect_err("empty");
        assert!(matches!(
            err,
            PipelineError::Preprocess(PreprocessError::Image(pd_core::Error::EmptyImage))
        ));
        assert!(!err.is_load_error());
    }

    #[test]
    fn accessors_cover_both_variants() {
        let none = Extraction::NoCurvesFound {
            mask: EdgeMask::empty(2, 2),
        };
        let some = Extraction::Curves {
            mask: EdgeMask::empty(2, 2),
            curves: Vec::new(),
        };
        assert!(none.is_empty());
        assert!(!some.is_empty());
        assert_eq!(none.mask(), some.mask());
    }
}
