//! Digitizes curves from raster plots.
//!
//! The pipeline turns a plot image into a list of smooth polylines in pixel
//! coordinates (origin top-left, y down):
//!
//! 1. [`preprocess`]: contrast equalization, median denoising, hysteresis
//!    edges and a closing that bridges small gaps, yielding a binary mask.
//! 2. [`remove_symbols`]: erases small round markers.
//! 3. [`remove_grid`]: erases long straight strokes found with the
//!    probabilistic Hough transform.
//! 4. [`segment`]: external contours of what is left, filtered by area.
//! 5. [`refine`]: a smoothing spline per contour, resampled to a fixed count.
//!
//! [`process_graph`] runs all five; [`process_bode_pair`] runs a magnitude
//! and a phase plot side by side. Numeric presets are picked with
//! [`GraphTypeHint`] and can be overridden field by field through
//! [`PipelineConfig`], which is serde-serializable.
//!
//! Cleaning stages are best effort: they log a warning and pass their input
//! through instead of failing. Only unreadable input and invalid
//! preprocessing parameters surface as [`PipelineError`].

mod auxiliary;
mod config;
mod error;
mod grid;
mod pipeline;
mod preprocess;
mod refine;
mod segment;
mod symbols;

pub use auxiliary::derive_auxiliary_edges;
pub use config::{
    EdgeThresholds, GraphTypeHint, GridRemovalConfig, PipelineConfig, PreprocessConfig, RefineConfig,
    SegmentConfig, SymbolFilterConfig,
};
pub use error::{LoadError, PipelineError, PreprocessError};
pub use grid::remove_grid;
pub use pipeline::{BodeExtraction, Extraction, process_bode_pair, process_graph, process_graph_with_hint, process_image};
pub use preprocess::{load_gray, preprocess, preprocess_image};
pub use refine::{RefinedCurve, refine};
pub use segment::segment;
pub use symbols::remove_symbols;
