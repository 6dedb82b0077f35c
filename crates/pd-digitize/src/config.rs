use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use pd_core::ImageView;
use pd_filter::median_intensity;
use serde::{Deserialize, Serialize};

/// Kind of plot being digitized; only selects numeric presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphTypeHint {
    #[default]
    Generic,
    Bode,
    Nyquist,
}

impl fmt::Display for GraphTypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphTypeHint::Generic => "generic",
            GraphTypeHint::Bode => "bode",
            GraphTypeHint::Nyquist => "nyquist",
        };
        f.write_str(name)
    }
}

impl FromStr for GraphTypeHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" => Ok(GraphTypeHint::Generic),
            "bode" => Ok(GraphTypeHint::Bode),
            "nyquist" => Ok(GraphTypeHint::Nyquist),
            other => Err(format!(
                "unknown graph type {other:?} (expected generic, bode or nyquist)"
            )),
        }
    }
}

/// Hysteresis thresholds for the main edge detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeThresholds {
    Fixed { low: f32, high: f32 },
    /// Scaled from the median intensity of the filtered image.
    MedianScaled { low_factor: f32, high_factor: f32 },
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        EdgeThresholds::Fixed {
            low: 50.0,
            high: 150.0,
        }
    }
}

impl EdgeThresholds {
    /// `(low, high)` for `img`. Median-scaled values are floored and clamped
    /// to `[0, 255]`.
    pub fn resolve(&self, img: &ImageView<'_, u8>) -> (f32, f32) {
        match *self {
            EdgeThresholds::Fixed { low, high } => (low, high),
            EdgeThresholds::MedianScaled {
                low_factor,
                high_factor,
            } => {
                let median = median_intensity(img).unwrap_or(0.0);
                let low = (low_factor as f64 * median).max(0.0).floor();
                let high = (high_factor as f64 * median).min(255.0).floor();
                (low as f32, high as f32)
            }
        }
    }

    fn is_valid(&self) -> bool {
        let (a, b) = match *self {
            EdgeThresholds::Fixed { low, high } => (low, high),
            EdgeThresholds::MedianScaled {
                low_factor,
                high_factor,
            } => (low_factor, high_factor),
        };
        a.is_finite() && b.is_finite() && a >= 0.0 && b >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub clahe_clip_limit: f32,
    pub clahe_tiles: (usize, usize),
    pub median_ksize: usize,
    pub edge_thresholds: EdgeThresholds,
    /// Side of the square closing element.
    pub close_size: usize,
    pub close_iterations: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            clahe_clip_limit: 3.0,
            clahe_tiles: (8, 8),
            median_ksize: 5,
            edge_thresholds: EdgeThresholds::default(),
            close_size: 3,
            close_iterations: 2,
        }
    }
}

impl PreprocessConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !self.clahe_clip_limit.is_finite() {
            return Err(format!("clahe_clip_limit must be finite, got {}", self.clahe_clip_limit));
        }
        if self.clahe_tiles.0 == 0 || self.clahe_tiles.1 == 0 {
            return Err(format!("clahe_tiles must be non-zero, got {:?}", self.clahe_tiles));
        }
        if self.close_size == 0 {
            return Err("close_size must be non-zero".to_string());
        }
        if !self.edge_thresholds.is_valid() {
            return Err(format!(
                "edge thresholds must be finite and non-negative, got {:?}",
                self.edge_thresholds
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolFilterConfig {
    pub aux_low: f32,
    pub aux_high: f32,
    /// Exclusive `(min, max)` contour area of a symbol.
    pub area_range: (f64, f64),
    pub circularity_min: f64,
    /// Dilation, in pixels, applied to the filled symbol mask.
    pub fill_margin: usize,
}

impl Default for SymbolFilterConfig {
    fn default() -> Self {
        Self {
            aux_low: 50.0,
            aux_high: 150.0,
            area_range: (10.0, 800.0),
            circularity_min: 0.7,
            fill_margin: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridRemovalConfig {
    pub aux_low: f32,
    pub aux_high: f32,
    pub rho: f32,
    pub theta: f32,
    pub vote_threshold: usize,
    pub min_length: usize,
    pub max_gap: usize,
    /// Width of the stroke painted over each detected segment.
    pub stroke_width: f32,
    pub band_max_angle_deg: f32,
    pub band_max_width: f32,
    /// Keep removal pixels that a crossing stroke passes straight through.
    pub preserve_crossings: bool,
    pub seed: u64,
    pub time_budget: Option<Duration>,
}

impl Default for GridRemovalConfig {
    fn default() -> Self {
        Self {
            aux_low: 50.0,
            aux_high: 150.0,
            rho: 1.0,
            theta: std::f32::consts::PI / 180.0,
            vote_threshold: 100,
            min_length: 50,
            max_gap: 5,
            stroke_width: 2.0,
            band_max_angle_deg: 2.0,
            band_max_width: 8.0,
            preserve_crossings: true,
            seed: 0x5eed,
            time_budget: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Mask samples strictly above this value count as foreground.
    pub binary_threshold: u8,
    /// Contours with area `<= min_area` are dropped.
    pub min_area: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            binary_threshold: 50,
            min_area: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    /// Upper bound on the residual sum of squares of each fit.
    pub smoothing: f64,
    pub resample_count: usize,
    pub min_points: usize,
    pub time_budget: Option<Duration>,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.01,
            resample_count: 1000,
            min_points: pd_spline::MIN_POINTS,
            time_budget: None,
        }
    }
}

/// Every tunable of the pipeline, grouped per stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub hint: GraphTypeHint,
    pub preprocess: PreprocessConfig,
    pub symbols: SymbolFilterConfig,
    pub grid: GridRemovalConfig,
    pub segment: SegmentConfig,
    pub refine: RefineConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_hint(GraphTypeHint::Generic)
    }
}

impl PipelineConfig {
    /// Built-in presets per plot kind.
    pub fn for_hint(hint: GraphTypeHint) -> Self {
        let mut preprocess = PreprocessConfig::default();
        let mut grid = GridRemovalConfig::default();

        if hint == GraphTypeHint::Bode {
            preprocess.edge_thresholds = EdgeThresholds::MedianScaled {
                low_factor: 0.4,
                high_factor: 1.2,
            };
            grid.vote_threshold = 80;
            grid.min_length = 30;
            grid.max_gap = 10;
        }

        Self {
            hint,
            preprocess,
            symbols: SymbolFilterConfig::default(),
            grid,
            segment: SegmentConfig::default(),
            refine: RefineConfig::default(),
        }
    }
}
