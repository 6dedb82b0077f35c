use pd_core::EdgeMask;
use pd_edge::{CannyConfig, CannyDetector};

/// Edges of a binary mask, used by the cleaning stages as a second view of
/// the preprocessed strokes. On a 0/255 mask every stroke boundary produces
/// edges on both sides of the step.
pub fn derive_auxiliary_edges(mask: &EdgeMask, low: f32, high: f32) -> EdgeMask {
    let cfg = CannyConfig {
        low_thresh: low,
        high_thresh: high,
    };
    CannyDetector::new().detect_u8(&mask.as_view(), &cfg)
}
