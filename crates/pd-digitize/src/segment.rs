use log::debug;
use pd_contour::{ChainApprox, ContourSet, find_external_contours};
use pd_core::EdgeMask;

use crate::config::SegmentConfig;

/// External outlines of the remaining strokes whose enclosed area exceeds
/// `min_area`. Contours keep every border pixel so the refiner sees the
/// full outline.
pub fn segment(mask: &EdgeMask, cfg: &SegmentConfig) -> ContourSet {
    let binary = EdgeMask::from_threshold(&mask.as_view(), cfg.binary_threshold);
    let all = find_external_contours(&binary, ChainApprox::None);
    let kept = all.filtered(|c| c.area > cfg.min_area);
    debug!(
        "segment: contours={} kept={} min_area={}",
        all.len(),
        kept.len(),
        cfg.min_area
    );
    kept
}
