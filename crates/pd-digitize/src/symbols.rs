use log::{debug, warn};
use pd_contour::{ChainApprox, find_external_contours};
use pd_core::{EdgeMask, raster::fill_polygon};
use pd_morph::{StructuringElement, dilate};

use crate::auxiliary::derive_auxiliary_edges;
use crate::config::SymbolFilterConfig;
use crate::error::StageError;

/// Erases small, round closed shapes (markers, dots, circled labels).
///
/// Candidates are the external contours of the mask's own edges. A contour
/// is a symbol when its area lies strictly inside `area_range` and its
/// circularity exceeds `circularity_min`; symbols are filled, grown by
/// `fill_margin` pixels and subtracted from `mask`. Any internal failure is
/// logged and `mask` is returned unchanged.
pub fn remove_symbols(mask: &EdgeMask, cfg: &SymbolFilterConfig) -> EdgeMask {
    match try_remove_symbols(mask, cfg) {
        Ok(cleaned) => cleaned,
        Err(err) => {
            warn!("symbol removal skipped: {err}");
            mask.clone()
        }
    }
}

fn try_remove_symbols(mask: &EdgeMask, cfg: &SymbolFilterConfig) -> Result<EdgeMask, StageError> {
    let (lo, hi) = cfg.area_range;
    if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
        return Err(StageError::InvalidConfig(format!(
            "area_range must be finite and ordered, got {:?}",
            cfg.area_range
        )));
    }

    let aux = derive_auxiliary_edges(mask, cfg.aux_low, cfg.aux_high);
    let contours = find_external_contours(&aux, ChainApprox::Simple);

    let mut removal = EdgeMask::empty(mask.width(), mask.height());
    let mut symbols = 0usize;
    for c in contours.iter() {
        if c.area > lo && c.area < hi && c.circularity() > cfg.circularity_min {
            fill_polygon(&mut removal, &c.points);
            symbols += 1;
        }
    }
    debug!(
        "remove_symbols: candidates={} symbols={}",
        contours.len(),
        symbols
    );
    if symbols == 0 {
        return Ok(mask.clone());
    }

    let removal = dilate(&removal, StructuringElement::Square(3), cfg.fill_margin);
    Ok(mask.subtract(&removal)?)
}

#[cfg(test)]
mod tests {
    use pd_core::EdgeMask;

    use super::remove_symbols;
    use crate::config::SymbolFilterConfig;

    fn ring(mask: &mut EdgeMask, cx: f32, cy: f32, r_in: f32, r_out: f32) {
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                let d = (x as f32 - cx).hypot(y as f32 - cy);
                if d >= r_in && d <= r_out {
                    mask.set(x, y, true);
                }
            }
        }
    }

    fn band(mask: &mut EdgeMask, y0: usize, y1: usize, x0: usize, x1: usize) {
        for y in y0..y1 {
            for x in x0..x1 {
                mask.set(x, y, true);
            }
        }
    }

    #[test]
    fn small_ring_is_erased_long_band_survives() {
        let mut mask = EdgeMask::empty(120, 60);
        ring(&mut mask, 25.0, 30.0, 4.0, 7.0);
        band(&mut mask, 28, 33, 50, 115);
        let band_px = 5 * 65;

        let out = remove_symbols(&mask, &SymbolFilterConfig::default());
        for y in 20..41 {
            for x in 15..36 {
                assert!(!out.is_edge(x, y), "symbol pixel ({x},{y}) left behind");
            }
        }
        assert_eq!(out.count(), band_px);
    }

    #[test]
    fn nothing_to_remove_returns_input() {
        let mut mask = EdgeMask::empty(80, 40);
        band(&mut mask, 10, 14, 5, 75);
        assert_eq!(remove_symbols(&mask, &SymbolFilterConfig::default()), mask);

        let blank = EdgeMask::empty(30, 30);
        assert!(remove_symbols(&blank, &SymbolFilterConfig::default()).is_blank());
    }

    #[test]
    fn invalid_range_leaves_mask_untouched() {
        let mut mask = EdgeMask::empty(40, 40);
        ring(&mut mask, 20.0, 20.0, 4.0, 7.0);
        let cfg = SymbolFilterConfig {
            area_range: (800.0, 10.0),
            ..SymbolFilterConfig::default()
        };
        assert_eq!(remove_symbols(&mask, &cfg), mask);
    }

    #[test]
    fn output_is_subset_of_input() {
        let mut mask = EdgeMask::empty(64, 64);
        ring(&mut mask, 20.0, 20.0, 3.0, 6.0);
        ring(&mut mask, 45.0, 45.0, 10.0, 12.0);
        let out = remove_symbols(&mask, &SymbolFilterConfig::default());
        for (x, y) in out.iter_edges() {
            assert!(mask.is_edge(x, y));
        }
    }
}
