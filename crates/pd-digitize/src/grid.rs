use log::{debug, warn};
use pd_core::raster::{draw_segment, fill_polygon};
use pd_core::{EdgeMask, Point2f, Point2i, Segment2i, Vec2f};
use pd_hough::{HoughConfig, detect_segments};

use crate::auxiliary::derive_auxiliary_edges;
use crate::config::GridRemovalConfig;
use crate::error::StageError;

/// Erases long straight strokes (grid lines, axes, frames).
///
/// Segments are detected with the probabilistic Hough transform on the
/// mask's own edges and painted `stroke_width` wide into a removal mask. A
/// thick stroke shows up as two parallel edge segments, so the strip between
/// every pair of nearly parallel, overlapping segments no further apart than
/// `band_max_width` is filled as well. The removal mask is then subtracted.
///
/// With `preserve_crossings`, removal pixels where another stroke runs
/// straight through the erased strip are left in place, so a curve crossing
/// a grid line stays in one piece.
///
/// On an internal failure (including an exhausted time budget) the input is
/// returned unchanged.
pub fn remove_grid(mask: &EdgeMask, cfg: &GridRemovalConfig) -> EdgeMask {
    match try_remove_grid(mask, cfg) {
        Ok(cleaned) => cleaned,
        Err(err) => {
            warn!("grid removal skipped: {err}");
            mask.clone()
        }
    }
}

fn try_remove_grid(mask: &EdgeMask, cfg: &GridRemovalConfig) -> Result<EdgeMask, StageError> {
    if !(cfg.stroke_width.is_finite() && cfg.band_max_angle_deg.is_finite() && cfg.band_max_width.is_finite()) {
        return Err(StageError::InvalidConfig(
            "stroke_width and band limits must be finite".to_string(),
        ));
    }

    let aux = derive_auxiliary_edges(mask, cfg.aux_low, cfg.aux_high);
    let hough = HoughConfig {
        rho: cfg.rho,
        theta: cfg.theta,
        vote_threshold: cfg.vote_threshold,
        min_length: cfg.min_length,
        max_gap: cfg.max_gap,
        seed: cfg.seed,
        time_budget: cfg.time_budget,
    };
    let segments = detect_segments(&aux, &hough)?;
    if segments.is_empty() {
        debug!("remove_grid: no segments");
        return Ok(mask.clone());
    }

    let mut removal = EdgeMask::empty(mask.width(), mask.height());
    for seg in &segments {
        draw_segment(&mut removal, seg, cfg.stroke_width);
    }

    let mut bands = 0usize;
    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            if let Some(quad) = stroke_band(a, b, cfg.band_max_angle_deg, cfg.band_max_width) {
                fill_polygon(&mut removal, &quad);
                bands += 1;
            }
        }
    }

    let mut kept = 0usize;
    if cfg.preserve_crossings {
        let max_run = (3.0 * (cfg.band_max_width + cfg.stroke_width)).ceil().max(1.0) as usize;
        let crossings = crossing_pixels(mask, &removal, max_run);
        kept = crossings.len();
        for (x, y) in crossings {
            removal.set(x, y, false);
        }
    }
    debug!(
        "remove_grid: segments={} bands={} removal_px={} kept_crossing_px={}",
        segments.len(),
        bands,
        removal.count(),
        kept
    );

    Ok(mask.subtract(&removal)?)
}

/// Ray directions over a half turn probed around each removal pixel.
const CROSSING_DIRECTIONS: usize = 24;
/// Surviving mask pixels a ray must meet right after leaving the removal.
const CROSSING_DEPTH: usize = 3;

/// Mask pixels under `removal` that lie on a straight line leaving the
/// removal within `max_run` steps on both sides and continuing into
/// surviving mask pixels.
fn crossing_pixels(mask: &EdgeMask, removal: &EdgeMask, max_run: usize) -> Vec<(usize, usize)> {
    let dirs: Vec<Vec2f> = (0..CROSSING_DIRECTIONS)
        .map(|k| {
            let a = std::f32::consts::PI * k as f32 / CROSSING_DIRECTIONS as f32;
            Vec2f {
                x: a.cos(),
                y: a.sin(),
            }
        })
        .collect();

    removal
        .iter_edges()
        .filter(|&(x, y)| mask.is_edge(x, y))
        .filter(|&(x, y)| {
            let origin = Point2f::new(x as f32, y as f32);
            dirs.iter().any(|&d| {
                ray_meets_stroke(mask, removal, origin, d, max_run)
                    && ray_meets_stroke(mask, removal, origin, d * -1.0, max_run)
            })
        })
        .collect()
}

fn ray_meets_stroke(
    mask: &EdgeMask,
    removal: &EdgeMask,
    origin: Point2f,
    dir: Vec2f,
    max_run: usize,
) -> bool {
    let (w, h) = mask.dims();
    let mut depth = 0usize;
    for t in 1..=max_run + CROSSING_DEPTH {
        let p = origin + dir * t as f32;
        let (x, y) = (p.x.round(), p.y.round());
        if x < 0.0 || y < 0.0 || x as usize >= w || y as usize >= h {
            return false;
        }
        let (x, y) = (x as usize, y as usize);

        if removal.is_edge(x, y) {
            if depth > 0 {
                return false;
            }
            continue;
        }
        if !mask.is_edge(x, y) {
            return false;
        }
        depth += 1;
        if depth == CROSSING_DEPTH {
            return true;
        }
    }
    false
}

/// Quadrilateral spanning the common extent of two nearly parallel
/// segments, or `None` when they are too steep to each other, too far apart
/// or do not overlap along `a`.
pub(crate) fn stroke_band(
    a: &Segment2i,
    b: &Segment2i,
    max_angle_deg: f32,
    max_width: f32,
) -> Option<[Point2i; 4]> {
    let (len_a, len_b) = (a.length(), b.length());
    if len_a < 1.0 || len_b < 1.0 {
        return None;
    }
    let da = a.direction() * (1.0 / len_a);
    let db = b.direction() * (1.0 / len_b);

    let cos = da.dot(db).abs().min(1.0);
    if cos.acos().to_degrees() > max_angle_deg {
        return None;
    }

    let origin = a.p0.to_f32();
    let (b0, b1) = (b.p0.to_f32(), b.p1.to_f32());
    let width = da.cross(b0 - origin).abs().max(da.cross(b1 - origin).abs());
    if width > max_width {
        return None;
    }

    let (t0, t1) = (da.dot(b0 - origin), da.dot(b1 - origin));
    let lo = t0.min(t1).max(0.0);
    let hi = t0.max(t1).min(len_a);
    if hi <= lo {
        return None;
    }

    let a_lo = origin + da * lo;
    let a_hi = origin + da * hi;
    let onto_b = |p: Point2f| b0 + db * db.dot(p - b0);

    Some([
        round(a_lo),
        round(a_hi),
        round(onto_b(a_hi)),
        round(onto_b(a_lo)),
    ])
}

fn round(p: Point2f) -> Point2i {
    Point2i::new(p.x.round() as i32, p.y.round() as i32)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pd_contour::{ChainApprox, find_external_contours};
    use pd_core::{EdgeMask, Point2i, Segment2i};

    use super::{remove_grid, stroke_band};
    use crate::config::GridRemovalConfig;

    fn seg(x0: i32, y0: i32, x1: i32, y1: i32) -> Segment2i {
        Segment2i::new(Point2i::new(x0, y0), Point2i::new(x1, y1))
    }

    fn horizontal_band(w: usize, h: usize, rows: std::ops::Range<usize>) -> EdgeMask {
        let mut mask = EdgeMask::empty(w, h);
        for y in rows {
            for x in 5..w - 5 {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn band_between_parallel_neighbors() {
        let quad = stroke_band(&seg(10, 20, 110, 20), &seg(30, 25, 150, 25), 2.0, 8.0).expect("band");
        assert_eq!(
            quad,
            [
                Point2i::new(30, 20),
                Point2i::new(110, 20),
                Point2i::new(110, 25),
                Point2i::new(30, 25)
            ]
        );
    }

    #[test]
    fn band_rejections() {
        let a = seg(10, 20, 110, 20);
        // too far apart
        assert!(stroke_band(&a, &seg(10, 40, 110, 40), 2.0, 8.0).is_none());
        // perpendicular
        assert!(stroke_band(&a, &seg(50, 0, 50, 100), 2.0, 8.0).is_none());
        // no common extent
        assert!(stroke_band(&a, &seg(120, 23, 180, 23), 2.0, 8.0).is_none());
        // degenerate
        assert!(stroke_band(&a, &seg(50, 22, 50, 22), 2.0, 8.0).is_none());
    }

    #[test]
    fn thick_horizontal_line_is_erased() {
        let mask = horizontal_band(200, 80, 38..43);
        let out = remove_grid(&mask, &GridRemovalConfig::default());

        for (x, y) in out.iter_edges() {
            assert!(mask.is_edge(x, y), "({x},{y}) was not in the input");
        }
        assert!(
            out.count() * 20 < mask.count(),
            "{} of {} pixels left",
            out.count(),
            mask.count()
        );
    }

    #[test]
    fn short_strokes_are_kept() {
        let mut mask = EdgeMask::empty(120, 60);
        for y in 20..25 {
            for x in 40..70 {
                mask.set(x, y, true);
            }
        }
        assert_eq!(remove_grid(&mask, &GridRemovalConfig::default()), mask);
    }

    #[test]
    fn exhausted_budget_returns_input() {
        let mask = horizontal_band(200, 80, 38..43);
        let cfg = GridRemovalConfig {
            time_budget: Some(Duration::ZERO),
            ..GridRemovalConfig::default()
        };
        assert_eq!(remove_grid(&mask, &cfg), mask);
    }

    /// Signed distance from `(x, y)` to the 60 degree line through (100, 40).
    fn across_slanted(x: usize, y: usize) -> f32 {
        let (s, c) = 60f32.to_radians().sin_cos();
        (x as f32 - 100.0) * s - (y as f32 - 40.0) * c
    }

    #[test]
    fn crossing_stroke_stays_connected() {
        let mut mask = horizontal_band(200, 80, 38..43);
        // Short enough that its own sides never become segments.
        for y in 22..58 {
            for x in 0..200 {
                if across_slanted(x, y).abs() <= 3.5 {
                    mask.set(x, y, true);
                }
            }
        }

        let out = remove_grid(&mask, &GridRemovalConfig::default());
        assert!(out.is_edge(100, 40));

        let pieces = find_external_contours(&out, ChainApprox::Simple);
        let large: Vec<f64> = pieces.iter().map(|c| c.area).filter(|&a| a > 100.0).collect();
        assert_eq!(large.len(), 1, "stroke split into {large:?}");

        let band_only =
            |x: usize, y: usize| (38..43).contains(&y) && across_slanted(x, y).abs() > 8.0;
        let before = mask.iter_edges().filter(|&(x, y)| band_only(x, y)).count();
        let after = out.iter_edges().filter(|&(x, y)| band_only(x, y)).count();
        assert!(after * 20 < before, "{after} of {before} line pixels left");
    }
}
