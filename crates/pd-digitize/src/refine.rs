use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{debug, warn};
use pd_contour::{Contour, ContourId, ContourSet};
use pd_core::Point2f;
use pd_spline::ParametricSpline;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::RefineConfig;

/// Smooth polyline resampled from one contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedCurve {
    /// Id of the contour in the set passed to [`refine`].
    pub source: ContourId,
    #[serde(with = "points_serde")]
    pub points: Vec<Point2f>,
}

/// Fits a smoothing spline to every contour and resamples it to
/// `resample_count` evenly spaced parameters.
///
/// Contours that cannot be fitted are skipped. Output order follows the
/// contour order. When `time_budget` runs out, contours not yet started are
/// skipped and the curves finished so far are returned.
pub fn refine(contours: &ContourSet, cfg: &RefineConfig) -> Vec<RefinedCurve> {
    let deadline = cfg.time_budget.map(|b| Instant::now() + b);
    let skipped = AtomicUsize::new(0);

    let fit_one = |c: &Contour| -> Option<RefinedCurve> {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            skipped.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        refine_contour(c, cfg)
    };

    #[cfg(feature = "parallel")]
    let results: Vec<Option<RefinedCurve>> = contours.as_slice().par_iter().map(fit_one).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Vec<Option<RefinedCurve>> = contours.as_slice().iter().map(fit_one).collect();

    let skipped = skipped.into_inner();
    if skipped > 0 {
        warn!(
            "refine: time budget exhausted, {} of {} contours skipped",
            skipped,
            contours.len()
        );
    }

    results.into_iter().flatten().collect()
}

fn refine_contour(c: &Contour, cfg: &RefineConfig) -> Option<RefinedCurve> {
    if c.len() < cfg.min_points {
        debug!("refine: contour {} has {} points, skipped", c.id, c.len());
        return None;
    }

    let pts: Vec<Point2f> = c.points.iter().map(|p| p.to_f32()).collect();
    match ParametricSpline::fit(&pts, cfg.smoothing) {
        Ok(spline) => Some(RefinedCurve {
            source: c.id,
            points: spline.resample(cfg.resample_count),
        }),
        Err(err) => {
            debug!("refine: contour {} skipped: {err}", c.id);
            None
        }
    }
}

/// `Point2f` has no serde impls; curves travel as `[x, y]` pairs.
mod points_serde {
    use pd_core::Point2f;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point2f], s: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<[f32; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        pairs.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Point2f>, D::Error> {
        let pairs = Vec::<[f32; 2]>::deserialize(d)?;
        Ok(pairs.into_iter().map(|[x, y]| Point2f::new(x, y)).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pd_contour::ContourSet;
    use pd_core::Point2i;

    use super::refine;
    use crate::config::RefineConfig;

    fn rectangle(x0: i32, y0: i32, w: i32, h: i32) -> Vec<Point2i> {
        let mut pts = Vec::new();
        for x in x0..x0 + w {
            pts.push(Point2i::new(x, y0));
        }
        for y in y0..y0 + h {
            pts.push(Point2i::new(x0 + w, y));
        }
        for x in (x0 + 1..=x0 + w).rev() {
            pts.push(Point2i::new(x, y0 + h));
        }
        for y in (y0 + 1..=y0 + h).rev() {
            pts.push(Point2i::new(x0, y));
        }
        pts
    }

    #[test]
    fn every_curve_has_the_requested_length_and_stays_near_its_contour() {
        let mut set = ContourSet::new(200, 200);
        set.push(rectangle(10, 10, 60, 8));
        set.push(rectangle(100, 120, 40, 40));
        let curves = refine(&set, &RefineConfig::default());

        assert_eq!(curves.len(), 2);
        for (k, curve) in curves.iter().enumerate() {
            assert_eq!(curve.source, k);
            assert_eq!(curve.points.len(), 1000);
            let contour = set.get(k).expect("contour");
            for p in &curve.points {
                let d = contour
                    .points
                    .iter()
                    .map(|q| p.distance(q.to_f32()))
                    .fold(f32::INFINITY, f32::min);
                assert!(d < 1.5, "sample {p:?} is {d} px from contour {k}");
            }
        }
    }

    #[test]
    fn degenerate_contours_are_skipped() {
        let mut set = ContourSet::new(50, 50);
        set.push(vec![Point2i::new(3, 3), Point2i::new(4, 3)]);
        set.push(vec![Point2i::new(5, 5); 6]);
        set.push(rectangle(10, 10, 20, 6));
        let curves = refine(&set, &RefineConfig::default());

        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].source, 2);
    }

    #[test]
    fn custom_resample_count() {
        let mut set = ContourSet::new(50, 50);
        set.push(rectangle(5, 5, 20, 10));
        let cfg = RefineConfig {
            resample_count: 37,
            ..RefineConfig::default()
        };
        assert_eq!(refine(&set, &cfg)[0].points.len(), 37);
    }

    #[test]
    fn exhausted_budget_skips_everything() {
        let mut set = ContourSet::new(50, 50);
        set.push(rectangle(5, 5, 20, 10));
        let cfg = RefineConfig {
            time_budget: Some(Duration::ZERO),
            ..RefineConfig::default()
        };
        assert!(refine(&set, &cfg).is_empty());
        assert!(refine(&ContourSet::new(5, 5), &RefineConfig::default()).is_empty());
    }

    #[test]
    fn curves_serialize_as_pairs() {
        let mut set = ContourSet::new(50, 50);
        set.push(rectangle(5, 5, 20, 10));
        let cfg = RefineConfig {
            resample_count: 3,
            ..RefineConfig::default()
        };
        let curve = &refine(&set, &cfg)[0];
        let json = serde_json::to_value(curve).expect("serialize");
        assert_eq!(json["source"], 0);
        assert_eq!(json["points"].as_array().map(|a| a.len()), Some(3));
    }
}
