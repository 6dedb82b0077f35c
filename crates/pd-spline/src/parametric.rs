use pd_core::Point2f;

use crate::SplineError;
use crate::natural::{NaturalCubic, SmoothingSystem, fit_within_residual};

/// Fewest distinct points accepted by [`ParametricSpline::fit`].
pub const MIN_POINTS: usize = 4;

/// Planar smoothing spline `u ↦ (x(u), y(u))` over `u ∈ [0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricSpline {
    x: NaturalCubic,
    y: NaturalCubic,
    alpha: f64,
}

impl ParametricSpline {
    /// Fits a smoothing spline through `points` in order.
    ///
    /// Consecutive duplicates are dropped, the rest are parametrized by
    /// normalized cumulative chord length, and the smoothing weight is the
    /// largest one whose residual sum of squares (over both coordinates)
    /// stays within `smoothing`.
    pub fn fit(points: &[Point2f], smoothing: f64) -> Result<Self, SplineError> {
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(SplineError::NonFinite);
        }
        if !smoothing.is_finite() {
            return Err(SplineError::NonFinite);
        }

        let mut xs: Vec<f64> = Vec::with_capacity(points.len());
        let mut ys: Vec<f64> = Vec::with_capacity(points.len());
        for p in points {
            let (x, y) = (p.x as f64, p.y as f64);
            if xs.last() == Some(&x) && ys.last() == Some(&y) {
                continue;
            }
            xs.push(x);
            ys.push(y);
        }

        if xs.len() < MIN_POINTS {
            return Err(SplineError::TooFewPoints {
                got: xs.len(),
                min: MIN_POINTS,
            });
        }

        let mut u = Vec::with_capacity(xs.len());
        let mut acc = 0.0;
        u.push(0.0);
        for i in 1..xs.len() {
            acc += (xs[i] - xs[i - 1]).hypot(ys[i] - ys[i - 1]);
            u.push(acc);
        }
        if !(acc.is_finite() && acc > 0.0) {
            return Err(SplineError::Degenerate);
        }
        for v in &mut u {
            *v /= acc;
        }
        if let Some(last) = u.last_mut() {
            *last = 1.0;
        }

        let system = SmoothingSystem::new(u)?;
        let (mut fits, alpha) = fit_within_residual(&system, &[&xs, &ys], smoothing)?;
        let y = fits.pop().ok_or(SplineError::Degenerate)?;
        let x = fits.pop().ok_or(SplineError::Degenerate)?;

        Ok(Self { x, y, alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn eval(&self, u: f64) -> Point2f {
        Point2f::new(self.x.eval(u) as f32, self.y.eval(u) as f32)
    }

    /// `count` samples at uniformly spaced parameters, endpoints included.
    pub fn resample(&self, count: usize) -> Vec<Point2f> {
        match count {
            0 => Vec::new(),
            1 => vec![self.eval(0.0)],
            _ => {
                let step = 1.0 / (count - 1) as f64;
                (0..count).map(|k| self.eval(k as f64 * step)).collect()
            }
        }
    }
}
