use crate::SplineError;
use crate::banded::{LdlFactor, Pentadiagonal};

/// Natural cubic spline in value / second-derivative form.
///
/// Between knots `t[i]` and `t[i+1]` the curve is determined by the knot
/// values `g` and second derivatives `gamma`; `gamma` is zero at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalCubic {
    t: Vec<f64>,
    g: Vec<f64>,
    gamma: Vec<f64>,
}

impl NaturalCubic {
    /// Evaluates the spline; parameters outside the knot range are clamped.
    pub fn eval(&self, t: f64) -> f64 {
        let n = self.t.len();
        let t = t.clamp(self.t[0], self.t[n - 1]);
        let i = self.t[1..n - 1].partition_point(|&k| k <= t);

        let (ti, tj) = (self.t[i], self.t[i + 1]);
        let h = tj - ti;
        let a = t - ti;
        let b = tj - t;
        let linear = (a * self.g[i + 1] + b * self.g[i]) / h;
        let bend = (1.0 + a / h) * self.gamma[i + 1] + (1.0 + b / h) * self.gamma[i];
        linear - a * b * bend / 6.0
    }
}

/// Knot layout and the band structure of `Q` shared by every coordinate.
#[derive(Debug, Clone)]
pub(crate) struct SmoothingSystem {
    t: Vec<f64>,
    h: Vec<f64>,
    /// Column `c` of `Q` has entries at rows `c`, `c + 1`, `c + 2`.
    q: Vec<[f64; 3]>,
}

impl SmoothingSystem {
    /// `t` must be strictly increasing with at least four knots.
    pub fn new(t: Vec<f64>) -> Result<Self, SplineError> {
        if t.len() < 4 {
            return Err(SplineError::TooFewPoints {
                got: t.len(),
                min: 4,
            });
        }

        let h: Vec<f64> = t.windows(2).map(|w| w[1] - w[0]).collect();
        if h.iter().any(|&d| !(d.is_finite() && d > 0.0)) {
            return Err(SplineError::Degenerate);
        }

        let q = (0..t.len() - 2)
            .map(|c| {
                let (a, b) = (1.0 / h[c], 1.0 / h[c + 1]);
                [a, -a - b, b]
            })
            .collect();

        Ok(Self { t, h, q })
    }

    fn interior(&self) -> usize {
        self.q.len()
    }

    fn factor(&self, alpha: f64) -> Result<LdlFactor, SplineError> {
        let m = self.interior();
        let mut a = Pentadiagonal::zeros(m);
        for c in 0..m {
            let q = self.q[c];
            a.diag[c] = (self.h[c] + self.h[c + 1]) / 3.0
                + alpha * (q[0] * q[0] + q[1] * q[1] + q[2] * q[2]);
            if c >= 1 {
                let p = self.q[c - 1];
                a.sub1[c] = self.h[c] / 6.0 + alpha * (p[1] * q[0] + p[2] * q[1]);
            }
            if c >= 2 {
                let p = self.q[c - 2];
                a.sub2[c] = alpha * p[2] * q[0];
            }
        }
        a.factor().ok_or(SplineError::Degenerate)
    }

    fn qt_mul(&self, y: &[f64]) -> Vec<f64> {
        self.q
            .iter()
            .enumerate()
            .map(|(c, q)| q[0] * y[c] + q[1] * y[c + 1] + q[2] * y[c + 2])
            .collect()
    }

    fn q_mul(&self, gamma: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.t.len()];
        for (c, q) in self.q.iter().enumerate() {
            out[c] += q[0] * gamma[c];
            out[c + 1] += q[1] * gamma[c];
            out[c + 2] += q[2] * gamma[c];
        }
        out
    }

    /// Fits every channel with smoothing weight `alpha` and returns the
    /// splines with their combined residual sum of squares.
    pub fn fit(
        &self,
        channels: &[&[f64]],
        alpha: f64,
    ) -> Result<(Vec<NaturalCubic>, f64), SplineError> {
        let ldl = self.factor(alpha)?;
        let mut rss = 0.0;
        let mut out = Vec::with_capacity(channels.len());

        for y in channels {
            debug_assert_eq!(y.len(), self.t.len());
            let inner = ldl.solve(&self.qt_mul(y));
            let qg = self.q_mul(&inner);

            let g: Vec<f64> = y.iter().zip(&qg).map(|(&v, &d)| v - alpha * d).collect();
            rss += qg.iter().map(|d| (alpha * d) * (alpha * d)).sum::<f64>();

            let mut gamma = Vec::with_capacity(self.t.len());
            gamma.push(0.0);
            gamma.extend_from_slice(&inner);
            gamma.push(0.0);

            if g.iter().chain(&gamma).any(|v| !v.is_finite()) {
                return Err(SplineError::NonFinite);
            }
            out.push(NaturalCubic {
                t: self.t.clone(),
                g,
                gamma,
            });
        }

        if !rss.is_finite() {
            return Err(SplineError::NonFinite);
        }
        Ok((out, rss))
    }
}

const LOG_ALPHA_MIN: f64 = -20.0;
const LOG_ALPHA_MAX: f64 = 20.0;
const BISECTION_STEPS: usize = 60;

/// Largest weight (searched on a log scale) whose residual stays within
/// `smoothing`. Returns the fitted channels and the chosen weight.
pub(crate) fn fit_within_residual(
    system: &SmoothingSystem,
    channels: &[&[f64]],
    smoothing: f64,
) -> Result<(Vec<NaturalCubic>, f64), SplineError> {
    let smoothing = smoothing.max(0.0);

    let alpha_max = 10f64.powf(LOG_ALPHA_MAX);
    if let Ok((fits, rss)) = system.fit(channels, alpha_max)
        && rss <= smoothing
    {
        return Ok((fits, alpha_max));
    }

    let mut lo = LOG_ALPHA_MIN;
    let mut hi = LOG_ALPHA_MAX;
    let (mut best, _) = system.fit(channels, 10f64.powf(lo))?;

    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        match system.fit(channels, 10f64.powf(mid)) {
            Ok((fits, rss)) if rss <= smoothing => {
                lo = mid;
                best = fits;
            }
            _ => hi = mid,
        }
    }

    Ok((best, 10f64.powf(lo)))
}

#[cfg(test)]
mod tests {
    use super::{SmoothingSystem, fit_within_residual};
    use crate::SplineError;

    fn knots(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn tiny_weight_interpolates() {
        let t = knots(9);
        let y: Vec<f64> = t.iter().map(|&u| (3.0 * u).sin()).collect();
        let sys = SmoothingSystem::new(t.clone()).expect("valid knots");

        let (fits, rss) = sys.fit(&[&y], 1e-12).expect("solvable");
        assert!(rss < 1e-12);
        for (&u, &v) in t.iter().zip(&y) {
            assert!((fits[0].eval(u) - v).abs() < 1e-6);
        }
    }

    #[test]
    fn huge_weight_tends_to_a_line() {
        let t = knots(12);
        // Symmetric +--+ pattern so the noise has no linear trend.
        let y: Vec<f64> = t
            .iter()
            .enumerate()
            .map(|(i, &u)| 2.0 * u + 1.0 + if (i + 1) % 4 < 2 { 0.1 } else { -0.1 })
            .collect();
        let sys = SmoothingSystem::new(t).expect("valid knots");

        let (fits, _) = sys.fit(&[&y], 1e9).expect("solvable");
        let f = &fits[0];
        let slope = (f.eval(0.75) - f.eval(0.25)) / 0.5;
        assert!((slope - 2.0).abs() < 0.05);
        let mid = f.eval(0.5);
        assert!(((f.eval(0.25) + f.eval(0.75)) * 0.5 - mid).abs() < 1e-3);
    }

    #[test]
    fn quadratic_reproduced_between_knots() {
        let t = knots(30);
        let y: Vec<f64> = t.iter().map(|&u| 4.0 * u * u).collect();
        let sys = SmoothingSystem::new(t).expect("valid knots");

        let (fits, _) = sys.fit(&[&y], 0.0).expect("solvable");
        for k in 1..20 {
            let u = 0.2 + 0.6 * k as f64 / 20.0;
            assert!((fits[0].eval(u) - 4.0 * u * u).abs() < 1e-3);
        }
    }

    #[test]
    fn residual_respects_budget() {
        let t = knots(40);
        let y: Vec<f64> = t
            .iter()
            .enumerate()
            .map(|(i, &u)| 10.0 * u + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let sys = SmoothingSystem::new(t).expect("valid knots");

        let (fits, alpha) = fit_within_residual(&sys, &[&y], 0.5).expect("fit");
        let (_, rss) = sys.fit(&[&y], alpha).expect("refit");
        assert!(rss <= 0.5 + 1e-12);
        assert!(rss > 0.4, "rss {rss} should approach the budget");
        assert_eq!(fits.len(), 1);
    }

    #[test]
    fn invalid_knots() {
        assert_eq!(
            SmoothingSystem::new(vec![0.0, 0.5, 1.0]).err(),
            Some(SplineError::TooFewPoints { got: 3, min: 4 })
        );
        assert_eq!(
            SmoothingSystem::new(vec![0.0, 0.5, 0.5, 1.0]).err(),
            Some(SplineError::Degenerate)
        );
    }
}
