use std::f64::consts::PI;
use std::time::{Duration, Instant};

use pd_core::{EdgeMask, Point2i, Segment2i};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::HoughError;

const SHIFT: u32 = 16;
const DEADLINE_CHECK_EVERY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct HoughConfig {
    /// Distance resolution of the accumulator in pixels.
    pub rho: f32,
    /// Angle resolution of the accumulator in radians.
    pub theta: f32,
    pub vote_threshold: usize,
    /// Minimum extent, in x or in y, of an accepted segment.
    pub min_length: usize,
    /// Largest run of missing pixels bridged while walking a corridor.
    pub max_gap: usize,
    pub seed: u64,
    pub time_budget: Option<Duration>,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta: (PI / 180.0) as f32,
            vote_threshold: 100,
            min_length: 50,
            max_gap: 5,
            seed: 0x5eed,
            time_budget: None,
        }
    }
}

impl HoughConfig {
    fn validate(&self) -> Result<(), HoughError> {
        if !(self.rho.is_finite() && self.rho > 0.0) {
            return Err(HoughError::invalid_params(format!(
                "rho must be positive, got {}",
                self.rho
            )));
        }
        if !(self.theta.is_finite() && self.theta > 0.0 && (self.theta as f64) <= PI) {
            return Err(HoughError::invalid_params(format!(
                "theta must be in (0, pi], got {}",
                self.theta
            )));
        }
        if self.vote_threshold == 0 {
            return Err(HoughError::invalid_params("vote_threshold must be non-zero"));
        }
        Ok(())
    }
}

struct Accumulator {
    trig: Vec<(f64, f64)>,
    num_rho: usize,
    rho_offset: i64,
    bins: Vec<i32>,
}

impl Accumulator {
    fn new(width: usize, height: usize, cfg: &HoughConfig) -> Self {
        let theta = cfg.theta as f64;
        let irho = 1.0 / cfg.rho as f64;
        let num_angle = ((PI / theta).round() as usize).max(1);
        let num_rho = ((((width + height) * 2 + 1) as f64) * irho).round().max(1.0) as usize;

        let trig = (0..num_angle)
            .map(|n| {
                let a = n as f64 * theta;
                (a.cos() * irho, a.sin() * irho)
            })
            .collect();

        Self {
            trig,
            num_rho,
            rho_offset: (num_rho as i64 - 1) / 2,
            bins: vec![0; num_angle * num_rho],
        }
    }

    fn bin(&self, n: usize, x: usize, y: usize) -> Option<usize> {
        let (c, s) = self.trig[n];
        let r = (x as f64 * c + y as f64 * s).round() as i64 + self.rho_offset;
        (0..self.num_rho as i64)
            .contains(&r)
            .then(|| n * self.num_rho + r as usize)
    }

    /// Adds one vote per angle and returns the strongest `(angle, votes)`.
    fn vote(&mut self, x: usize, y: usize) -> (usize, i32) {
        let mut best = (0usize, i32::MIN);
        for n in 0..self.trig.len() {
            if let Some(b) = self.bin(n, x, y) {
                self.bins[b] += 1;
                if self.bins[b] > best.1 {
                    best = (n, self.bins[b]);
                }
            }
        }
        best
    }

    fn unvote(&mut self, x: usize, y: usize) {
        for n in 0..self.trig.len() {
            if let Some(b) = self.bin(n, x, y) {
                self.bins[b] -= 1;
            }
        }
    }
}

/// Fixed-point corridor walker along the line of angle bin `n` through a pixel.
#[derive(Debug, Clone, Copy)]
struct Corridor {
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
    x_major: bool,
}

impl Corridor {
    fn new(x: usize, y: usize, cos_sin: (f64, f64)) -> Self {
        // Direction along the line is perpendicular to its normal.
        let a = -cos_sin.1;
        let b = cos_sin.0;
        let (x, y) = (x as i64, y as i64);
        let one = 1i64 << SHIFT;
        let half = 1i64 << (SHIFT - 1);

        if a.abs() > b.abs() {
            Self {
                x0: x,
                y0: (y << SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * one as f64 / a.abs()).round() as i64,
                x_major: true,
            }
        } else {
            Self {
                x0: (x << SHIFT) + half,
                y0: y,
                dx: (a * one as f64 / b.abs()).round() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
                x_major: false,
            }
        }
    }

    /// Pixel positions from the start point outwards; `forward == false`
    /// walks the opposite way.
    fn walk(self, width: usize, height: usize, forward: bool) -> impl Iterator<Item = (usize, usize)> {
        let (dx, dy) = if forward {
            (self.dx, self.dy)
        } else {
            (-self.dx, -self.dy)
        };
        let (mut x, mut y) = (self.x0, self.y0);
        std::iter::from_fn(move || {
            let (px, py) = if self.x_major {
                (x, y >> SHIFT)
            } else {
                (x >> SHIFT, y)
            };
            if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                return None;
            }
            x += dx;
            y += dy;
            Some((px as usize, py as usize))
        })
    }
}

pub fn detect_segments(mask: &EdgeMask, cfg: &HoughConfig) -> Result<Vec<Segment2i>, HoughError> {
    cfg.validate()?;

    let (w, h) = mask.dims();
    let mut segments = Vec::new();
    if w == 0 || h == 0 {
        return Ok(segments);
    }

    let deadline = cfg.time_budget.map(|b| Instant::now() + b);
    let mut acc = Accumulator::new(w, h, cfg);
    let mut live: Vec<bool> = mask.as_image().data().iter().map(|&v| v != 0).collect();
    let mut voted = vec![false; w * h];
    let mut pending: Vec<(usize, usize)> = mask.iter_edges().collect();
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let threshold = i32::try_from(cfg.vote_threshold).unwrap_or(i32::MAX);
    let mut processed = 0usize;

    while !pending.is_empty() {
        if processed.is_multiple_of(DEADLINE_CHECK_EVERY)
            && let Some(d) = deadline
            && Instant::now() >= d
        {
            return Err(HoughError::BudgetExceeded { processed });
        }

        let (x, y) = pending.swap_remove(rng.gen_range(0..pending.len()));
        processed += 1;
        if !live[y * w + x] {
            continue;
        }

        let (best_n, votes) = acc.vote(x, y);
        voted[y * w + x] = true;
        if votes < threshold {
            continue;
        }

        let corridor = Corridor::new(x, y, acc.trig[best_n]);
        let mut ends = [(x, y); 2];
        for (k, forward) in [true, false].into_iter().enumerate() {
            let mut gap = 0usize;
            for (px, py) in corridor.walk(w, h, forward) {
                if live[py * w + px] {
                    gap = 0;
                    ends[k] = (px, py);
                } else {
                    gap += 1;
                    if gap > cfg.max_gap {
                        break;
                    }
                }
            }
        }

        let span_x = ends[0].0.abs_diff(ends[1].0);
        let span_y = ends[0].1.abs_diff(ends[1].1);
        let good = span_x >= cfg.min_length || span_y >= cfg.min_length;

        for (k, forward) in [true, false].into_iter().enumerate() {
            for (px, py) in corridor.walk(w, h, forward) {
                let i = py * w + px;
                if live[i] {
                    if good && voted[i] {
                        acc.unvote(px, py);
                        voted[i] = false;
                    }
                    live[i] = false;
                }
                if (px, py) == ends[k] {
                    break;
                }
            }
        }

        if good {
            segments.push(Segment2i::new(
                Point2i::new(ends[0].0 as i32, ends[0].1 as i32),
                Point2i::new(ends[1].0 as i32, ends[1].1 as i32),
            ));
        }
    }

    Ok(segments)
}
