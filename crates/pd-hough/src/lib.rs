//! Straight segment detection with the progressive probabilistic Hough
//! transform.
//!
//! Edge pixels are visited in a seeded random order. Each one votes into a
//! `(theta, rho)` accumulator; as soon as a bin reaches the vote threshold,
//! the corridor through the pixel is walked in both directions with gap
//! tolerance, the pixels on it are consumed, and their votes withdrawn.
//! Results are deterministic for a fixed seed.

mod error;
mod probabilistic;

pub use error::HoughError;
pub use probabilistic::{HoughConfig, detect_segments};
