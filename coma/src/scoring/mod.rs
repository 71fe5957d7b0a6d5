//! Per-pixel "bright transient spot" scoring.
//!
//! A scorer looks at the neighborhood of one pixel and returns a real-valued
//! score; the temporal filter compares it against the detection and neighbor
//! thresholds. Two strategies exist:
//!
//! - [`BackgroundRatioScorer`]: how far the center block rises above the
//!   floor of a surrounding ring, measured in units of that ring's own spread.
//!   Large for compact bright sources on sky background.
//! - [`CentrumScorer`]: a strict monotonic-profile test. Scores `+inf` when
//!   the rings around the pixel get uniformly darker outwards, `0` otherwise.
//!
//! All sampling clamps to the grid, so pixels at the image border are scored
//! with replicated edge values instead of failing.


use std::fmt::Debug;

use crate::config::{Config, ScorerKind};
use crate::frame::Frame;
use crate::ring_stat::RingStat;

/// Scoring capability used by the temporal filter.
pub trait SpotScorer: Debug + Send + Sync {
    fn score(&self, frame: &Frame, x: i64, y: i64) -> f64;
}

/// Build the scorer selected by `config.scorer`.
pub fn scorer_from_config(config: &Config) -> Box<dyn SpotScorer> {
    match config.scorer {
        ScorerKind::BackgroundRatio => Box::new(BackgroundRatioScorer {
            center_radius: config.center_radius,
            ring_radius: config.ring_radius,
        }),
        ScorerKind::Centrum => Box::new(CentrumScorer {
            ring_radius: config.ring_radius,
        }),
    }
}

/// Statistics over the full square block of half-size `radius` around (x, y).
pub fn sample_block(frame: &Frame, x: i64, y: i64, radius: u32) -> RingStat {
    let r = radius as i64;
    let mut stat = RingStat::new();
    for yy in y - r..=y + r {
        for xx in x - r..=x + r {
            stat.update(frame.intensity(xx, yy));
        }
    }
    stat
}

/// Statistics over the perimeter of the square at Chebyshev distance `radius`
/// from (x, y). The interior is not sampled.
pub fn sample_ring(frame: &Frame, x: i64, y: i64, radius: u32) -> RingStat {
    let r = radius as i64;
    let mut stat = RingStat::new();
    if r == 0 {
        stat.update(frame.intensity(x, y));
        return stat;
    }
    for n in -r..=r {
        stat.update(frame.intensity(x + n, y - r));
        stat.update(frame.intensity(x + n, y + r));
    }
    for n in -r + 1..r {
        stat.update(frame.intensity(x - r, y + n));
        stat.update(frame.intensity(x + r, y + n));
    }
    stat
}

// ============================================================================
// Background ratio
// ============================================================================

/// Center-block lift over the ring floor, relative to the ring's spread.
///
/// `gap = center.avg - ring.min`, `spread = ring.avg - ring.min`;
/// the score is `gap / spread`, or `gap` when the ring is perfectly flat.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundRatioScorer {
    pub center_radius: u32,
    pub ring_radius: u32,
}

impl Default for BackgroundRatioScorer {
    fn default() -> Self {
        Self {
            center_radius: 1,
            ring_radius: 4,
        }
    }
}

impl SpotScorer for BackgroundRatioScorer {
    fn score(&self, frame: &Frame, x: i64, y: i64) -> f64 {
        let center = sample_block(frame, x, y, self.center_radius);
        let outer = sample_ring(frame, x, y, self.ring_radius);

        let floor = outer.min() as f64;
        let center_gap = center.average() as f64 - floor;
        let outer_spread = outer.average() as f64 - floor;

        if outer_spread == 0.0 {
            center_gap
        } else {
            center_gap / outer_spread
        }
    }
}

// ============================================================================
// Centrum
// ============================================================================

/// Monotonic ring profile test.
///
/// Passes when the first ring's average does not exceed the center pixel,
/// each further ring has strictly lower min, max and average than the one
/// inside it, and the outermost ring's max stays at or below the first
/// ring's min.
#[derive(Debug, Clone, Copy)]
pub struct CentrumScorer {
    pub ring_radius: u32,
}

impl CentrumScorer {
    pub fn is_centrum(&self, frame: &Frame, x: i64, y: i64) -> bool {
        let peak = frame.intensity(x, y);
        let first = sample_ring(frame, x, y, 1);
        if first.average() > peak {
            return false;
        }

        let mut inner = first;
        for radius in 2..=self.ring_radius {
            let ring = sample_ring(frame, x, y, radius);
            if ring.min() >= inner.min() || ring.max() >= inner.max() || ring.average() >= inner.average()
            {
                return false;
            }
            inner = ring;
        }

        inner.max() <= first.min()
    }
}

impl SpotScorer for CentrumScorer {
    fn score(&self, frame: &Frame, x: i64, y: i64) -> f64 {
        if self.is_centrum(frame, x, y) {
            f64::INFINITY
        } else {
            0.0
        }
    }
}
