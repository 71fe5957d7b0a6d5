//! Configuration for comet detection and tracking.
//!
//! A flat [`Config`] struct; parameters are grouped by comments into the
//! pipeline stages that read them. The defaults are the decision boundaries
//! the detector was tuned with and should only be changed together with a
//! re-validation against labeled sequences.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Per-pixel scoring strategy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ScorerKind {
    /// Ratio of the center block's lift over the ring floor to the ring's own
    /// spread. This is the default.
    #[default]
    BackgroundRatio,
    /// Strict yes/no test: ring statistics must fall monotonically from the
    /// center outwards.
    Centrum,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("ring_radius ({ring_radius}) must be larger than center_radius ({center_radius})")]
    RingInsideCenter {
        ring_radius: u32,
        center_radius: u32,
    },
    #[error("min_trajectory_len must be at least 2, got {0}")]
    MinTrajectoryLen(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // ------------------------------------------------------------------------
    // Spot scoring
    // ------------------------------------------------------------------------
    /// Scoring strategy applied to every pixel.
    pub scorer: ScorerKind,
    /// Half-size of the center block (1 = 3x3).
    pub center_radius: u32,
    /// Chebyshev radius of the background ring.
    pub ring_radius: u32,

    // ------------------------------------------------------------------------
    // Temporal filter
    // ------------------------------------------------------------------------
    /// Minimum score on the current frame for a pixel to be a candidate.
    pub detection_threshold: f64,
    /// A candidate is rejected if either neighbor frame scores at least this.
    pub neighbor_threshold: f64,

    // ------------------------------------------------------------------------
    // Clustering
    // ------------------------------------------------------------------------
    /// Candidates within this Manhattan distance are merged (transitively).
    pub cluster_distance: u32,

    // ------------------------------------------------------------------------
    // Tracking
    // ------------------------------------------------------------------------
    /// Max Manhattan distance between a spot and the extrapolated position.
    pub extension_tolerance: f64,
    /// Max squared perpendicular distance from the motion line.
    pub collinearity_tolerance: f64,
    /// Trajectories shorter than this are discarded instead of archived.
    pub min_trajectory_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scorer: ScorerKind::BackgroundRatio,
            center_radius: 1,
            ring_radius: 4,
            detection_threshold: 4.0,
            neighbor_threshold: 1.6,
            cluster_distance: 2,
            extension_tolerance: 5.0,
            collinearity_tolerance: 2.0,
            min_trajectory_len: 5,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("detection_threshold", self.detection_threshold),
            ("neighbor_threshold", self.neighbor_threshold),
            ("extension_tolerance", self.extension_tolerance),
            ("collinearity_tolerance", self.collinearity_tolerance),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if self.ring_radius <= self.center_radius {
            return Err(ConfigError::RingInsideCenter {
                ring_radius: self.ring_radius,
                center_radius: self.center_radius,
            });
        }
        if self.min_trajectory_len < 2 {
            return Err(ConfigError::MinTrajectoryLen(self.min_trajectory_len));
        }
        if self.neighbor_threshold > self.detection_threshold {
            tracing::warn!(
                neighbor_threshold = self.neighbor_threshold,
                detection_threshold = self.detection_threshold,
                "Neighbor threshold above detection threshold; stationary sources may pass"
            );
        }
        Ok(())
    }
}
