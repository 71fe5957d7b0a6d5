//! Multi-hypothesis trajectory tracking.
//!
//! Frames are fed in strictly increasing time order. On every frame each
//! live trajectory tries every spot and forks into one descendant per spot
//! its linear model accepts; in addition every spot seeds a fresh
//! single-point trajectory. A trajectory that gains no descendant is
//! retired: archived when it reached the minimum length, dropped otherwise.
//! Histories live in a [`TrackArena`](arena::TrackArena) so forks share
//! their prefixes.

mod arena;
#[cfg(test)]
mod tests;
mod trajectory;

pub use trajectory::{LinearMotion, TrackPoint, Trajectory, TrajectoryQuality};

use chrono::NaiveDateTime;
use glam::DVec2;
use rayon::prelude::*;

use crate::config::Config;
use crate::geometry::{manhattan, sq_dist_from_line};
use arena::{NodeId, TrackArena};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TrackingError {
    #[error("frame at {current} does not follow previous frame at {previous}")]
    NonIncreasingTimestamp {
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
}

/// Acceptance test for appending a spot to a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtensionRule {
    /// Max Manhattan distance to the predicted position (inclusive).
    pub tolerance: f64,
    /// Max squared distance from the line through the first point and the
    /// predicted position (inclusive).
    pub collinearity_tolerance: f64,
}

impl ExtensionRule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tolerance: config.extension_tolerance,
            collinearity_tolerance: config.collinearity_tolerance,
        }
    }

    /// `motion` is `None` for single-point trajectories, which accept any spot.
    pub fn accepts(&self, motion: Option<&LinearMotion>, candidate: &TrackPoint) -> bool {
        let Some(motion) = motion else {
            return true;
        };
        let expected = motion.predict(candidate.timestamp);
        if manhattan(candidate.position, expected) > self.tolerance {
            return false;
        }
        sq_dist_from_line(candidate.position, motion.origin(), expected)
            <= self.collinearity_tolerance
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackingStats {
    pub frames: usize,
    pub seeded: usize,
    pub extended: usize,
    pub archived: usize,
    pub discarded: usize,
    pub peak_live: usize,
}

#[derive(Debug)]
pub struct TrackingResult {
    /// Archived trajectories in retirement order.
    pub trajectories: Vec<Trajectory>,
    pub stats: TrackingStats,
}

#[derive(Debug)]
pub struct TrajectoryTracker {
    rule: ExtensionRule,
    min_len: usize,
    arena: TrackArena,
    live: Vec<NodeId>,
    archived: Vec<NodeId>,
    last_timestamp: Option<NaiveDateTime>,
    stats: TrackingStats,
}

impl TrajectoryTracker {
    pub fn new(config: &Config) -> Self {
        Self {
            rule: ExtensionRule::from_config(config),
            min_len: config.min_trajectory_len,
            arena: TrackArena::new(),
            live: Vec::new(),
            archived: Vec::new(),
            last_timestamp: None,
            stats: TrackingStats::default(),
        }
    }

    /// Trajectories currently able to extend.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn stats(&self) -> TrackingStats {
        self.stats
    }

    /// Advance by one frame.
    pub fn push_frame(
        &mut self,
        timestamp: NaiveDateTime,
        spots: &[DVec2],
    ) -> Result<(), TrackingError> {
        if let Some(previous) = self.last_timestamp {
            if timestamp <= previous {
                return Err(TrackingError::NonIncreasingTimestamp {
                    previous,
                    current: timestamp,
                });
            }
        }
        self.last_timestamp = Some(timestamp);

        let candidates: Vec<TrackPoint> = spots
            .iter()
            .map(|&p| TrackPoint::new(timestamp, p))
            .collect();

        let mut next_live = Vec::with_capacity(candidates.len() + self.live.len());
        for &point in &candidates {
            next_live.push(self.arena.seed(point));
        }
        self.stats.seeded += candidates.len();

        // Acceptance only reads the arena; evaluate all trajectories in
        // parallel, then append in live order.
        let accepted: Vec<Vec<usize>> = {
            let arena = &self.arena;
            let rule = self.rule;
            self.live
                .par_iter()
                .map(|&id| {
                    let motion = LinearMotion::through(arena.first(id), arena.last(id));
                    candidates
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| rule.accepts(motion.as_ref(), c))
                        .map(|(i, _)| i)
                        .collect::<Vec<_>>()
                })
                .collect()
        };

        let previous_live = std::mem::take(&mut self.live);
        for (id, hits) in previous_live.into_iter().zip(accepted) {
            if hits.is_empty() {
                self.retire(id);
                continue;
            }
            for i in hits {
                next_live.push(self.arena.extend(id, candidates[i]));
                self.stats.extended += 1;
            }
        }

        self.live = next_live;
        self.stats.frames += 1;
        self.stats.peak_live = self.stats.peak_live.max(self.live.len());

        tracing::debug!(
            %timestamp,
            spots = candidates.len(),
            live = self.live.len(),
            archived = self.archived.len(),
            "Tracked frame"
        );
        Ok(())
    }

    /// Retire every live trajectory and return the archived ones.
    pub fn finish(mut self) -> TrackingResult {
        for id in std::mem::take(&mut self.live) {
            self.retire(id);
        }

        let trajectories: Vec<Trajectory> = self
            .archived
            .iter()
            .map(|&id| Trajectory::new(self.arena.history(id)))
            .collect();

        tracing::debug!(
            frames = self.stats.frames,
            nodes = self.arena.node_count(),
            archived = self.stats.archived,
            discarded = self.stats.discarded,
            peak_live = self.stats.peak_live,
            "Tracking finished"
        );

        TrackingResult {
            trajectories,
            stats: self.stats,
        }
    }

    fn retire(&mut self, id: NodeId) {
        if self.arena.len(id) >= self.min_len {
            self.archived.push(id);
            self.stats.archived += 1;
        } else {
            self.stats.discarded += 1;
        }
    }
}
