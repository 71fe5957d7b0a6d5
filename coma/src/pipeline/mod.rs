//! End-to-end detection over a loaded sequence.
//!
//! Detection is independent per frame and runs on the rayon pool; the
//! resulting spot lists are attached to the frames in time order before the
//! tracker walks them sequentially.


use glam::DVec2;
use rayon::prelude::*;

use crate::clustering::cluster_candidates;
use crate::config::{Config, ConfigError};
use crate::detection::TemporalFilter;
use crate::export::Submission;
use crate::scoring::{scorer_from_config, SpotScorer};
use crate::sequence::Sequence;
use crate::tracking::{
    Trajectory, TrajectoryQuality, TrackingError, TrackingResult, TrackingStats,
    TrajectoryTracker,
};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PipelineError {
    #[error("spots of frame '{frame}' were already detected")]
    SpotsAlreadyAttached { frame: String },
    #[error("frame '{frame}' has no detected spots")]
    MissingSpots { frame: String },
    #[error(transparent)]
    Tracking(#[from] TrackingError),
}

/// Per-frame detection counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionStats {
    pub frame: String,
    /// Pixels that passed the temporal filter.
    pub candidates: usize,
    /// Spots left after clustering.
    pub spots: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTrajectory {
    pub trajectory: Trajectory,
    pub quality: TrajectoryQuality,
    pub confidence: f64,
}

impl ScoredTrajectory {
    pub fn new(trajectory: Trajectory) -> Self {
        let quality = trajectory.quality();
        Self {
            confidence: quality.confidence(),
            quality,
            trajectory,
        }
    }
}

#[derive(Debug)]
pub struct DetectionResult {
    pub sequence_id: String,
    pub trajectories: Vec<ScoredTrajectory>,
    pub detection: Vec<DetectionStats>,
    pub tracking: TrackingStats,
}

impl DetectionResult {
    pub fn submissions(&self, sequence: &Sequence) -> Vec<Submission> {
        self.trajectories
            .iter()
            .map(|t| {
                Submission::from_trajectory(
                    &self.sequence_id,
                    sequence.frames(),
                    &t.trajectory,
                    t.confidence,
                )
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct CometDetector {
    config: Config,
    scorer: Box<dyn SpotScorer>,
}

impl CometDetector {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let scorer = scorer_from_config(&config);
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Candidate scan plus clustering for frame `index`. Does not attach.
    pub fn detect_frame(&self, sequence: &Sequence, index: usize) -> (Vec<DVec2>, DetectionStats) {
        let filter = TemporalFilter::new(self.scorer.as_ref(), &self.config);
        let window = sequence.window(index);
        let candidates = filter.scan(&window);
        let spots: Vec<DVec2> = cluster_candidates(&candidates, self.config.cluster_distance)
            .into_iter()
            .map(|p| p.as_dvec2())
            .collect();

        let stats = DetectionStats {
            frame: window.current.id().to_string(),
            candidates: candidates.len(),
            spots: spots.len(),
        };
        tracing::debug!(
            frame = %stats.frame,
            candidates = stats.candidates,
            spots = stats.spots,
            "Detected spots"
        );
        (spots, stats)
    }

    /// Detect and attach spots on every frame.
    pub fn detect_spots(&self, sequence: &Sequence) -> Result<Vec<DetectionStats>, PipelineError> {
        let detected: Vec<(Vec<DVec2>, DetectionStats)> = (0..sequence.len())
            .into_par_iter()
            .map(|i| self.detect_frame(sequence, i))
            .collect();

        let mut stats = Vec::with_capacity(detected.len());
        for (frame, (spots, frame_stats)) in sequence.frames().iter().zip(detected) {
            frame
                .attach_spots(spots)
                .map_err(|_| PipelineError::SpotsAlreadyAttached {
                    frame: frame.id().to_string(),
                })?;
            stats.push(frame_stats);
        }

        tracing::info!(
            sequence = %sequence.id(),
            frames = stats.len(),
            spots = stats.iter().map(|s| s.spots).sum::<usize>(),
            "Spot detection finished"
        );
        Ok(stats)
    }

    /// Track the attached spots through the sequence.
    pub fn track(&self, sequence: &Sequence) -> Result<TrackingResult, PipelineError> {
        let mut tracker = TrajectoryTracker::new(&self.config);
        for frame in sequence.frames() {
            let spots = frame.spots().ok_or_else(|| PipelineError::MissingSpots {
                frame: frame.id().to_string(),
            })?;
            tracker.push_frame(frame.timestamp(), spots)?;
        }
        Ok(tracker.finish())
    }

    /// Detect, track and score.
    pub fn run(&self, sequence: &Sequence) -> Result<DetectionResult, PipelineError> {
        let detection = self.detect_spots(sequence)?;
        let tracked = self.track(sequence)?;

        let trajectories: Vec<ScoredTrajectory> = tracked
            .trajectories
            .into_iter()
            .map(ScoredTrajectory::new)
            .collect();

        tracing::info!(
            sequence = %sequence.id(),
            trajectories = trajectories.len(),
            archived = tracked.stats.archived,
            discarded = tracked.stats.discarded,
            peak_live = tracked.stats.peak_live,
            "Tracking finished"
        );

        Ok(DetectionResult {
            sequence_id: sequence.id().to_string(),
            trajectories,
            detection,
            tracking: tracked.stats,
        })
    }
}
