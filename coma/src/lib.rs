//! Coma - moving point-source detection in astronomical image sequences.
//!
//! Finds comets (and other compact sources that move between exposures) in a
//! time-ordered stack of frames:
//! - Per-pixel scoring of compact bright spots against the local background
//! - Temporal rejection of sources that stay put (stars, hot pixels)
//! - Clustering of adjacent candidate pixels into spots
//! - Multi-hypothesis linear tracking of spots across frames
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use coma::{load_sequence, CometDetector, Config, DefaultLoader};
//!
//! let sequence = load_sequence(Path::new("data/cmt0001"), &DefaultLoader)?;
//! let detector = CometDetector::new(Config::default())?;
//! let result = detector.run(&sequence)?;
//!
//! for line in result.submissions(&sequence) {
//!     println!("{line}");
//! }
//! ```

pub mod clustering;
pub mod config;
pub mod detection;
pub mod export;
pub mod frame;
pub(crate) mod geometry;
pub mod pipeline;
pub mod ring_stat;
pub mod scoring;
pub mod sequence;
pub mod tracking;

#[cfg(test)]
mod testing;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{Config, ConfigError, ScorerKind};

// ============================================================================
// Data model
// ============================================================================

pub use frame::{Frame, Label};
pub use ring_stat::RingStat;
pub use sequence::{
    load_sequence, DefaultLoader, FrameLoader, FrameRecord, ImageFileLoader, LoadError,
    MetadataError, RawImage, Sequence, SequenceError,
};
#[cfg(feature = "fits")]
pub use sequence::FitsLoader;

// ============================================================================
// Detection and tracking
// ============================================================================

pub use clustering::cluster_candidates;
pub use detection::{FrameWindow, TemporalFilter};
pub use pipeline::{
    CometDetector, DetectionResult, DetectionStats, PipelineError, ScoredTrajectory,
};
pub use scoring::{BackgroundRatioScorer, CentrumScorer, SpotScorer};
pub use tracking::{
    ExtensionRule, LinearMotion, TrackPoint, TrackingError, TrackingResult, TrackingStats,
    Trajectory, TrajectoryQuality, TrajectoryTracker,
};

// ============================================================================
// Export
// ============================================================================

pub use export::{
    format_submission, parse_submission, read_submissions, write_sequence_spots,
    write_spot_csv, write_submissions, Submission, SubmissionParseError, SubmissionPoint,
};
