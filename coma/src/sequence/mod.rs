//! Time-ordered image sequences and their on-disk layout.

mod loader;
mod metadata;

#[cfg(feature = "fits")]
pub use loader::FitsLoader;
pub use loader::{DefaultLoader, FrameLoader, ImageFileLoader, LoadError, RawImage};
pub use metadata::{metadata_path, parse_metadata, read_metadata, FrameRecord, MetadataError};

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDateTime;
use rayon::prelude::*;

use crate::detection::FrameWindow;
use crate::frame::{Frame, Label};
use crate::tracking::{TrackPoint, Trajectory};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SequenceError {
    #[error("frames '{first}' and '{second}' share timestamp {timestamp}")]
    DuplicateTimestamp {
        timestamp: NaiveDateTime,
        first: String,
        second: String,
    },
}

/// Frames of one observation run, sorted by timestamp.
#[derive(Debug)]
pub struct Sequence {
    id: String,
    frames: Vec<Frame>,
}

impl Sequence {
    /// Sort `frames` by timestamp. Two frames with the same timestamp are an
    /// error since tracking needs a strict time order.
    pub fn new(id: impl Into<String>, mut frames: Vec<Frame>) -> Result<Self, SequenceError> {
        frames.sort_by_key(Frame::timestamp);
        if let Some(pair) = frames
            .windows(2)
            .find(|w| w[0].timestamp() == w[1].timestamp())
        {
            return Err(SequenceError::DuplicateTimestamp {
                timestamp: pair[0].timestamp(),
                first: pair[0].id().to_string(),
                second: pair[1].id().to_string(),
            });
        }
        Ok(Self {
            id: id.into(),
            frames,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Temporal neighbors of frame `index`, see [`FrameWindow::for_index`].
    pub fn window(&self, index: usize) -> FrameWindow<'_> {
        FrameWindow::for_index(&self.frames, index)
    }

    pub fn frame_at(&self, timestamp: NaiveDateTime) -> Option<&Frame> {
        self.frames
            .binary_search_by_key(&timestamp, Frame::timestamp)
            .ok()
            .map(|i| &self.frames[i])
    }

    /// Ground-truth path through the labeled positions, if every frame is
    /// labeled.
    pub fn labeled_trajectory(&self) -> Option<Trajectory> {
        if self.frames.is_empty() {
            return None;
        }
        let points = self
            .frames
            .iter()
            .map(|f| f.label().map(|l| TrackPoint::new(f.timestamp(), l.position)))
            .collect::<Option<Vec<_>>>()?;
        Some(Trajectory::new(points))
    }
}

/// Load a labeled sequence folder.
///
/// Reads `<folder>/<folder-name>.txt`, decodes every listed image with
/// `loader` (in parallel) and returns the frames in time order. The folder
/// name becomes the sequence id.
pub fn load_sequence(folder: &Path, loader: &dyn FrameLoader) -> anyhow::Result<Sequence> {
    let records = read_metadata(folder)?;
    let id = common::file_utils::file_name_string(folder);

    let frames = records
        .into_par_iter()
        .map(|record| -> anyhow::Result<Frame> {
            let path = folder.join(&record.filename);
            let raw = loader
                .load(&path)
                .with_context(|| format!("Failed to load frame: {}", path.display()))?;

            let exposure_time = raw
                .exposure_time
                .filter(|t| *t > 0.0)
                .unwrap_or_else(|| {
                    tracing::warn!(frame = %record.filename, "No exposure time, assuming 1s");
                    1.0
                });

            Ok(Frame::new(record.filename, record.timestamp, raw.pixels)
                .with_path(path)
                .with_exposure_time(exposure_time)
                .with_label(Label {
                    position: record.labeled_position,
                    vmag: record.vmag,
                }))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let sequence = Sequence::new(id, frames)
        .with_context(|| format!("Invalid sequence: {}", folder.display()))?;

    tracing::info!(
        sequence = %sequence.id(),
        frames = sequence.len(),
        "Loaded sequence"
    );
    Ok(sequence)
}
