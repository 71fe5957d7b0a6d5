//! A single exposure of a sequence: intensity grid plus metadata.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use common::Buffer2;
use glam::DVec2;

/// Ground-truth annotation of a training frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Label {
    /// Sub-pixel comet position.
    pub position: DVec2,
    /// Visual magnitude, if the annotator recorded one.
    pub vmag: Option<f64>,
}

/// One image of a sequence.
///
/// The pixel grid is immutable once constructed. Detected spots are attached
/// exactly once by the detection phase and read by the tracker afterwards.
#[derive(Debug)]
pub struct Frame {
    id: String,
    path: Option<PathBuf>,
    timestamp: NaiveDateTime,
    exposure_time: f64,
    label: Option<Label>,
    pixels: Buffer2<u16>,
    spots: OnceLock<Vec<DVec2>>,
}

impl Frame {
    pub fn new(id: impl Into<String>, timestamp: NaiveDateTime, pixels: Buffer2<u16>) -> Self {
        Self {
            id: id.into(),
            path: None,
            timestamp,
            exposure_time: 1.0,
            label: None,
            pixels,
            spots: OnceLock::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_exposure_time(mut self, seconds: f64) -> Self {
        debug_assert!(seconds > 0.0, "exposure time must be positive");
        self.exposure_time = seconds;
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    /// File name (or caller-chosen identifier) of the frame.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Exposure in seconds. Not used by detection; exposed for flux normalization.
    pub fn exposure_time(&self) -> f64 {
        self.exposure_time
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &Buffer2<u16> {
        &self.pixels
    }

    /// Intensity at (x, y); coordinates outside the grid read the nearest edge pixel.
    #[inline]
    pub fn intensity(&self, x: i64, y: i64) -> u32 {
        *self.pixels.get_clamped(x, y) as u32
    }

    /// Attach the detected spot list. Fails, handing the list back, if spots
    /// were already attached.
    pub fn attach_spots(&self, spots: Vec<DVec2>) -> Result<(), Vec<DVec2>> {
        self.spots.set(spots)
    }

    /// Detected spots, or `None` before detection ran.
    pub fn spots(&self) -> Option<&[DVec2]> {
        self.spots.get().map(Vec::as_slice)
    }
}

/// Seconds from `origin` to `t` (negative if `t` is earlier).
#[inline]
pub fn seconds_between(origin: NaiveDateTime, t: NaiveDateTime) -> f64 {
    (t - origin).num_milliseconds() as f64 / 1000.0
}
