//! Candidate pixel detection with temporal rejection.
//!
//! A pixel becomes a candidate when it scores at or above the detection
//! threshold on the current frame while scoring below the neighbor threshold
//! on both temporally adjacent frames. Stars and hot pixels stay put between
//! exposures and are bright in all three frames, so they are rejected; a
//! moving comet is only bright at that pixel in the current frame.


use glam::IVec2;
use rayon::prelude::*;

use crate::config::Config;
use crate::frame::Frame;
use crate::scoring::SpotScorer;

/// The frame being scanned plus the frames it is compared against.
///
/// At the sequence edges one real neighbor stands in for both sides. A
/// single-frame sequence has no neighbors at all.
#[derive(Debug, Clone, Copy)]
pub struct FrameWindow<'a> {
    pub previous: Option<&'a Frame>,
    pub current: &'a Frame,
    pub next: Option<&'a Frame>,
}

impl<'a> FrameWindow<'a> {
    /// Window for `frames[index]`.
    ///
    /// The first frame borrows `frames[1]` as its previous frame and the last
    /// frame reuses its previous frame as next, so every edge frame is still
    /// compared against two frames.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn for_index(frames: &'a [Frame], index: usize) -> Self {
        assert!(index < frames.len(), "frame index {index} out of bounds");
        let last = frames.len() - 1;
        let current = &frames[index];

        if last == 0 {
            return Self {
                previous: None,
                current,
                next: None,
            };
        }

        let previous = if index == 0 {
            &frames[1]
        } else {
            &frames[index - 1]
        };
        let next = if index == last {
            previous
        } else {
            &frames[index + 1]
        };

        Self {
            previous: Some(previous),
            current,
            next: Some(next),
        }
    }
}

/// Applies a [`SpotScorer`] to the current frame and its neighbors.
#[derive(Debug, Clone, Copy)]
pub struct TemporalFilter<'a> {
    scorer: &'a dyn SpotScorer,
    detection_threshold: f64,
    neighbor_threshold: f64,
}

impl<'a> TemporalFilter<'a> {
    pub fn new(scorer: &'a dyn SpotScorer, config: &Config) -> Self {
        Self {
            scorer,
            detection_threshold: config.detection_threshold,
            neighbor_threshold: config.neighbor_threshold,
        }
    }

    /// Whether (x, y) is a moving-source candidate in `window.current`.
    pub fn is_candidate(&self, window: &FrameWindow<'_>, x: i64, y: i64) -> bool {
        if self.scorer.score(window.current, x, y) < self.detection_threshold {
            return false;
        }
        let bright_in = |frame: Option<&Frame>| {
            frame.is_some_and(|f| self.scorer.score(f, x, y) >= self.neighbor_threshold)
        };
        !bright_in(window.previous) && !bright_in(window.next)
    }

    /// Scan every pixel of the current frame. Candidates come back in
    /// row-major order; rows are scored in parallel.
    pub fn scan(&self, window: &FrameWindow<'_>) -> Vec<IVec2> {
        let width = window.current.width();
        let height = window.current.height();

        (0..height)
            .into_par_iter()
            .flat_map_iter(|y| {
                (0..width).filter_map(move |x| {
                    self.is_candidate(window, x as i64, y as i64)
                        .then(|| IVec2::new(x as i32, y as i32))
                })
            })
            .collect()
    }
}
