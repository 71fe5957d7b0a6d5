//! Finished trajectories, the linear motion model and quality scoring.

use chrono::NaiveDateTime;
use glam::DVec2;

use crate::frame::seconds_between;
use crate::geometry::sq_dist_from_line;

/// One observation of a tracked object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub timestamp: NaiveDateTime,
    pub position: DVec2,
}

impl TrackPoint {
    pub fn new(timestamp: NaiveDateTime, position: DVec2) -> Self {
        Self {
            timestamp,
            position,
        }
    }
}

/// Uniform motion anchored at two observations.
///
/// Positions are predicted as `origin + displacement * (t - t0) / (t1 - t0)`,
/// so times before `t0` or after `t1` extrapolate along the same line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMotion {
    origin: DVec2,
    origin_time: NaiveDateTime,
    displacement: DVec2,
    span_seconds: f64,
}

impl LinearMotion {
    /// Model through `first` and `last`. `None` if both lie at the same time.
    pub fn through(first: &TrackPoint, last: &TrackPoint) -> Option<Self> {
        let span_seconds = seconds_between(first.timestamp, last.timestamp);
        if span_seconds == 0.0 {
            return None;
        }
        Some(Self {
            origin: first.position,
            origin_time: first.timestamp,
            displacement: last.position - first.position,
            span_seconds,
        })
    }

    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn predict(&self, t: NaiveDateTime) -> DVec2 {
        let fraction = seconds_between(self.origin_time, t) / self.span_seconds;
        self.origin + self.displacement * fraction
    }
}

/// Mean squared deviations of a trajectory from its own linear model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrajectoryQuality {
    /// Mean squared distance to the time-interpolated position.
    pub dist_error: f64,
    /// Mean squared perpendicular distance to the first-last line.
    pub line_error: f64,
}

impl TrajectoryQuality {
    /// `1 / (1 + dist_error + line_error)`, in (0, 1].
    pub fn confidence(&self) -> f64 {
        1.0 / (1.0 + self.dist_error + self.line_error)
    }
}

/// A finished, time-ordered path.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    points: Vec<TrackPoint>,
}

impl Trajectory {
    /// # Panics
    ///
    /// Panics if `points` is empty.
    pub fn new(points: Vec<TrackPoint>) -> Self {
        assert!(!points.is_empty(), "trajectory needs at least one point");
        debug_assert!(
            points.windows(2).all(|w| w[0].timestamp < w[1].timestamp),
            "trajectory timestamps must strictly increase"
        );
        Self { points }
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &TrackPoint {
        &self.points[0]
    }

    pub fn last(&self) -> &TrackPoint {
        &self.points[self.points.len() - 1]
    }

    /// Model anchored at the first and last point; `None` for one point.
    pub fn motion(&self) -> Option<LinearMotion> {
        LinearMotion::through(self.first(), self.last())
    }

    /// Errors over the interior points `1 .. len - 2`.
    ///
    /// The first point and the last two points never contribute. Paths with
    /// no interior points (length up to 3) score zero on both errors.
    pub fn quality(&self) -> TrajectoryQuality {
        let n = self.points.len();
        if n < 4 {
            return TrajectoryQuality::default();
        }
        let Some(motion) = self.motion() else {
            return TrajectoryQuality::default();
        };

        let first = self.first().position;
        let last = self.last().position;
        let interior = &self.points[1..n - 2];

        let mut dist_sum = 0.0;
        let mut line_sum = 0.0;
        for p in interior {
            dist_sum += p.position.distance_squared(motion.predict(p.timestamp));
            line_sum += sq_dist_from_line(p.position, first, last);
        }
        let count = interior.len() as f64;

        TrajectoryQuality {
            dist_error: dist_sum / count,
            line_error: line_sum / count,
        }
    }

    pub fn confidence(&self) -> f64 {
        self.quality().confidence()
    }
}
