//! Synthetic frames and timestamps for tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use common::Buffer2;
use glam::IVec2;

use crate::frame::Frame;

pub const BACKGROUND: u16 = 100;
pub const SPOT_VALUE: u16 = 1000;

/// 2024-01-01 00:00:00 plus `seconds`.
pub fn timestamp(seconds: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid base date")
        + TimeDelta::seconds(seconds)
}

/// Flat grid with 3x3 blocks of `SPOT_VALUE` centered on each spot.
pub fn grid_with_spots(width: usize, height: usize, spots: &[IVec2]) -> Buffer2<u16> {
    Buffer2::from_fn(width, height, |x, y| {
        let p = IVec2::new(x as i32, y as i32);
        let lit = spots
            .iter()
            .any(|s| (s.x - p.x).abs() <= 1 && (s.y - p.y).abs() <= 1);
        if lit {
            SPOT_VALUE
        } else {
            BACKGROUND
        }
    })
}

/// Frame named `NNN.fts` taken `index` minutes after the base time.
pub fn frame_with_spots(index: usize, width: usize, height: usize, spots: &[IVec2]) -> Frame {
    Frame::new(
        format!("{index:03}.fts"),
        timestamp(index as i64 * 60),
        grid_with_spots(width, height, spots),
    )
}

/// Checkerboard background: `low` where x + y is even, `high` where odd.
pub fn checker_grid(width: usize, height: usize, low: u16, high: u16) -> Buffer2<u16> {
    Buffer2::from_fn(width, height, |x, y| if (x + y) % 2 == 0 { low } else { high })
}

pub fn init_tracing() {
    common::log_setup::init_test_logging();
}
