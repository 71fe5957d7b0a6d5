//! Distance primitives shared by clustering and tracking.

use glam::{DVec2, IVec2};

#[inline]
pub fn manhattan(a: DVec2, b: DVec2) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

#[inline]
pub fn manhattan_i(a: IVec2, b: IVec2) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// Squared distance from `p` to the infinite line through `a` and `b`.
///
/// Degenerates to the squared distance to `a` when `a == b`.
#[inline]
pub fn sq_dist_from_line(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let dir = b - a;
    let len_sq = dir.length_squared();
    if len_sq == 0.0 {
        return p.distance_squared(a);
    }
    let cross = dir.x * (a.y - p.y) - (a.x - p.x) * dir.y;
    cross * cross / len_sq
}
