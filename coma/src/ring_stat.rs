//! Min/max/average accumulator over sampled pixel values.

/// Running aggregate of integer samples.
///
/// Merging is associative and commutative, so partial statistics over
/// disjoint pixel sets can be combined in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingStat {
    min: u32,
    max: u32,
    count: u32,
    sum: u64,
}

impl Default for RingStat {
    fn default() -> Self {
        Self::new()
    }
}

impl RingStat {
    /// Empty accumulator. Its min is `u32::MAX` and max is `0` until the first sample.
    pub const fn new() -> Self {
        Self {
            min: u32::MAX,
            max: 0,
            count: 0,
            sum: 0,
        }
    }

    #[inline]
    pub fn update(&mut self, value: u32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
        self.sum += value as u64;
    }

    #[inline]
    pub fn merge(&mut self, other: &RingStat) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count += other.count;
        self.sum += other.sum;
    }

    #[inline]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[inline]
    pub fn sum(&self) -> u64 {
        self.sum
    }

    /// Integer (floor) average; 0 when empty. Scores are computed from this.
    #[inline]
    pub fn average(&self) -> u32 {
        if self.count == 0 {
            0
        } else {
            (self.sum / self.count as u64) as u32
        }
    }

    /// Exact average; 0.0 when empty.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }
}

impl FromIterator<u32> for RingStat {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut stat = RingStat::new();
        for value in iter {
            stat.update(value);
        }
        stat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(values: &[u32]) -> RingStat {
        values.iter().copied().collect()
    }

    #[test]
    fn test_empty_reports_zero_average() {
        let s = RingStat::new();
        assert_eq!(s.count(), 0);
        assert_eq!(s.average(), 0);
        assert_eq!(s.mean(), 0.0);
    }

    #[test]
    fn test_update() {
        let s = stat(&[12, 55, 74, 79, 90]);
        assert_eq!(s.min(), 12);
        assert_eq!(s.max(), 90);
        assert_eq!(s.count(), 5);
        assert_eq!(s.sum(), 310);
        assert_eq!(s.average(), 62);
        assert_eq!(s.mean(), 62.0);
    }

    #[test]
    fn test_average_floors() {
        let s = stat(&[100, 100, 101]);
        assert_eq!(s.average(), 100);
        assert!((s.mean() - 100.333_333).abs() < 1e-5);
    }

    #[test]
    fn test_merge_equals_combined_updates() {
        let mut a = stat(&[5, 9]);
        a.merge(&stat(&[1, 20, 7]));
        assert_eq!(a, stat(&[5, 9, 1, 20, 7]));
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let a = stat(&[3, 4]);
        let mut b = a;
        b.merge(&RingStat::new());
        assert_eq!(a, b);

        let mut c = RingStat::new();
        c.merge(&a);
        assert_eq!(a, c);
    }

    #[test]
    fn test_merge_associative_and_commutative() {
        let a = stat(&[10, 250, 3]);
        let b = stat(&[77]);
        let c = stat(&[1000, 0, 42, 42]);

        let mut ab_c = a;
        ab_c.merge(&b);
        ab_c.merge(&c);

        let mut bc = b;
        bc.merge(&c);
        let mut a_bc = a;
        a_bc.merge(&bc);

        assert_eq!(ab_c, a_bc);

        let mut ba = b;
        ba.merge(&a);
        let mut ab = a;
        ab.merge(&b);
        assert_eq!(ab, ba);
    }
}
