//! Merging of adjacent candidate pixels into one spot per source.
//!
//! Candidates closer than the cluster distance (Manhattan) are joined, and
//! joining is transitive: a chain of close pairs forms one cluster even when
//! its ends are far apart. Each cluster is replaced by its integer centroid.


use glam::IVec2;
use hashbrown::HashSet;

/// Cluster `candidates` and return one representative per cluster.
///
/// Duplicate input positions count once. Clusters are emitted in the order
/// of their first member in `candidates`; a single-member cluster returns its
/// member unchanged, larger ones their centroid rounded half-up per axis.
/// Distinct clusters whose centroids coincide are reported once.
///
/// Quadratic in the number of candidates, which stays small once the
/// temporal filter has run.
pub fn cluster_candidates(candidates: &[IVec2], max_distance: u32) -> Vec<IVec2> {
    let mut seen = HashSet::with_capacity(candidates.len());
    let points: Vec<IVec2> = candidates
        .iter()
        .copied()
        .filter(|p| seen.insert(*p))
        .collect();

    let mut sets = DisjointSets::new(points.len());
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            if crate::geometry::manhattan_i(points[i], points[j]) <= max_distance {
                sets.union(i, j);
            }
        }
    }

    // Accumulate per root; roots are the smallest member index, so iterating
    // members in order visits clusters in first-seen order.
    let mut slot_of_root = vec![usize::MAX; points.len()];
    let mut sums: Vec<(i64, i64, i64)> = Vec::new();
    for (i, p) in points.iter().enumerate() {
        let root = sets.find(i);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = sums.len();
            sums.push((0, 0, 0));
        }
        let sum = &mut sums[slot_of_root[root]];
        sum.0 += p.x as i64;
        sum.1 += p.y as i64;
        sum.2 += 1;
    }

    let mut emitted = HashSet::with_capacity(sums.len());
    sums.into_iter()
        .map(|(sx, sy, n)| {
            IVec2::new(
                ((sx + n / 2).div_euclid(n)) as i32,
                ((sy + n / 2).div_euclid(n)) as i32,
            )
        })
        .filter(|c| emitted.insert(*c))
        .collect()
}

/// Union-find over dense indices. Union attaches the larger root under the
/// smaller, so every root is the lowest index in its set.
#[derive(Debug)]
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        while self.parent[i] != root {
            let next = self.parent[i];
            self.parent[i] = root;
            i = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (small, large) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[large] = small;
        }
    }
}
