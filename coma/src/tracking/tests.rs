use glam::DVec2;

use super::arena::TrackArena;
use super::*;
use crate::testing::timestamp;

fn point(seconds: i64, x: f64, y: f64) -> TrackPoint {
    TrackPoint::new(timestamp(seconds), DVec2::new(x, y))
}

fn run(config: &Config, frames: &[Vec<(f64, f64)>]) -> TrackingResult {
    let mut tracker = TrajectoryTracker::new(config);
    for (i, spots) in frames.iter().enumerate() {
        let spots: Vec<DVec2> = spots.iter().map(|&(x, y)| DVec2::new(x, y)).collect();
        tracker
            .push_frame(timestamp(i as i64 * 60), &spots)
            .expect("increasing timestamps");
    }
    tracker.finish()
}

fn positions(t: &Trajectory) -> Vec<(f64, f64)> {
    t.points()
        .iter()
        .map(|p| (p.position.x, p.position.y))
        .collect()
}

// =============================================================================
// Arena
// =============================================================================

#[test]
fn test_arena_forks_share_prefix() {
    let mut arena = TrackArena::new();
    let root = arena.seed(point(0, 0.0, 0.0));
    let a = arena.extend(root, point(60, 1.0, 0.0));
    let b = arena.extend(root, point(60, 0.0, 1.0));
    let a2 = arena.extend(a, point(120, 2.0, 0.0));

    assert_eq!(arena.node_count(), 4);
    assert_eq!(arena.len(root), 1);
    assert_eq!(arena.len(a2), 3);
    assert_eq!(arena.first(a2), &point(0, 0.0, 0.0));
    assert_eq!(arena.last(b), &point(60, 0.0, 1.0));
    assert_eq!(
        arena.history(a2),
        vec![point(0, 0.0, 0.0), point(60, 1.0, 0.0), point(120, 2.0, 0.0)]
    );
    // Extending `a` left `root` and `b` untouched.
    assert_eq!(arena.history(b), vec![point(0, 0.0, 0.0), point(60, 0.0, 1.0)]);
    assert_eq!(arena.history(root), vec![point(0, 0.0, 0.0)]);
}

// =============================================================================
// Motion model and extension rule
// =============================================================================

#[test]
fn test_linear_motion_interpolates_and_extrapolates() {
    let motion = LinearMotion::through(&point(0, 10.0, 10.0), &point(60, 15.0, 12.0)).unwrap();
    assert_eq!(motion.predict(timestamp(0)), DVec2::new(10.0, 10.0));
    assert_eq!(motion.predict(timestamp(30)), DVec2::new(12.5, 11.0));
    assert_eq!(motion.predict(timestamp(120)), DVec2::new(20.0, 14.0));
    assert!(LinearMotion::through(&point(0, 0.0, 0.0), &point(0, 1.0, 1.0)).is_none());
}

fn eastward() -> LinearMotion {
    LinearMotion::through(&point(0, 0.0, 0.0), &point(60, 10.0, 0.0)).unwrap()
}

#[test]
fn test_single_point_accepts_anything() {
    let rule = ExtensionRule::from_config(&Config::default());
    assert!(rule.accepts(None, &point(60, 1000.0, -500.0)));
}

#[test]
fn test_extension_tolerance_is_inclusive() {
    let rule = ExtensionRule::from_config(&Config::default());
    let motion = eastward();
    assert!(rule.accepts(Some(&motion), &point(120, 25.0, 0.0)));
    assert!(rule.accepts(Some(&motion), &point(120, 15.0, 0.0)));
    assert!(!rule.accepts(Some(&motion), &point(120, 25.0 + 1e-9, 0.0)));
}

#[test]
fn test_collinearity_tolerance() {
    let rule = ExtensionRule::from_config(&Config::default());
    let motion = eastward();
    assert!(rule.accepts(Some(&motion), &point(120, 20.0, 1.4)));
    assert!(!rule.accepts(Some(&motion), &point(120, 20.0, 1.5)));
    // Within the Manhattan budget but far off the line.
    assert!(!rule.accepts(Some(&motion), &point(120, 22.5, 2.5)));
}

// =============================================================================
// Tracker
// =============================================================================

#[test]
fn test_linear_track_yields_single_perfect_trajectory() {
    crate::testing::init_tracing();
    let frames = vec![
        vec![(10.0, 10.0)],
        vec![(15.0, 12.0)],
        vec![(20.0, 14.0)],
        vec![(25.0, 16.0)],
        vec![(30.0, 18.0)],
    ];
    let result = run(&Config::default(), &frames);

    assert_eq!(result.trajectories.len(), 1);
    let t = &result.trajectories[0];
    assert_eq!(t.len(), 5);
    assert_eq!(
        positions(t),
        vec![(10.0, 10.0), (15.0, 12.0), (20.0, 14.0), (25.0, 16.0), (30.0, 18.0)]
    );
    assert_eq!(t.quality(), TrajectoryQuality::default());
    assert_eq!(t.confidence(), 1.0);

    assert_eq!(
        result.stats,
        TrackingStats {
            frames: 5,
            seeded: 5,
            extended: 10,
            archived: 1,
            discarded: 4,
            peak_live: 5,
        }
    );
}

#[test]
fn test_arena_grows_by_seeds_plus_extensions() {
    let mut tracker = TrajectoryTracker::new(&Config::default());
    let frames = [
        vec![DVec2::new(10.0, 10.0), DVec2::new(40.0, 40.0)],
        vec![DVec2::new(15.0, 12.0)],
        vec![],
        vec![DVec2::new(20.0, 14.0)],
    ];
    for (i, spots) in frames.iter().enumerate() {
        tracker.push_frame(timestamp(i as i64 * 60), spots).unwrap();
    }

    // Discarded histories keep their nodes.
    let stats = tracker.stats();
    assert!(stats.discarded > 0);
    assert_eq!(tracker.arena.node_count(), stats.seeded + stats.extended);
    assert_eq!(tracker.arena.node_count(), 6);
}

#[test]
fn test_length_four_discarded_length_five_archived() {
    let step = |i: usize| vec![(10.0 * i as f64, 5.0)];
    let four: Vec<_> = (0..4).map(step).collect();
    let five: Vec<_> = (0..5).map(step).collect();
    assert!(run(&Config::default(), &four).trajectories.is_empty());
    assert_eq!(run(&Config::default(), &five).trajectories.len(), 1);
}

#[test]
fn test_tolerance_boundary_through_tracker() {
    let config = Config {
        min_trajectory_len: 3,
        ..Default::default()
    };
    let on_boundary = run(
        &config,
        &[vec![(0.0, 0.0)], vec![(10.0, 0.0)], vec![(25.0, 0.0)]],
    );
    assert_eq!(on_boundary.trajectories.len(), 1);
    assert_eq!(
        positions(&on_boundary.trajectories[0]),
        vec![(0.0, 0.0), (10.0, 0.0), (25.0, 0.0)]
    );

    let beyond = run(
        &config,
        &[vec![(0.0, 0.0)], vec![(10.0, 0.0)], vec![(25.0 + 1e-9, 0.0)]],
    );
    assert!(beyond.trajectories.is_empty());
}

#[test]
fn test_unmatched_trajectory_is_retired_mid_sequence() {
    let config = Config {
        min_trajectory_len: 3,
        ..Default::default()
    };
    // The path stops after three frames; the later spot is far away.
    let result = run(
        &config,
        &[
            vec![(0.0, 0.0)],
            vec![(10.0, 0.0)],
            vec![(20.0, 0.0)],
            vec![(80.0, 80.0)],
        ],
    );
    assert_eq!(result.trajectories.len(), 1);
    assert_eq!(
        positions(&result.trajectories[0]),
        vec![(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]
    );
}

#[test]
fn test_trajectory_forks_on_ambiguous_spots() {
    let config = Config {
        min_trajectory_len: 3,
        ..Default::default()
    };
    let result = run(
        &config,
        &[
            vec![(0.0, 0.0)],
            vec![(10.0, 0.0)],
            vec![(20.0, 0.0), (21.0, 0.0)],
        ],
    );
    let paths: Vec<_> = result.trajectories.iter().map(positions).collect();
    assert_eq!(
        paths,
        vec![
            vec![(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)],
            vec![(0.0, 0.0), (10.0, 0.0), (21.0, 0.0)],
        ]
    );
}

#[test]
fn test_rejected_branch_is_dropped() {
    let mut tracker = TrajectoryTracker::new(&Config::default());
    tracker.push_frame(timestamp(0), &[DVec2::new(0.0, 0.0)]).unwrap();
    tracker
        .push_frame(timestamp(60), &[DVec2::new(10.0, 0.0), DVec2::new(10.0, 3.0)])
        .unwrap();
    // Two seeds plus two extensions of the first-frame seed.
    assert_eq!(tracker.live_count(), 4);

    tracker.push_frame(timestamp(120), &[DVec2::new(20.0, 0.0)]).unwrap();
    // The branch through (10, 3) expects (20, 6) and dies.
    assert_eq!(tracker.live_count(), 4);
    assert_eq!(tracker.stats().discarded, 1);
}

#[test]
fn test_empty_frames_retire_everything() {
    let result = run(
        &Config::default(),
        &[
            vec![(0.0, 0.0)],
            vec![(5.0, 0.0)],
            vec![(10.0, 0.0)],
            vec![(15.0, 0.0)],
            vec![(20.0, 0.0)],
            vec![],
            vec![],
        ],
    );
    assert_eq!(result.trajectories.len(), 1);
    assert_eq!(result.stats.frames, 7);
}

#[test]
fn test_non_increasing_timestamp_is_rejected() {
    let mut tracker = TrajectoryTracker::new(&Config::default());
    tracker.push_frame(timestamp(60), &[]).unwrap();
    assert_eq!(
        tracker.push_frame(timestamp(60), &[]),
        Err(TrackingError::NonIncreasingTimestamp {
            previous: timestamp(60),
            current: timestamp(60),
        })
    );
    assert!(tracker.push_frame(timestamp(0), &[]).is_err());
    assert!(tracker.push_frame(timestamp(120), &[]).is_ok());
}

// =============================================================================
// Quality
// =============================================================================

#[test]
fn test_quality_zero_for_short_paths() {
    let t = Trajectory::new(vec![point(0, 0.0, 0.0), point(60, 5.0, 9.0), point(120, 1.0, 1.0)]);
    assert_eq!(t.quality(), TrajectoryQuality::default());
    assert_eq!(t.confidence(), 1.0);
}

#[test]
fn test_quality_measures_interior_deviation() {
    let t = Trajectory::new(vec![
        point(0, 0.0, 0.0),
        point(60, 10.0, 1.0),
        point(120, 20.0, 0.0),
        point(180, 30.0, 0.0),
    ]);
    let q = t.quality();
    assert_eq!(q.dist_error, 1.0);
    assert_eq!(q.line_error, 1.0);
    assert_eq!(t.confidence(), 1.0 / 3.0);
}

#[test]
fn test_quality_ignores_last_two_points() {
    let t = Trajectory::new(vec![
        point(0, 0.0, 0.0),
        point(60, 10.0, 0.0),
        point(120, 20.0, 0.0),
        point(180, 30.0, 5.0),
        point(240, 40.0, 0.0),
    ]);
    assert_eq!(t.quality(), TrajectoryQuality::default());
}

#[test]
fn test_confidence_decreases_with_error() {
    let straight = Trajectory::new((0..6).map(|i| point(i * 60, i as f64 * 4.0, 0.0)).collect());
    let wobbly = Trajectory::new(
        (0..6)
            .map(|i| point(i * 60, i as f64 * 4.0, if i % 2 == 0 { 0.0 } else { 1.0 }))
            .collect(),
    );
    assert!(wobbly.confidence() < straight.confidence());
    assert!(wobbly.confidence() > 0.0);
}
