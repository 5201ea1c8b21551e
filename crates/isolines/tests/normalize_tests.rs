//! Tests for run normalization and deduplication.

use isolines::normalize::{collapse_points, normalize_runs, run_signature};
use isolines::{DomainPoint, Run};

fn p(year: f64, age: f64) -> DomainPoint {
    DomainPoint::new(year, age)
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_normalize_is_idempotent() {
    let runs = vec![
        Run::open(vec![p(0.0, 0.0), p(0.0, 0.0), p(1.0, 1.0), p(1.0, 1.0000001)]),
        Run::open(vec![p(1.0, 1.0), p(0.0, 0.0)]),
        Run::open(vec![p(5.0, 5.0), p(5.0, 5.0)]),
        Run::closed(vec![p(2.0, 2.0), p(3.0, 2.0), p(3.0, 3.0), p(2.0, 2.0)]),
    ];

    let (once, _) = normalize_runs(runs, 1e-6, 4);
    let (twice, stats) = normalize_runs(once.clone(), 1e-6, 4);

    assert_eq!(once, twice);
    assert_eq!(stats.too_short, 0);
    assert_eq!(stats.duplicates, 0);
}

#[test]
fn test_collapse_twice_changes_nothing() {
    let points = vec![p(0.0, 0.0), p(0.0, 1e-7), p(1.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)];
    let once = collapse_points(&points, 1e-6);
    assert_eq!(once.len(), 3);
    assert_eq!(collapse_points(&once, 1e-6), once);
}

// ============================================================================
// Deduplication
// ============================================================================

#[test]
fn test_reversed_duplicates_keep_exactly_one() {
    let forward = Run::open(vec![p(2000.0, 10.0), p(2001.0, 12.5), p(2002.0, 15.0)]);
    let mut reversed = forward.clone();
    reversed.points.reverse();

    let (runs, stats) = normalize_runs(vec![forward.clone(), reversed], 1e-6, 4);
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0], forward);
    assert_eq!(stats.duplicates, 1);
}

#[test]
fn test_signature_rounding() {
    let a = [p(2000.00001, 10.0), p(2001.0, 12.0)];
    let b = [p(2000.0, 10.00002), p(2001.0, 12.0)];
    assert_eq!(run_signature(&a, 4), run_signature(&b, 4));
    assert_ne!(run_signature(&a, 6), run_signature(&b, 6));
}

#[test]
fn test_distinct_runs_survive() {
    let a = Run::open(vec![p(0.0, 0.0), p(1.0, 1.0)]);
    let b = Run::open(vec![p(0.0, 0.0), p(1.0, 2.0)]);
    let (runs, stats) = normalize_runs(vec![a, b], 1e-6, 4);
    assert_eq!(runs.len(), 2);
    assert_eq!(stats.duplicates, 0);
}
