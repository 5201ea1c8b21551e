//! Run normalization and per-level deduplication.

use crate::grid::DomainPoint;
use crate::run::Run;
use std::collections::HashSet;
use std::fmt::Write;

/// Collapse consecutive points closer than `epsilon` on both axes.
///
/// The first point of each near-duplicate streak is kept.
pub fn collapse_points(points: &[DomainPoint], epsilon: f64) -> Vec<DomainPoint> {
    let mut out: Vec<DomainPoint> = Vec::with_capacity(points.len());
    for &p in points {
        match out.last() {
            Some(prev) if prev.approx_eq(&p, epsilon) => {}
            _ => out.push(p),
        }
    }
    out
}

/// Canonical signature of a run: the smaller of its forward and reversed
/// rounded coordinate strings, so a run and its reversal collide.
pub fn run_signature(points: &[DomainPoint], decimals: usize) -> String {
    let forward = encode_points(points.iter(), decimals);
    let reversed = encode_points(points.iter().rev(), decimals);
    forward.min(reversed)
}

/// Round to `decimals` places; a result of -0 becomes +0.
fn rounded(v: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals.min(15) as i32);
    (v * scale).round() / scale + 0.0
}

fn encode_points<'a>(points: impl Iterator<Item = &'a DomainPoint>, decimals: usize) -> String {
    let mut s = String::new();
    for p in points {
        let _ = write!(
            s,
            "{:.*},{:.*};",
            decimals,
            rounded(p.year, decimals),
            decimals,
            rounded(p.age, decimals)
        );
    }
    s
}

/// Outcome counters of [`normalize_runs`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeStats {
    pub too_short: usize,
    pub duplicates: usize,
}

/// Collapse near-duplicate points, drop runs with fewer than two points, and
/// keep only the first run seen per signature.
pub fn normalize_runs(runs: Vec<Run>, epsilon: f64, decimals: usize) -> (Vec<Run>, NormalizeStats) {
    let mut stats = NormalizeStats::default();
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(runs.len());

    for run in runs {
        let points = collapse_points(&run.points, epsilon);
        if points.len() < 2 {
            stats.too_short += 1;
            continue;
        }
        if !seen.insert(run_signature(&points, decimals)) {
            stats.duplicates += 1;
            continue;
        }
        out.push(Run {
            kind: run.kind,
            points,
        });
    }

    (out, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(year: f64, age: f64) -> DomainPoint {
        DomainPoint::new(year, age)
    }

    #[test]
    fn test_collapse_keeps_first() {
        let pts = vec![p(0.0, 0.0), p(0.0, 1e-9), p(1.0, 0.0), p(1.0, 0.0)];
        let out = collapse_points(&pts, 1e-6);
        assert_eq!(out, vec![p(0.0, 0.0), p(1.0, 0.0)]);
    }

    #[test]
    fn test_signature_reversal_invariant() {
        let pts = vec![p(2000.0, 0.0), p(2001.0, 5.0), p(2002.0, 7.5)];
        let rev: Vec<_> = pts.iter().rev().copied().collect();
        assert_eq!(run_signature(&pts, 4), run_signature(&rev, 4));
        assert!(run_signature(&pts, 2).starts_with("2000.00,0.00;"));
    }

    #[test]
    fn test_signature_ignores_sign_of_zero() {
        let a = vec![p(2000.0, -1e-9), p(2001.0, 5.0)];
        let b = vec![p(2000.0, 2e-9), p(2001.0, 5.0)];
        assert_eq!(run_signature(&a, 4), run_signature(&b, 4));
        assert!(run_signature(&a, 4).contains("2000.0000,0.0000;"));

        let (out, stats) = normalize_runs(vec![Run::open(a), Run::open(b)], 1e-12, 4);
        assert_eq!(out.len(), 1);
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn test_short_runs_dropped() {
        let runs = vec![Run::open(vec![p(0.0, 0.0), p(0.0, 0.0)])];
        let (out, stats) = normalize_runs(runs, 1e-6, 4);
        assert!(out.is_empty());
        assert_eq!(stats.too_short, 1);
    }
}
