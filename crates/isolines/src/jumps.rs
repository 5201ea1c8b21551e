//! Cutting runs at implausible jumps between consecutive points.

use crate::run::{Run, RunKind};

/// Per-axis distance limits between consecutive points.
#[derive(Debug, Clone, Copy)]
pub struct JumpLimits {
    pub max_year_delta: f64,
    pub max_age_delta: f64,
}

/// Cut `run` wherever consecutive points jump further than `limits` allow.
///
/// Returns the run unchanged when there is no jump. Pieces with fewer than
/// two points are dropped. A cut ring is no longer closed, so every piece of
/// a cut run is open. The second value counts the cuts made.
pub fn split_jumps(run: Run, limits: JumpLimits) -> (Vec<Run>, usize) {
    let is_jump = |i: usize| {
        let a = run.points[i - 1];
        let b = run.points[i];
        (b.year - a.year).abs() > limits.max_year_delta
            || (b.age - a.age).abs() > limits.max_age_delta
    };

    let cuts: Vec<usize> = (1..run.points.len()).filter(|&i| is_jump(i)).collect();
    if cuts.is_empty() {
        return (vec![run], 0);
    }

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &cut in cuts.iter().chain(std::iter::once(&run.points.len())) {
        let piece = &run.points[start..cut];
        if piece.len() >= 2 {
            pieces.push(Run {
                kind: RunKind::Open,
                points: piece.to_vec(),
            });
        }
        start = cut;
    }

    (pieces, cuts.len())
}
