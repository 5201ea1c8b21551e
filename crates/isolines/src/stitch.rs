//! Stitching fragmented open runs back into continuous isolines.
//!
//! The tracer only guarantees locally correct segments, so one physical
//! isoline can arrive as several open runs. Two runs are joined when a pair
//! of their ends nearly coincide and the curve continues smoothly through
//! the join. Merging is first-match: pairs are scanned in index order, the
//! four end pairings in a fixed order, and the scan restarts after every
//! merge. Each merge removes one run, so the loop terminates.

use crate::config::IsolineConfig;
use crate::grid::{Bounds, DomainPoint, GridField};
use crate::run::{Run, RunArena, RunEnd};

/// How two runs meet at a candidate join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// A's last point meets B's first point.
    EndStart,
    /// A's last point meets B's last point.
    EndEnd,
    /// A's first point meets B's first point.
    StartStart,
    /// A's first point meets B's last point.
    StartEnd,
}

impl Pairing {
    /// Enumeration order used to break ties.
    pub const ORDER: [Pairing; 4] = [
        Pairing::EndStart,
        Pairing::EndEnd,
        Pairing::StartStart,
        Pairing::StartEnd,
    ];

    fn ends(self) -> (RunEnd, RunEnd) {
        match self {
            Pairing::EndStart => (RunEnd::End, RunEnd::Start),
            Pairing::EndEnd => (RunEnd::End, RunEnd::End),
            Pairing::StartStart => (RunEnd::Start, RunEnd::Start),
            Pairing::StartEnd => (RunEnd::Start, RunEnd::End),
        }
    }
}

/// Geometry and thresholds for join decisions.
#[derive(Debug, Clone, Copy)]
pub struct StitchParams {
    pub bounds: Bounds,
    pub year_step: f64,
    pub age_step: f64,
    /// Join tolerance as a fraction of one grid cell per axis.
    pub tolerance: f64,
    pub boundary_tightening: f64,
    pub tangent_cos_min: f64,
    pub epsilon: f64,
}

impl StitchParams {
    pub fn new(field: &GridField, config: &IsolineConfig) -> Self {
        Self {
            bounds: field.bounds(),
            year_step: field.year_step(),
            age_step: field.age_step(),
            tolerance: config.stitch_tolerance,
            boundary_tightening: config.boundary_tightening,
            tangent_cos_min: config.tangent_cos_min,
            epsilon: config.epsilon,
        }
    }
}

/// Counters reported by [`stitch_runs`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StitchStats {
    pub merges: usize,
    /// Merges whose result closed on itself and left the open set.
    pub rings_closed: usize,
}

/// An endpoint with its outward unit tangent in cell-scaled units.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    point: DomainPoint,
    tangent: Option<(f64, f64)>,
}

fn endpoint(run: &Run, end: RunEnd, params: &StitchParams) -> Option<Endpoint> {
    let n = run.points.len();
    if n < 2 {
        return None;
    }
    let (tip, inner) = match end {
        RunEnd::Start => (run.points[0], run.points[1]),
        RunEnd::End => (run.points[n - 1], run.points[n - 2]),
    };
    let dx = (tip.year - inner.year) / params.year_step;
    let dy = (tip.age - inner.age) / params.age_step;
    let len = (dx * dx + dy * dy).sqrt();
    let tangent = (len > 1e-12 && len.is_finite()).then(|| (dx / len, dy / len));
    Some(Endpoint {
        point: tip,
        tangent,
    })
}

/// Whether two run ends may be joined.
///
/// Both outward tangents point away from their run's body, so a smooth
/// continuation has them pointing in opposite directions.
fn compatible(a: &Endpoint, b: &Endpoint, params: &StitchParams) -> bool {
    let bounds = &params.bounds;
    let eps = params.epsilon;

    let same_min_wall =
        (a.point.age - bounds.age_min).abs() < eps && (b.point.age - bounds.age_min).abs() < eps;
    let same_max_wall =
        (a.point.age - bounds.age_max).abs() < eps && (b.point.age - bounds.age_max).abs() < eps;
    if same_min_wall || same_max_wall {
        return false;
    }

    let mut tol = params.tolerance;
    if bounds.on_boundary(&a.point, eps) || bounds.on_boundary(&b.point, eps) {
        tol /= params.boundary_tightening;
    }
    if (a.point.year - b.point.year).abs() > tol * params.year_step
        || (a.point.age - b.point.age).abs() > tol * params.age_step
    {
        return false;
    }

    let (Some(ta), Some(tb)) = (a.tangent, b.tangent) else {
        return false;
    };
    let dot = -(ta.0 * tb.0 + ta.1 * tb.1);
    dot >= params.tangent_cos_min
}

/// First pairing of `a` and `b` that passes the distance and tangent checks.
pub fn find_pairing(a: &Run, b: &Run, params: &StitchParams) -> Option<Pairing> {
    Pairing::ORDER.into_iter().find(|pairing| {
        let (end_a, end_b) = pairing.ends();
        match (endpoint(a, end_a, params), endpoint(b, end_b, params)) {
            (Some(ea), Some(eb)) => compatible(&ea, &eb, params),
            _ => false,
        }
    })
}

/// Concatenate `a` and `b` in the orientation implied by `pairing`.
///
/// The join point is kept once when both sides carry it.
pub fn join_runs(a: &Run, b: &Run, pairing: Pairing, epsilon: f64) -> Vec<DomainPoint> {
    let forward = |r: &Run| r.points.clone();
    let reversed = |r: &Run| r.points.iter().rev().copied().collect::<Vec<_>>();

    let (head, tail) = match pairing {
        Pairing::EndStart => (forward(a), forward(b)),
        Pairing::EndEnd => (forward(a), reversed(b)),
        Pairing::StartStart => (reversed(a), forward(b)),
        Pairing::StartEnd => (forward(b), forward(a)),
    };

    let mut points = head;
    let skip = match (points.last(), tail.first()) {
        (Some(last), Some(first)) if last.approx_eq(first, epsilon) => 1,
        _ => 0,
    };
    points.extend_from_slice(&tail[skip..]);
    points
}

fn next_merge(
    arena: &RunArena,
    working: &[usize],
    params: &StitchParams,
) -> Option<(usize, usize, Pairing)> {
    for (pos, &a) in working.iter().enumerate() {
        let Some(run_a) = arena.get(a) else {
            continue;
        };
        for &b in &working[pos + 1..] {
            let Some(run_b) = arena.get(b) else {
                continue;
            };
            if let Some(pairing) = find_pairing(run_a, run_b, params) {
                return Some((a, b, pairing));
            }
        }
    }
    None
}

/// Merge open runs of one level until no pair can be joined.
///
/// Closed runs pass through untouched and keep their position.
pub fn stitch_runs(runs: Vec<Run>, params: &StitchParams) -> (Vec<Run>, StitchStats) {
    let mut stats = StitchStats::default();
    let mut arena = RunArena::new(runs);
    let mut working = arena.open_indices();

    while let Some((a, b, pairing)) = next_merge(&arena, &working, params) {
        let (Some(run_a), Some(run_b)) = (arena.get(a), arena.get(b)) else {
            break;
        };
        let points = join_runs(run_a, run_b, pairing, params.epsilon);

        let closes = points.len() >= 4
            && points[0].approx_eq(&points[points.len() - 1], params.epsilon)
            && !params.bounds.on_boundary(&points[0], params.epsilon);
        let joined = if closes {
            Run::closed(points)
        } else {
            Run::open(points)
        };

        working = arena.merge(a, b, joined, &working);
        if closes {
            working.retain(|&i| i != a);
            stats.rings_closed += 1;
        }
        stats.merges += 1;

        tracing::trace!(keep = a, retired = b, ?pairing, closes, "merged runs");
    }

    (arena.into_runs(), stats)
}
