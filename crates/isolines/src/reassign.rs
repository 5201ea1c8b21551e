//! Greedy re-assignment of endpoints on the age-zero edge.
//!
//! Snapping treats every endpoint on its own, so two runs can land on the
//! same analytic crossing of the youngest-age row while another crossing
//! stays unused. This pass distributes those endpoints over the true
//! crossings, one endpoint per crossing.

use crate::grid::GridField;
use crate::run::Run;
use std::collections::BTreeSet;

/// Counters reported by [`reassign_age_zero`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReassignStats {
    /// Endpoints assigned in the nearest-first pass.
    pub assigned: usize,
    /// Endpoints moved off a crossing already claimed by another run.
    pub reclaimed: usize,
}

/// Tolerances in year units.
#[derive(Debug, Clone, Copy)]
pub struct ReassignTolerances {
    pub primary: f64,
    pub fallback: f64,
    pub epsilon: f64,
}

#[derive(Debug, Clone, Copy)]
struct EdgeEndpoint {
    run: usize,
    point: usize,
    year: f64,
}

fn nearest_unused(
    year: f64,
    crossings: &[f64],
    claimed: &BTreeSet<usize>,
) -> Option<(usize, f64)> {
    crossings
        .iter()
        .enumerate()
        .filter(|(k, _)| !claimed.contains(k))
        .map(|(k, &c)| (k, (c - year).abs()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Re-assign open-run endpoints on the youngest-age edge to the analytic
/// crossings of `level` along that edge.
pub fn reassign_age_zero(
    runs: &mut [Run],
    level: f64,
    field: &GridField,
    tol: ReassignTolerances,
) -> ReassignStats {
    let mut stats = ReassignStats::default();
    let crossings = field.row_crossings(0, level);
    if crossings.is_empty() {
        return stats;
    }
    let age_min = field.age_min();

    let mut endpoints = Vec::new();
    for (r, run) in runs.iter().enumerate() {
        if !run.is_open() || run.len() < 2 {
            continue;
        }
        for point in [0, run.len() - 1] {
            let p = run.points[point];
            if (p.age - age_min).abs() < tol.epsilon {
                endpoints.push(EdgeEndpoint {
                    run: r,
                    point,
                    year: p.year,
                });
            }
        }
    }
    if endpoints.is_empty() {
        return stats;
    }

    let best = |year: f64| {
        crossings
            .iter()
            .map(|c| (c - year).abs())
            .fold(f64::INFINITY, f64::min)
    };
    // Stable: equally distant endpoints keep collection order.
    endpoints.sort_by(|a, b| best(a.year).total_cmp(&best(b.year)));

    let mut claimed = BTreeSet::new();
    let mut touched = vec![false; endpoints.len()];

    for (i, e) in endpoints.iter().enumerate() {
        if let Some((k, dist)) = nearest_unused(e.year, &crossings, &claimed) {
            if dist <= tol.primary {
                claimed.insert(k);
                touched[i] = true;
                let p = &mut runs[e.run].points[e.point];
                p.year = crossings[k];
                p.age = age_min;
                stats.assigned += 1;
            }
        }
    }

    for (i, e) in endpoints.iter().enumerate() {
        if touched[i] {
            continue;
        }
        let shares_claimed = claimed
            .iter()
            .any(|&k| (crossings[k] - e.year).abs() < tol.epsilon);
        if !shares_claimed {
            continue;
        }
        if let Some((k, dist)) = nearest_unused(e.year, &crossings, &claimed) {
            if dist <= tol.fallback {
                claimed.insert(k);
                touched[i] = true;
                let p = &mut runs[e.run].points[e.point];
                p.year = crossings[k];
                p.age = age_min;
                stats.reclaimed += 1;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DomainPoint;

    // Row 0 crosses 50 twice: between 2000/2001 and between 2003/2004.
    fn field() -> GridField {
        GridField::new(
            vec![
                40.0, 60.0, 70.0, 60.0, 40.0, //
                20.0, 30.0, 35.0, 30.0, 20.0,
            ],
            vec![2000.0, 2001.0, 2002.0, 2003.0, 2004.0],
            vec![0.0, 1.0],
        )
        .unwrap()
    }

    const TOL: ReassignTolerances = ReassignTolerances {
        primary: 0.5,
        fallback: 1.0,
        epsilon: 1e-6,
    };

    fn p(year: f64, age: f64) -> DomainPoint {
        DomainPoint::new(year, age)
    }

    #[test]
    fn test_nearest_first_assignment() {
        let mut runs = vec![Run::open(vec![
            p(2000.6, 0.0),
            p(2002.0, 0.8),
            p(2003.3, 0.0),
        ])];
        let stats = reassign_age_zero(&mut runs, 50.0, &field(), TOL);
        assert_eq!(stats.assigned, 2);
        assert_eq!(runs[0].points[0].year, 2000.5);
        assert_eq!(runs[0].points[2].year, 2003.5);
    }

    #[test]
    fn test_shared_crossing_is_reclaimed() {
        // Both runs snapped onto 2000.5. The free crossing is 3 years away,
        // so only a wide fallback tolerance moves the second run there.
        let mut runs = vec![
            Run::open(vec![p(2000.5, 0.0), p(2001.0, 0.9)]),
            Run::open(vec![p(2000.5, 0.0), p(2001.5, 0.9)]),
        ];
        let stats = reassign_age_zero(&mut runs, 50.0, &field(), TOL);
        assert_eq!(stats.assigned, 1);
        assert_eq!(stats.reclaimed, 0);

        let wide = ReassignTolerances {
            fallback: 5.0,
            ..TOL
        };
        let mut runs = vec![
            Run::open(vec![p(2000.5, 0.0), p(2001.0, 0.9)]),
            Run::open(vec![p(2000.5, 0.0), p(2001.5, 0.9)]),
        ];
        let stats = reassign_age_zero(&mut runs, 50.0, &field(), wide);
        assert_eq!(stats.assigned, 1);
        assert_eq!(stats.reclaimed, 1);
        assert_eq!(runs[0].points[0].year, 2000.5);
        assert_eq!(runs[1].points[0].year, 2003.5);
    }

    #[test]
    fn test_far_endpoints_keep_position() {
        let mut runs = vec![Run::open(vec![p(2002.0, 0.0), p(2002.0, 1.0)])];
        let stats = reassign_age_zero(&mut runs, 50.0, &field(), TOL);
        assert_eq!(stats, ReassignStats::default());
        assert_eq!(runs[0].points[0].year, 2002.0);
    }
}
