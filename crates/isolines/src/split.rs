//! Ring splitting: traced rings to domain-coordinate runs.

use crate::grid::{DomainPoint, GridField};
use crate::run::Run;
use crate::tracer::{GridPoint, Ring};

/// Result of splitting one ring.
#[derive(Debug, Default)]
pub struct SplitRing {
    pub runs: Vec<Run>,
    /// Arcs dropped because they mostly run along the wall.
    pub wall_arcs: usize,
}

/// Whether a grid point lies on the grid's outer rectangle.
pub fn on_grid_boundary(p: GridPoint, cols: usize, rows: usize, grid_epsilon: f64) -> bool {
    let max_col = cols.saturating_sub(1) as f64;
    let max_row = rows.saturating_sub(1) as f64;
    p.col.abs() < grid_epsilon
        || (p.col - max_col).abs() < grid_epsilon
        || p.row.abs() < grid_epsilon
        || (p.row - max_row).abs() < grid_epsilon
}

/// Split a ring at every vertex that touches the outer rectangle.
///
/// Returns `None` for malformed rings (fewer than two points, non-finite
/// coordinates). A ring that never touches the boundary becomes a single
/// run: closed if the tracer closed it, open otherwise.
pub fn split_ring(
    ring: &Ring,
    field: &GridField,
    grid_epsilon: f64,
    epsilon: f64,
) -> Option<SplitRing> {
    if ring.points.len() < 2 || ring.points.iter().any(|p| !p.is_finite()) {
        return None;
    }

    let mut verts = ring.points.clone();
    if ring.closed && verts.len() > 2 {
        let (first, last) = (verts[0], verts[verts.len() - 1]);
        if (first.col - last.col).abs() < grid_epsilon && (first.row - last.row).abs() < grid_epsilon
        {
            verts.pop();
        }
    }
    if verts.len() < 2 {
        return None;
    }

    let to_domain = |p: &GridPoint| DomainPoint::new(field.year_at(p.col), field.age_at(p.row));
    let on_boundary: Vec<bool> = verts
        .iter()
        .map(|&p| on_grid_boundary(p, field.cols(), field.rows(), grid_epsilon))
        .collect();
    let splits: Vec<usize> = (0..verts.len()).filter(|&i| on_boundary[i]).collect();

    if splits.is_empty() {
        let mut points: Vec<DomainPoint> = verts.iter().map(to_domain).collect();
        let run = if ring.closed {
            if !points[0].approx_eq(&points[points.len() - 1], epsilon) {
                points.push(points[0]);
            }
            Run::closed(points)
        } else {
            Run::open(points)
        };
        return Some(SplitRing {
            runs: vec![run],
            wall_arcs: 0,
        });
    }

    let n = verts.len();
    let mut arcs: Vec<Vec<usize>> = Vec::new();
    if ring.closed {
        for (k, &start) in splits.iter().enumerate() {
            let end = splits.get(k + 1).copied().unwrap_or(splits[0] + n);
            arcs.push((start..=end).map(|i| i % n).collect());
        }
    } else {
        if splits[0] > 0 {
            arcs.push((0..=splits[0]).collect());
        }
        for pair in splits.windows(2) {
            arcs.push((pair[0]..=pair[1]).collect());
        }
        let last = splits[splits.len() - 1];
        if last < n - 1 {
            arcs.push((last..n).collect());
        }
    }

    let mut out = SplitRing::default();
    for arc in arcs {
        let wall_points = arc.iter().filter(|&&i| on_boundary[i]).count();
        if wall_points * 2 > arc.len() {
            out.wall_arcs += 1;
            continue;
        }

        let mut points: Vec<DomainPoint> = arc.iter().map(|&i| to_domain(&verts[i])).collect();
        if ring.closed && points.len() > 2 && points[0].approx_eq(&points[points.len() - 1], epsilon)
        {
            points.pop();
        }
        if points.len() >= 2 {
            out.runs.push(Run::open(points));
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunKind;

    fn field(cols: usize, rows: usize) -> GridField {
        GridField::new(
            vec![0.0; cols * rows],
            (0..cols).map(|c| 2000.0 + c as f64).collect(),
            (0..rows).map(|r| r as f64 * 5.0).collect(),
        )
        .unwrap()
    }

    fn gp(col: f64, row: f64) -> GridPoint {
        GridPoint::new(col, row)
    }

    #[test]
    fn test_interior_ring_becomes_closed_run() {
        let ring = Ring {
            points: vec![gp(1.0, 0.5), gp(1.5, 1.0), gp(1.0, 1.5), gp(0.5, 1.0)],
            closed: true,
        };
        let out = split_ring(&ring, &field(3, 3), 1e-9, 1e-6).unwrap();
        assert_eq!(out.runs.len(), 1);
        let run = &out.runs[0];
        assert_eq!(run.kind, RunKind::Closed);
        assert_eq!(run.len(), 5);
        assert_eq!(run.points[0], run.points[4]);
        assert_eq!(run.points[0], DomainPoint::new(2001.0, 2.5));
    }

    #[test]
    fn test_open_ring_split_at_boundary() {
        // Enters through the top wall, leaves through the bottom wall.
        let ring = Ring {
            points: vec![gp(1.0, 0.0), gp(1.2, 1.0), gp(1.4, 2.0), gp(1.5, 3.0)],
            closed: false,
        };
        let out = split_ring(&ring, &field(4, 4), 1e-9, 1e-6).unwrap();
        assert_eq!(out.runs.len(), 1);
        assert_eq!(out.runs[0].kind, RunKind::Open);
        assert_eq!(out.runs[0].len(), 4);
        assert_eq!(out.runs[0].points[3], DomainPoint::new(2001.5, 15.0));
    }

    #[test]
    fn test_wall_sliver_discarded() {
        // Closed ring hugging the left wall: the return leg runs along it.
        let ring = Ring {
            points: vec![
                gp(0.0, 0.0),
                gp(0.5, 0.5),
                gp(0.5, 1.5),
                gp(0.0, 2.0),
                gp(0.0, 1.5),
                gp(0.0, 1.0),
                gp(0.0, 0.5),
                gp(0.0, 0.0),
            ],
            closed: true,
        };
        let out = split_ring(&ring, &field(3, 3), 1e-9, 1e-6).unwrap();
        assert_eq!(out.runs.len(), 1);
        assert_eq!(out.runs[0].len(), 4);
        assert_eq!(out.runs[0].points[0], DomainPoint::new(2000.0, 0.0));
        assert_eq!(out.runs[0].points[3], DomainPoint::new(2000.0, 10.0));
        assert_eq!(out.wall_arcs, 4);
    }

    #[test]
    fn test_malformed_ring_skipped() {
        let short = Ring {
            points: vec![gp(1.0, 1.0)],
            closed: false,
        };
        assert!(split_ring(&short, &field(3, 3), 1e-9, 1e-6).is_none());

        let bad = Ring {
            points: vec![gp(1.0, 1.0), gp(f64::NAN, 1.0)],
            closed: false,
        };
        assert!(split_ring(&bad, &field(3, 3), 1e-9, 1e-6).is_none());
    }
}
