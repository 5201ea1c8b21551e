//! Snapping open-run endpoints onto the analytic boundary crossing.

use crate::grid::{DomainPoint, GridField};
use crate::run::Run;

/// A side of the field's outer rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Youngest age row (the age-zero edge for life tables).
    AgeMin,
    /// Oldest age row.
    AgeMax,
    /// First year column.
    YearMin,
    /// Last year column.
    YearMax,
}

/// Sides within one grid step of `p`, nearest first (in step units).
pub fn candidate_sides(p: DomainPoint, field: &GridField) -> Vec<Side> {
    let year_step = field.year_step();
    let age_step = field.age_step();
    let mut sides: Vec<(Side, f64)> = [
        (Side::AgeMin, (p.age - field.age_min()).abs() / age_step),
        (Side::AgeMax, (p.age - field.age_max()).abs() / age_step),
        (Side::YearMin, (p.year - field.year_min()).abs() / year_step),
        (Side::YearMax, (p.year - field.year_max()).abs() / year_step),
    ]
    .into_iter()
    .filter(|(_, dist)| *dist < 1.0)
    .collect();
    sides.sort_by(|a, b| a.1.total_cmp(&b.1));
    sides.into_iter().map(|(side, _)| side).collect()
}

/// The analytic crossing of `level` on `side` nearest to `p`.
pub fn crossing_on_side(
    p: DomainPoint,
    side: Side,
    level: f64,
    field: &GridField,
) -> Option<DomainPoint> {
    match side {
        Side::AgeMin | Side::AgeMax => {
            let (row, age) = if side == Side::AgeMin {
                (0, field.age_min())
            } else {
                (field.rows() - 1, field.age_max())
            };
            field
                .row_crossings(row, level)
                .into_iter()
                .min_by(|a, b| (a - p.year).abs().total_cmp(&(b - p.year).abs()))
                .map(|year| DomainPoint::new(year, age))
        }
        Side::YearMin | Side::YearMax => {
            let (col, year) = if side == Side::YearMin {
                (0, field.year_min())
            } else {
                (field.cols() - 1, field.year_max())
            };
            field
                .column_crossing(col, level, p.age)
                .map(|age| DomainPoint::new(year, age))
        }
    }
}

/// Snap one endpoint. Returns `None` when no nearby side carries a crossing.
///
/// Sides are tried nearest first; the first side with a crossing wins.
pub fn snap_point(p: DomainPoint, level: f64, field: &GridField) -> Option<DomainPoint> {
    candidate_sides(p, field)
        .into_iter()
        .find_map(|side| crossing_on_side(p, side, level, field))
}

/// Replace the first and last point of every open run with its snapped
/// position. Interior points are untouched. Returns the number of endpoints
/// that moved.
pub fn snap_runs(runs: &mut [Run], level: f64, field: &GridField, epsilon: f64) -> usize {
    let mut moved = 0;
    for run in runs.iter_mut().filter(|r| r.is_open() && r.len() >= 2) {
        let last = run.points.len() - 1;
        for idx in [0, last] {
            let p = run.points[idx];
            if let Some(snapped) = snap_point(p, level, field) {
                if !snapped.approx_eq(&p, epsilon) {
                    moved += 1;
                }
                run.points[idx] = snapped;
            }
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;

    // Survivors fall with age and rise with year.
    //            2000   2001   2002
    // age 0       90    100    110
    // age 10      60     70     80
    // age 20      30     40     50
    fn field() -> GridField {
        GridField::new(
            vec![90.0, 100.0, 110.0, 60.0, 70.0, 80.0, 30.0, 40.0, 50.0],
            vec![2000.0, 2001.0, 2002.0],
            vec![0.0, 10.0, 20.0],
        )
        .unwrap()
    }

    #[test]
    fn test_candidate_sides_nearest_first() {
        let sides = candidate_sides(DomainPoint::new(2000.2, 0.5), &field());
        assert_eq!(sides, vec![Side::AgeMin, Side::YearMin]);
        assert!(candidate_sides(DomainPoint::new(2001.0, 10.0), &field()).is_empty());
    }

    #[test]
    fn test_snap_to_age_edge() {
        let snapped = snap_point(DomainPoint::new(2001.4, 0.3), 105.0, &field()).unwrap();
        assert_eq!(snapped.age, 0.0);
        assert!((snapped.year - 2001.5).abs() < 1e-12);
    }

    #[test]
    fn test_snap_to_year_edge() {
        let snapped = snap_point(DomainPoint::new(2000.0, 3.0), 75.0, &field()).unwrap();
        assert_eq!(snapped.year, 2000.0);
        assert!((snapped.age - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_falls_back_to_next_side() {
        // Nearest side is the first-year column, which never reaches 105.
        let snapped = snap_point(DomainPoint::new(2000.05, 0.9), 105.0, &field()).unwrap();
        assert_eq!(snapped.age, 0.0);
        assert!((snapped.year - 2001.5).abs() < 1e-12);

        assert!(snap_point(DomainPoint::new(2000.0, 0.1), 200.0, &field()).is_none());
    }

    #[test]
    fn test_distant_wall_crossing_leaves_point() {
        // Flat age-zero row; the year columns only reach 55 near age 45.
        let values: Vec<f64> = (0..6).flat_map(|r| [100.0 - 10.0 * r as f64; 2]).collect();
        let ages: Vec<f64> = (0..6).map(|r| 10.0 * r as f64).collect();
        let field = GridField::new(values, vec![2000.0, 2001.0], ages).unwrap();

        let p = DomainPoint::new(2000.0, 5.0);
        assert_eq!(snap_point(p, 55.0, &field), None);

        let mut runs = vec![Run::open(vec![p, DomainPoint::new(2000.5, 8.0)])];
        assert_eq!(snap_runs(&mut runs, 55.0, &field, 1e-6), 0);
        assert_eq!(runs[0].points[0], p);
    }

    #[test]
    fn test_interior_points_untouched() {
        let mut runs = vec![Run::open(vec![
            DomainPoint::new(2000.45, 0.2),
            DomainPoint::new(2001.0, 1.667),
            DomainPoint::new(2001.95, 5.1),
        ])];
        let moved = snap_runs(&mut runs, 95.0, &field(), 1e-6);
        assert_eq!(moved, 2);
        let pts = &runs[0].points;
        assert_eq!(pts[1], DomainPoint::new(2001.0, 1.667));
        assert!(pts[0].approx_eq(&DomainPoint::new(2000.5, 0.0), 1e-9));
        assert!(pts[2].approx_eq(&DomainPoint::new(2002.0, 5.0), 1e-9));
    }
}
