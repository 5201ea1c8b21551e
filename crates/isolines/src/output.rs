//! Output entries handed to the serializer.

use crate::error::{IsolineError, Result};
use crate::grid::DomainPoint;
use crate::run::Run;
use serde::{Deserialize, Serialize};

/// One surviving run, tagged with its level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourEntry {
    pub level: f64,
    pub points: Vec<DomainPoint>,
}

/// Flatten per-level runs into entries, grouped by ascending level.
///
/// Runs with fewer than two points never become entries.
pub fn flatten_levels(levels: Vec<(f64, Vec<Run>)>) -> Vec<ContourEntry> {
    let mut levels = levels;
    levels.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut entries = Vec::new();
    for (level, runs) in levels {
        for run in runs {
            if run.points.len() < 2 {
                tracing::debug!(level, points = run.points.len(), "dropping degenerate run");
                continue;
            }
            entries.push(ContourEntry {
                level,
                points: run.points,
            });
        }
    }
    entries
}

/// Check that every coordinate is finite.
///
/// A violation is fatal: downstream renderers cannot detect it.
pub fn validate_entries(entries: &[ContourEntry]) -> Result<()> {
    for (run, entry) in entries.iter().enumerate() {
        if let Some((index, p)) = entry
            .points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite())
        {
            return Err(IsolineError::NonFiniteCoordinate {
                level: entry.level,
                run,
                index,
                year: p.year,
                age: p.age,
            });
        }
        if !entry.level.is_finite() {
            return Err(IsolineError::NonFiniteCoordinate {
                level: entry.level,
                run,
                index: 0,
                year: f64::NAN,
                age: f64::NAN,
            });
        }
    }
    Ok(())
}

/// Serialize entries as pretty JSON after validating them.
pub fn to_json(entries: &[ContourEntry]) -> Result<String> {
    validate_entries(entries)?;
    Ok(serde_json::to_string_pretty(entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(year: f64, age: f64) -> DomainPoint {
        DomainPoint::new(year, age)
    }

    #[test]
    fn test_flatten_orders_levels_and_drops_short() {
        let entries = flatten_levels(vec![
            (20.0, vec![Run::open(vec![p(0.0, 0.0), p(1.0, 1.0)])]),
            (
                10.0,
                vec![
                    Run::open(vec![p(0.0, 0.0)]),
                    Run::open(vec![p(2.0, 0.0), p(3.0, 1.0)]),
                ],
            ),
        ]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, 10.0);
        assert_eq!(entries[1].level, 20.0);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let entries = vec![ContourEntry {
            level: 10.0,
            points: vec![p(0.0, 0.0), p(f64::NAN, 1.0)],
        }];
        let err = validate_entries(&entries).unwrap_err();
        assert!(matches!(
            err,
            IsolineError::NonFiniteCoordinate { run: 0, index: 1, .. }
        ));
    }

    #[test]
    fn test_json_shape() {
        let entries = vec![ContourEntry {
            level: 10.0,
            points: vec![p(2000.0, 0.0), p(2001.0, 5.0)],
        }];
        let json = to_json(&entries).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["level"], 10.0);
        assert_eq!(value[0]["points"][1]["age"], 5.0);
    }
}
