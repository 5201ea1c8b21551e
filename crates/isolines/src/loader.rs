//! Building a [`GridField`] from tabular survivor rows.

use crate::error::{IsolineError, Result};
use crate::grid::GridField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One `(year, age, survivors)` sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurvivorRow {
    pub year: f64,
    pub age: f64,
    pub survivors: f64,
}

impl SurvivorRow {
    pub fn new(year: f64, age: f64, survivors: f64) -> Self {
        Self {
            year,
            age,
            survivors,
        }
    }
}

fn unique_axis(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut axis: Vec<f64> = values.collect();
    axis.sort_by(|a, b| a.total_cmp(b));
    axis.dedup();
    axis
}

/// Axis position keyed by bit pattern, for exact matching.
fn axis_index(axis: &[f64]) -> BTreeMap<u64, usize> {
    axis.iter()
        .enumerate()
        .map(|(i, v)| (v.to_bits(), i))
        .collect()
}

impl GridField {
    /// Build a field from loose rows.
    ///
    /// Axes are the sorted unique years and ages; cells without a sample
    /// become missing (NaN).
    pub fn from_rows(rows: &[SurvivorRow]) -> Result<Self> {
        if rows.is_empty() {
            return Err(IsolineError::invalid_input("no survivor rows"));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| {
            !(r.year.is_finite() && r.age.is_finite() && r.survivors.is_finite())
        }) {
            return Err(IsolineError::invalid_input(format!(
                "row {i} is not finite: year={}, age={}, survivors={}",
                row.year, row.age, row.survivors
            )));
        }

        // -0.0 and 0.0 must land on the same axis slot.
        let norm = |v: f64| if v == 0.0 { 0.0 } else { v };

        let years = unique_axis(rows.iter().map(|r| norm(r.year)));
        let ages = unique_axis(rows.iter().map(|r| norm(r.age)));
        let year_index = axis_index(&years);
        let age_index = axis_index(&ages);

        let cols = years.len();
        let mut values = vec![f64::NAN; ages.len() * cols];
        for row in rows {
            let col = year_index[&norm(row.year).to_bits()];
            let r = age_index[&norm(row.age).to_bits()];
            let cell = &mut values[r * cols + col];
            if !cell.is_nan() {
                return Err(IsolineError::invalid_input(format!(
                    "duplicate sample for year {} age {}",
                    row.year, row.age
                )));
            }
            *cell = row.survivors;
        }

        let missing = values.iter().filter(|v| v.is_nan()).count();
        debug!(
            rows = rows.len(),
            years = years.len(),
            ages = ages.len(),
            missing,
            "built grid from rows"
        );

        GridField::new(values, years, ages)
    }
}

/// Parse a JSON array of rows.
pub fn rows_from_json(json: &str) -> Result<Vec<SurvivorRow>> {
    Ok(serde_json::from_str(json)?)
}

/// Read a JSON array of rows from disk.
pub fn rows_from_file(path: impl AsRef<std::path::Path>) -> Result<Vec<SurvivorRow>> {
    let text = std::fs::read_to_string(path)?;
    rows_from_json(&text)
}
