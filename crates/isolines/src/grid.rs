//! Regular year × age scalar field.

use crate::error::{IsolineError, Result};
use serde::{Deserialize, Serialize};

/// A point in domain coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainPoint {
    pub year: f64,
    pub age: f64,
}

impl DomainPoint {
    pub fn new(year: f64, age: f64) -> Self {
        Self { year, age }
    }

    /// Tolerance-based equality; both axes must agree within `epsilon`.
    pub fn approx_eq(&self, other: &DomainPoint, epsilon: f64) -> bool {
        (self.year - other.year).abs() < epsilon && (self.age - other.age).abs() < epsilon
    }

    pub fn is_finite(&self) -> bool {
        self.year.is_finite() && self.age.is_finite()
    }
}

/// The field's outer rectangle in domain coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub year_min: f64,
    pub year_max: f64,
    pub age_min: f64,
    pub age_max: f64,
}

impl Bounds {
    /// Whether `p` lies on any side of the rectangle within `epsilon`.
    pub fn on_boundary(&self, p: &DomainPoint, epsilon: f64) -> bool {
        self.on_age_edge(p, epsilon) || self.on_year_edge(p, epsilon)
    }

    /// Whether `p` lies on the youngest- or oldest-age edge.
    pub fn on_age_edge(&self, p: &DomainPoint, epsilon: f64) -> bool {
        (p.age - self.age_min).abs() < epsilon || (p.age - self.age_max).abs() < epsilon
    }

    /// Whether `p` lies on the first- or last-year edge.
    pub fn on_year_edge(&self, p: &DomainPoint, epsilon: f64) -> bool {
        (p.year - self.year_min).abs() < epsilon || (p.year - self.year_max).abs() < epsilon
    }

    pub fn contains(&self, p: &DomainPoint, epsilon: f64) -> bool {
        p.year >= self.year_min - epsilon
            && p.year <= self.year_max + epsilon
            && p.age >= self.age_min - epsilon
            && p.age <= self.age_max + epsilon
    }
}

/// A regularly sampled scalar field indexed by age (rows) and year (columns).
///
/// Values are row-major: `values[row * cols + col]` is the sample at
/// `(years[col], ages[row])`. Missing samples are stored as NaN. The field is
/// immutable once built.
#[derive(Debug, Clone)]
pub struct GridField {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
    years: Vec<f64>,
    ages: Vec<f64>,
}

impl GridField {
    /// Build a field, checking the shape invariants.
    ///
    /// Non-finite values are normalized to NaN (the missing sentinel).
    pub fn new(values: Vec<f64>, years: Vec<f64>, ages: Vec<f64>) -> Result<Self> {
        if years.is_empty() || ages.is_empty() {
            return Err(IsolineError::invalid_grid("axes must not be empty"));
        }
        check_axis("years", &years)?;
        check_axis("ages", &ages)?;

        let rows = ages.len();
        let cols = years.len();
        if values.len() != rows * cols {
            return Err(IsolineError::invalid_grid(format!(
                "expected {} values for {rows} ages x {cols} years, got {}",
                rows * cols,
                values.len()
            )));
        }

        let values = values
            .into_iter()
            .map(|v| if v.is_finite() { v } else { f64::NAN })
            .collect();

        Ok(Self {
            rows,
            cols,
            values,
            years,
            ages,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major samples, NaN where missing.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn years(&self) -> &[f64] {
        &self.years
    }

    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    /// Bounds-checked lookup. Returns `None` outside the grid or for a
    /// missing sample.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let v = self.values[row * self.cols + col];
        v.is_finite().then_some(v)
    }

    /// Largest finite sample, if any.
    pub fn max_finite(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    pub fn year_min(&self) -> f64 {
        self.years[0]
    }

    pub fn year_max(&self) -> f64 {
        self.years[self.cols - 1]
    }

    pub fn age_min(&self) -> f64 {
        self.ages[0]
    }

    pub fn age_max(&self) -> f64 {
        self.ages[self.rows - 1]
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            year_min: self.year_min(),
            year_max: self.year_max(),
            age_min: self.age_min(),
            age_max: self.age_max(),
        }
    }

    /// Mean spacing of the year axis (1.0 for a single column).
    pub fn year_step(&self) -> f64 {
        mean_step(&self.years)
    }

    /// Mean spacing of the age axis (1.0 for a single row).
    pub fn age_step(&self) -> f64 {
        mean_step(&self.ages)
    }

    /// Largest spacing between adjacent years.
    pub fn max_year_gap(&self) -> f64 {
        max_gap(&self.years)
    }

    /// Largest spacing between adjacent ages.
    pub fn max_age_gap(&self) -> f64 {
        max_gap(&self.ages)
    }

    /// Area of one mean grid cell in year × age units.
    pub fn cell_area(&self) -> f64 {
        self.year_step() * self.age_step()
    }

    /// Year at a fractional column index, clamped to the axis.
    pub fn year_at(&self, col: f64) -> f64 {
        interpolate_axis(&self.years, col)
    }

    /// Age at a fractional row index, clamped to the axis.
    pub fn age_at(&self, row: f64) -> f64 {
        interpolate_axis(&self.ages, row)
    }

    /// Years at which the field, linearly interpolated along `row`, crosses
    /// `level`. One crossing per bracketing column pair, ascending.
    pub fn row_crossings(&self, row: usize, level: f64) -> Vec<f64> {
        if row >= self.rows {
            return vec![];
        }
        axis_crossings(&self.years, |col| self.value(row, col), level)
            .into_iter()
            .map(|(_, year)| year)
            .collect()
    }

    /// Age at which the field, linearly interpolated along `col`, crosses
    /// `level`.
    ///
    /// The row interval containing `near_age` is used when it brackets the
    /// level; otherwise the nearest crossing in an adjacent interval. A
    /// crossing further along the column is never used.
    pub fn column_crossing(&self, col: usize, level: f64, near_age: f64) -> Option<f64> {
        if col >= self.cols || self.rows < 2 {
            return None;
        }
        let crossings = axis_crossings(&self.ages, |row| self.value(row, col), level);

        let containing = crossings.iter().find(|(interval, _)| {
            let lo = self.ages[*interval];
            let hi = self.ages[*interval + 1];
            near_age >= lo && near_age <= hi
        });
        if let Some(&(_, age)) = containing {
            return Some(age);
        }

        let home = self
            .ages
            .windows(2)
            .position(|w| near_age <= w[1])
            .unwrap_or(self.rows - 2);
        crossings
            .into_iter()
            .filter(|(interval, _)| interval.abs_diff(home) <= 1)
            .map(|(_, age)| age)
            .min_by(|a, b| (a - near_age).abs().total_cmp(&(b - near_age).abs()))
    }
}

fn check_axis(name: &str, axis: &[f64]) -> Result<()> {
    if axis.iter().any(|v| !v.is_finite()) {
        return Err(IsolineError::invalid_grid(format!(
            "{name} axis contains non-finite values"
        )));
    }
    if axis.windows(2).any(|w| w[1] <= w[0]) {
        return Err(IsolineError::invalid_grid(format!(
            "{name} axis must be strictly increasing"
        )));
    }
    Ok(())
}

fn mean_step(axis: &[f64]) -> f64 {
    if axis.len() < 2 {
        return 1.0;
    }
    (axis[axis.len() - 1] - axis[0]) / (axis.len() - 1) as f64
}

fn max_gap(axis: &[f64]) -> f64 {
    axis.windows(2)
        .map(|w| w[1] - w[0])
        .fold(None, |acc: Option<f64>, gap| Some(acc.map_or(gap, |m| m.max(gap))))
        .unwrap_or(1.0)
}

fn interpolate_axis(axis: &[f64], index: f64) -> f64 {
    if axis.len() < 2 {
        return axis[0];
    }
    let last = (axis.len() - 1) as f64;
    let index = index.clamp(0.0, last);
    let i = (index.floor() as usize).min(axis.len() - 2);
    let t = index - i as f64;
    axis[i] + t * (axis[i + 1] - axis[i])
}

/// Crossings of `level` along one axis, as `(interval index, coordinate)`.
///
/// Uses the same "at or above" classification as the marching-squares
/// tracer so that analytic crossings agree with traced segment ends.
fn axis_crossings(
    axis: &[f64],
    value_at: impl Fn(usize) -> Option<f64>,
    level: f64,
) -> Vec<(usize, f64)> {
    let mut out = Vec::new();
    for i in 0..axis.len().saturating_sub(1) {
        let (Some(v0), Some(v1)) = (value_at(i), value_at(i + 1)) else {
            continue;
        };
        if (v0 >= level) == (v1 >= level) {
            continue;
        }
        let t = ((level - v0) / (v1 - v0)).clamp(0.0, 1.0);
        out.push((i, axis[i] + t * (axis[i + 1] - axis[i])));
    }
    out
}
