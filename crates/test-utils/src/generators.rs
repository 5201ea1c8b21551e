//! Synthetic grid generators.
//!
//! These generators create predictable, verifiable survivor-like fields
//! that can be used across the test suite. All values are row-major with
//! one row per age and one column per year.

/// A generated grid in loose parts.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticGrid {
    pub values: Vec<f64>,
    pub years: Vec<f64>,
    pub ages: Vec<f64>,
}

impl SyntheticGrid {
    pub fn cols(&self) -> usize {
        self.years.len()
    }

    pub fn rows(&self) -> usize {
        self.ages.len()
    }

    /// Row-major value at `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols() + col]
    }

    /// `(year, age, survivors)` triples, skipping missing cells.
    pub fn triples(&self) -> Vec<(f64, f64, f64)> {
        let mut out = Vec::with_capacity(self.values.len());
        for (row, &age) in self.ages.iter().enumerate() {
            for (col, &year) in self.years.iter().enumerate() {
                let v = self.at(row, col);
                if v.is_finite() {
                    out.push((year, age, v));
                }
            }
        }
        out
    }
}

/// Evenly spaced axis values.
pub fn axis(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

/// Survivor counts shaped like a period life table.
///
/// Survivors start at `radix` at age 0 and fall with age following
/// `radix * exp(-(age / m)^6)`, where the modal age `m` grows by a third
/// of a year per calendar year. Values never increase with age.
///
/// # Example
///
/// ```
/// use test_utils::survivor_grid;
///
/// let grid = survivor_grid(1950.0, 10, 5.0, 21, 100_000.0);
/// assert_eq!(grid.values.len(), 10 * 21);
/// assert_eq!(grid.at(0, 0), 100_000.0);
/// assert!(grid.at(20, 0) < grid.at(10, 0));
/// ```
pub fn survivor_grid(
    first_year: f64,
    n_years: usize,
    age_step: f64,
    n_ages: usize,
    radix: f64,
) -> SyntheticGrid {
    let years = axis(first_year, 1.0, n_years);
    let ages = axis(0.0, age_step, n_ages);
    let mut values = Vec::with_capacity(n_years * n_ages);
    for &age in &ages {
        for col in 0..n_years {
            let modal = 72.0 + col as f64 / 3.0;
            values.push(radix * (-(age / modal).powi(6)).exp());
        }
    }
    SyntheticGrid {
        values,
        years,
        ages,
    }
}

/// A single peak of height `height` in the middle of a `size × size` grid,
/// falling linearly to zero at the edge midpoints.
///
/// Axes are unit-spaced starting at year 2000 and age 0.
pub fn peak_grid(size: usize, height: f64) -> SyntheticGrid {
    let centre = (size as f64 - 1.0) / 2.0;
    let radius = centre.max(1.0);
    let mut values = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let dx = col as f64 - centre;
            let dy = row as f64 - centre;
            let r = (dx * dx + dy * dy).sqrt();
            values.push((height * (1.0 - r / radius)).max(0.0));
        }
    }
    SyntheticGrid {
        values,
        years: axis(2000.0, 1.0, size),
        ages: axis(0.0, 1.0, size),
    }
}

/// The smallest saddle: high on one diagonal, low on the other.
///
/// ```text
///  high  low
///  low   high
/// ```
pub fn saddle_grid(high: f64, low: f64) -> SyntheticGrid {
    SyntheticGrid {
        values: vec![high, low, low, high],
        years: vec![2000.0, 2001.0],
        ages: vec![0.0, 1.0],
    }
}

/// Replace the cells at `(row, col)` with NaN.
pub fn with_missing(mut grid: SyntheticGrid, cells: &[(usize, usize)]) -> SyntheticGrid {
    let cols = grid.cols();
    for &(row, col) in cells {
        if row < grid.rows() && col < cols {
            grid.values[row * cols + col] = f64::NAN;
        }
    }
    grid
}
