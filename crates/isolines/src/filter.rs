//! Dropping visually insignificant runs.

use crate::levels::is_heavy;
use crate::run::Run;

/// Thresholds applied to runs of non-heavy levels.
#[derive(Debug, Clone, Copy)]
pub struct FilterParams {
    pub heavy_step: f64,
    pub min_points: usize,
    /// Minimum bounding-box area in year × age units.
    pub min_area: f64,
}

/// Whether a run survives the filter at `level`.
///
/// Heavy levels keep every run; other levels need enough points and a
/// bounding box of at least `min_area`.
pub fn keep_run(run: &Run, level: f64, params: &FilterParams) -> bool {
    if is_heavy(level, params.heavy_step) {
        return true;
    }
    run.len() >= params.min_points && run.bbox_area() >= params.min_area
}

/// Filter one level's runs. Returns the survivors and the number dropped.
pub fn filter_runs(runs: Vec<Run>, level: f64, params: &FilterParams) -> (Vec<Run>, usize) {
    let before = runs.len();
    let kept: Vec<Run> = runs
        .into_iter()
        .filter(|run| keep_run(run, level, params))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
