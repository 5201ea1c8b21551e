//! Threshold level selection.

/// Levels to trace for a field whose largest finite value is `max_value`.
///
/// Returns the positive multiples of `step` up to and including `max_value`,
/// ascending. Each level is computed as `k * step` rather than accumulated,
/// so levels stay exact multiples of the step.
pub fn select_levels(max_value: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !step.is_finite() || !max_value.is_finite() || max_value < step {
        return vec![];
    }

    let count = (max_value / step).floor() as usize;
    let mut levels = Vec::with_capacity(count);
    for k in 1..=count {
        let level = k as f64 * step;
        if level <= max_value {
            levels.push(level);
        }
    }
    levels
}

/// Whether `level` is an exact multiple of the coarse `heavy_step`.
pub fn is_heavy(level: f64, heavy_step: f64) -> bool {
    if !(heavy_step > 0.0) || !level.is_finite() {
        return false;
    }
    let k = (level / heavy_step).round();
    k >= 1.0 && (k * heavy_step - level).abs() <= 1e-9 * level.abs().max(1.0)
}
