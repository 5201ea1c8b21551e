//! Configuration for the isoline pipeline.

use crate::error::{IsolineError, Result};
use serde::{Deserialize, Serialize};

/// Tuning knobs for every pipeline stage.
///
/// Tolerances expressed as fractions are relative to one grid step of the
/// relevant axis, so the same configuration works for single-year and
/// abridged life tables alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsolineConfig {
    /// Step between traced threshold levels.
    pub level_step: f64,

    /// Coarse step; levels that are exact multiples of it are "heavy".
    pub heavy_step: f64,

    /// Point equality tolerance in domain units (years, ages).
    pub epsilon: f64,

    /// Boundary tolerance in fractional grid units.
    pub grid_epsilon: f64,

    /// Decimal places kept when building run signatures.
    pub signature_decimals: usize,

    /// Jump threshold as a multiple of the year step.
    pub jump_year_factor: f64,

    /// Jump threshold as a multiple of the age step.
    pub jump_age_factor: f64,

    /// Endpoint join tolerance as a fraction of one grid cell per axis.
    pub stitch_tolerance: f64,

    /// Divisor applied to the join tolerance when an endpoint is on the boundary.
    pub boundary_tightening: f64,

    /// Minimum dot product of unit tangents for two runs to be joined.
    pub tangent_cos_min: f64,

    /// Age-zero re-assignment tolerance as a fraction of one year step.
    pub reassign_tolerance: f64,

    /// Tolerance for the second re-assignment pass, fraction of one year step.
    pub reassign_fallback_tolerance: f64,

    /// Minimum point count for runs of non-heavy levels.
    pub min_points: usize,

    /// Minimum bounding-box area for runs of non-heavy levels, as a fraction
    /// of one grid cell's area.
    pub min_area_fraction: f64,

    /// Process levels on the rayon thread pool.
    pub parallel: bool,
}

impl Default for IsolineConfig {
    fn default() -> Self {
        Self {
            level_step: 10_000.0,
            heavy_step: 50_000.0,
            epsilon: 1e-6,
            grid_epsilon: 1e-9,
            signature_decimals: 4,
            jump_year_factor: 1.1,
            jump_age_factor: 1.8,
            stitch_tolerance: 0.05,
            boundary_tightening: 4.0,
            tangent_cos_min: 0.85,
            reassign_tolerance: 0.5,
            reassign_fallback_tolerance: 1.0,
            min_points: 4,
            min_area_fraction: 0.25,
            parallel: false,
        }
    }
}

impl IsolineConfig {
    /// Load configuration from environment variables on top of the defaults.
    ///
    /// Unparsable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        env_override("ISOLINE_LEVEL_STEP", &mut config.level_step);
        env_override("ISOLINE_HEAVY_STEP", &mut config.heavy_step);
        env_override("ISOLINE_EPSILON", &mut config.epsilon);
        env_override("ISOLINE_GRID_EPSILON", &mut config.grid_epsilon);
        env_override("ISOLINE_SIGNATURE_DECIMALS", &mut config.signature_decimals);
        env_override("ISOLINE_JUMP_YEAR_FACTOR", &mut config.jump_year_factor);
        env_override("ISOLINE_JUMP_AGE_FACTOR", &mut config.jump_age_factor);
        env_override("ISOLINE_STITCH_TOLERANCE", &mut config.stitch_tolerance);
        env_override("ISOLINE_BOUNDARY_TIGHTENING", &mut config.boundary_tightening);
        env_override("ISOLINE_TANGENT_COS_MIN", &mut config.tangent_cos_min);
        env_override("ISOLINE_REASSIGN_TOLERANCE", &mut config.reassign_tolerance);
        env_override(
            "ISOLINE_REASSIGN_FALLBACK_TOLERANCE",
            &mut config.reassign_fallback_tolerance,
        );
        env_override("ISOLINE_MIN_POINTS", &mut config.min_points);
        env_override("ISOLINE_MIN_AREA_FRACTION", &mut config.min_area_fraction);

        if let Ok(val) = std::env::var("ISOLINE_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("level_step", self.level_step),
            ("heavy_step", self.heavy_step),
            ("epsilon", self.epsilon),
            ("grid_epsilon", self.grid_epsilon),
            ("jump_year_factor", self.jump_year_factor),
            ("jump_age_factor", self.jump_age_factor),
            ("stitch_tolerance", self.stitch_tolerance),
            ("boundary_tightening", self.boundary_tightening),
            ("reassign_tolerance", self.reassign_tolerance),
            ("reassign_fallback_tolerance", self.reassign_fallback_tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(IsolineError::invalid_config(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }

        if !(self.min_area_fraction.is_finite() && self.min_area_fraction >= 0.0) {
            return Err(IsolineError::invalid_config(
                "min_area_fraction must be >= 0",
            ));
        }

        if !(-1.0..=1.0).contains(&self.tangent_cos_min) {
            return Err(IsolineError::invalid_config(
                "tangent_cos_min must be within [-1, 1]",
            ));
        }

        if self.min_points < 2 {
            return Err(IsolineError::invalid_config("min_points must be >= 2"));
        }

        Ok(())
    }
}

fn env_override<T: std::str::FromStr>(key: &str, target: &mut T) {
    if let Ok(val) = std::env::var(key) {
        if let Ok(parsed) = val.parse() {
            *target = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(IsolineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = IsolineConfig::from_json(r#"{"level_step": 5000.0, "parallel": true}"#)
            .unwrap();
        assert_eq!(config.level_step, 5000.0);
        assert!(config.parallel);
        assert_eq!(config.heavy_step, 50_000.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = IsolineConfig::default();
        config.level_step = 0.0;
        assert!(config.validate().is_err());

        let mut config = IsolineConfig::default();
        config.tangent_cos_min = 1.5;
        assert!(config.validate().is_err());

        let mut config = IsolineConfig::default();
        config.min_points = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let result = IsolineConfig::from_json(r#"{"stitch_tolerance": -1.0}"#);
        assert!(matches!(result, Err(IsolineError::InvalidConfig(_))));
    }
}
