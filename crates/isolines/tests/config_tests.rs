//! Tests for loading configuration from files and the environment.

use isolines::{IsolineConfig, IsolineError};
use test_utils::json_tempfile;

#[test]
fn test_config_from_file() {
    let file = json_tempfile(r#"{ "level_step": 2500.0, "min_points": 6 }"#);
    let config = IsolineConfig::from_file(file.path()).unwrap();
    assert_eq!(config.level_step, 2500.0);
    assert_eq!(config.min_points, 6);
    assert_eq!(config.tangent_cos_min, 0.85);
}

#[test]
fn test_invalid_config_file() {
    let file = json_tempfile(r#"{ "boundary_tightening": 0.0 }"#);
    assert!(matches!(
        IsolineConfig::from_file(file.path()),
        Err(IsolineError::InvalidConfig(_))
    ));

    let file = json_tempfile("not json");
    assert!(matches!(
        IsolineConfig::from_file(file.path()),
        Err(IsolineError::Json(_))
    ));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = IsolineConfig::from_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(IsolineError::Io(_))));
}

#[test]
fn test_env_overrides() {
    // The only test in this binary that touches the environment.
    std::env::set_var("ISOLINE_LEVEL_STEP", "5000");
    std::env::set_var("ISOLINE_MIN_POINTS", "not-a-number");
    std::env::set_var("ISOLINE_PARALLEL", "true");

    let config = IsolineConfig::from_env();
    assert_eq!(config.level_step, 5000.0);
    assert_eq!(config.min_points, 4);
    assert!(config.parallel);

    std::env::remove_var("ISOLINE_LEVEL_STEP");
    std::env::remove_var("ISOLINE_MIN_POINTS");
    std::env::remove_var("ISOLINE_PARALLEL");
}
