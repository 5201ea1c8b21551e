//! One batch run: rows in, isoline JSON out.

use crate::Args;
use anyhow::{Context, Result};
use isolines::{
    extract_isolines, rows_from_file, to_json, GridField, IsolineConfig, MarchingSquares,
};
use tracing::{debug, info, warn};

/// Counts reported after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub levels: usize,
    pub entries: usize,
    pub merges: usize,
    pub filtered: usize,
}

/// Configuration precedence: `--config` file, else `ISOLINE_*` environment;
/// explicit flags override either.
pub fn resolve_config(args: &Args) -> Result<IsolineConfig> {
    let mut config = match &args.config {
        Some(path) => IsolineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => IsolineConfig::from_env(),
    };

    if let Some(step) = args.level_step {
        config.level_step = step;
    }
    if let Some(step) = args.heavy_step {
        config.heavy_step = step;
    }
    if args.parallel {
        config.parallel = true;
    }

    config.validate().context("Invalid configuration")?;
    debug!(?config, "Resolved configuration");
    Ok(config)
}

/// Load, extract and write.
pub fn run(args: &Args, config: &IsolineConfig) -> Result<Summary> {
    let rows = rows_from_file(&args.input)
        .with_context(|| format!("Failed to read rows from {}", args.input))?;
    let field = GridField::from_rows(&rows).context("Failed to build grid")?;
    info!(
        rows = rows.len(),
        years = field.cols(),
        ages = field.rows(),
        "Loaded survivor grid"
    );

    let output = extract_isolines(&field, &MarchingSquares, config)?;
    if let Some(reason) = &output.diagnostics.empty_reason {
        warn!(reason = %reason, "Nothing to draw");
    }
    for level in &output.diagnostics.levels {
        debug!(
            level = level.level,
            heavy = level.heavy,
            emitted = level.runs_emitted,
            merges = level.merges,
            jump_cuts = level.jump_cuts,
            "Level summary"
        );
    }

    let json = to_json(&output.entries)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path))?
        }
        None => println!("{}", json),
    }

    let diagnostics = &output.diagnostics;
    Ok(Summary {
        levels: diagnostics.levels.len(),
        entries: output.entries.len(),
        merges: diagnostics.total_merges(),
        filtered: diagnostics.levels.iter().map(|l| l.runs_filtered).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use test_utils::{json_tempfile, rows_json, survivor_grid, SAMPLE_ROWS_JSON};

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["isoline-builder", "--input", "rows.json"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_flags_override_config_file() {
        let file = json_tempfile(r#"{ "level_step": 2000.0, "heavy_step": 8000.0 }"#);
        let path = file.path().to_string_lossy().into_owned();
        let config =
            resolve_config(&args(&["--config", &path, "--level-step", "5000", "--parallel"]))
                .unwrap();
        assert_eq!(config.level_step, 5000.0);
        assert_eq!(config.heavy_step, 8000.0);
        assert!(config.parallel);
    }

    #[test]
    fn test_invalid_flag_value_rejected() {
        let file = json_tempfile("{}");
        let path = file.path().to_string_lossy().into_owned();
        assert!(resolve_config(&args(&["--config", &path, "--heavy-step=-1"])).is_err());
    }

    #[test]
    fn test_run_writes_entries() {
        let input = json_tempfile(SAMPLE_ROWS_JSON);
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("isolines.json");

        let mut args = args(&[]);
        args.input = input.path().to_string_lossy().into_owned();
        args.output = Some(out_path.to_string_lossy().into_owned());

        let summary = run(&args, &IsolineConfig::default()).unwrap();
        assert_eq!(summary.levels, 10);

        let text = std::fs::read_to_string(&out_path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), summary.entries);
        for entry in entries {
            assert!(entry["level"].is_number());
            assert!(entry["points"].as_array().unwrap().len() >= 2);
        }
    }

    #[test]
    fn test_run_survivor_grid() {
        let grid = survivor_grid(1950.0, 10, 5.0, 23, 100_000.0);
        let input = json_tempfile(&rows_json(&grid));
        let dir = tempfile::tempdir().unwrap();

        let mut args = args(&[]);
        args.input = input.path().to_string_lossy().into_owned();
        args.output = Some(dir.path().join("out.json").to_string_lossy().into_owned());

        let summary = run(&args, &IsolineConfig::default()).unwrap();
        assert_eq!(summary.entries, 9);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let mut args = args(&[]);
        args.input = "/nonexistent/rows.json".to_string();
        assert!(run(&args, &IsolineConfig::default()).is_err());
    }
}
