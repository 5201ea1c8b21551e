//! End-to-end isoline extraction.
//!
//! GridField → levels → raw tracer → ring splitting → normalization →
//! jump splitting → stitching → snapping → age-zero re-assignment →
//! filtering → validated entries. Levels are independent; each one is
//! processed start to finish before its runs are collected.

use crate::config::IsolineConfig;
use crate::error::Result;
use crate::filter::{filter_runs, FilterParams};
use crate::grid::GridField;
use crate::jumps::{split_jumps, JumpLimits};
use crate::levels::{is_heavy, select_levels};
use crate::normalize::normalize_runs;
use crate::output::{flatten_levels, validate_entries, ContourEntry};
use crate::reassign::{reassign_age_zero, ReassignTolerances};
use crate::run::Run;
use crate::snap::snap_runs;
use crate::split::split_ring;
use crate::stitch::{stitch_runs, StitchParams};
use crate::tracer::{RawTracer, TracedLevel};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

/// What happened to one level on its way through the pipeline.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LevelDiagnostics {
    pub level: f64,
    pub heavy: bool,
    pub rings: usize,
    pub rings_skipped: usize,
    pub wall_arcs: usize,
    pub runs_split: usize,
    pub runs_too_short: usize,
    pub duplicates: usize,
    pub jump_cuts: usize,
    pub merges: usize,
    pub rings_closed: usize,
    pub endpoints_snapped: usize,
    pub endpoints_assigned: usize,
    pub endpoints_reclaimed: usize,
    pub runs_filtered: usize,
    pub runs_emitted: usize,
}

/// Diagnostics for a whole extraction.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PipelineDiagnostics {
    pub levels: Vec<LevelDiagnostics>,
    /// Why nothing was traced, when the input had nothing to draw.
    pub empty_reason: Option<String>,
}

impl PipelineDiagnostics {
    fn empty(reason: impl Into<String>) -> Self {
        Self {
            levels: vec![],
            empty_reason: Some(reason.into()),
        }
    }

    pub fn total_runs(&self) -> usize {
        self.levels.iter().map(|l| l.runs_emitted).sum()
    }

    pub fn total_merges(&self) -> usize {
        self.levels.iter().map(|l| l.merges).sum()
    }
}

/// Validated entries plus diagnostics.
#[derive(Debug, Clone)]
pub struct IsolineOutput {
    pub entries: Vec<ContourEntry>,
    pub diagnostics: PipelineDiagnostics,
}

impl IsolineOutput {
    fn empty(reason: impl Into<String>) -> Self {
        Self {
            entries: vec![],
            diagnostics: PipelineDiagnostics::empty(reason),
        }
    }
}

/// Extract isolines from loose grid parts.
///
/// Malformed parts (value count mismatch, unsorted axes) produce an empty
/// result rather than an error: there is simply nothing to draw.
pub fn extract_from_parts<T: RawTracer + ?Sized>(
    values: Vec<f64>,
    years: Vec<f64>,
    ages: Vec<f64>,
    tracer: &T,
    config: &IsolineConfig,
) -> Result<IsolineOutput> {
    config.validate()?;
    match GridField::new(values, years, ages) {
        Ok(field) => extract_isolines(&field, tracer, config),
        Err(err) => {
            warn!(error = %err, "malformed grid, nothing to draw");
            Ok(IsolineOutput::empty(err.to_string()))
        }
    }
}

/// Extract, stitch, snap and filter the isolines of `field`.
///
/// Fails only on invalid configuration or when a non-finite coordinate
/// would reach the output.
pub fn extract_isolines<T: RawTracer + ?Sized>(
    field: &GridField,
    tracer: &T,
    config: &IsolineConfig,
) -> Result<IsolineOutput> {
    config.validate()?;

    if field.rows() < 2 || field.cols() < 2 {
        warn!(rows = field.rows(), cols = field.cols(), "grid too small to trace");
        return Ok(IsolineOutput::empty("grid needs at least 2 rows and 2 columns"));
    }

    let levels = field
        .max_finite()
        .map(|max| select_levels(max, config.level_step))
        .unwrap_or_default();
    if levels.is_empty() {
        warn!(max = ?field.max_finite(), step = config.level_step, "no levels to trace");
        return Ok(IsolineOutput::empty("no levels to trace"));
    }

    debug!(
        rows = field.rows(),
        cols = field.cols(),
        num_levels = levels.len(),
        first_level = levels[0],
        last_level = levels[levels.len() - 1],
        "tracing levels"
    );

    let traced = tracer.trace(field.values(), field.cols(), field.rows(), &levels);

    let processed: Vec<(Vec<Run>, LevelDiagnostics)> = if config.parallel {
        traced
            .par_iter()
            .map(|t| process_level(t, field, config))
            .collect()
    } else {
        traced
            .iter()
            .map(|t| process_level(t, field, config))
            .collect()
    };

    let mut per_level = Vec::with_capacity(processed.len());
    let mut diagnostics = PipelineDiagnostics::default();
    for (runs, diag) in processed {
        per_level.push((diag.level, runs));
        diagnostics.levels.push(diag);
    }
    diagnostics.levels.sort_by(|a, b| a.level.total_cmp(&b.level));

    let entries = flatten_levels(per_level);
    validate_entries(&entries)?;

    info!(
        levels = diagnostics.levels.len(),
        entries = entries.len(),
        merges = diagnostics.total_merges(),
        "isolines extracted"
    );

    Ok(IsolineOutput {
        entries,
        diagnostics,
    })
}

/// Run every per-level stage on one traced level.
pub fn process_level(
    traced: &TracedLevel,
    field: &GridField,
    config: &IsolineConfig,
) -> (Vec<Run>, LevelDiagnostics) {
    let level = traced.level;
    let mut diag = LevelDiagnostics {
        level,
        heavy: is_heavy(level, config.heavy_step),
        ..Default::default()
    };

    let mut runs = Vec::new();
    for ring in traced.polygons.iter().flatten() {
        diag.rings += 1;
        match split_ring(ring, field, config.grid_epsilon, config.epsilon) {
            Some(split) => {
                diag.wall_arcs += split.wall_arcs;
                runs.extend(split.runs);
            }
            None => diag.rings_skipped += 1,
        }
    }
    diag.runs_split = runs.len();

    let (runs, norm) = normalize_runs(runs, config.epsilon, config.signature_decimals);
    diag.runs_too_short = norm.too_short;
    diag.duplicates = norm.duplicates;

    let limits = JumpLimits {
        max_year_delta: field.max_year_gap() * config.jump_year_factor,
        max_age_delta: field.max_age_gap() * config.jump_age_factor,
    };
    let mut pieces = Vec::with_capacity(runs.len());
    for run in runs {
        let (split, cuts) = split_jumps(run, limits);
        diag.jump_cuts += cuts;
        pieces.extend(split);
    }

    let (mut runs, stitched) = stitch_runs(pieces, &StitchParams::new(field, config));
    diag.merges = stitched.merges;
    diag.rings_closed = stitched.rings_closed;

    diag.endpoints_snapped = snap_runs(&mut runs, level, field, config.epsilon);

    let year_step = field.year_step();
    let reassigned = reassign_age_zero(
        &mut runs,
        level,
        field,
        ReassignTolerances {
            primary: config.reassign_tolerance * year_step,
            fallback: config.reassign_fallback_tolerance * year_step,
            epsilon: config.epsilon,
        },
    );
    diag.endpoints_assigned = reassigned.assigned;
    diag.endpoints_reclaimed = reassigned.reclaimed;

    let params = FilterParams {
        heavy_step: config.heavy_step,
        min_points: config.min_points,
        min_area: field.cell_area() * config.min_area_fraction,
    };
    let (runs, dropped) = filter_runs(runs, level, &params);
    diag.runs_filtered = dropped;
    diag.runs_emitted = runs.len();

    debug!(
        level,
        heavy = diag.heavy,
        rings = diag.rings,
        skipped = diag.rings_skipped,
        duplicates = diag.duplicates,
        jump_cuts = diag.jump_cuts,
        merges = diag.merges,
        snapped = diag.endpoints_snapped,
        filtered = diag.runs_filtered,
        emitted = diag.runs_emitted,
        "level processed"
    );

    (runs, diag)
}
