//! Survivor-count isolines over a year × age grid.
//!
//! Turns raw traced contour rings into clean, boundary-snapped polylines
//! that render without gaps, stray chords or duplicated strokes.
//!
//! # Architecture
//!
//! ```text
//! GridField (years × ages, survivors)
//!      │
//!      ├─► select_levels          fixed-step thresholds, heavy flags
//!      │
//!      ├─► RawTracer::trace        rings in fractional grid coordinates
//!      │
//!      └─► per level
//!               │
//!               ├─► split_ring       cut at the outer rectangle, drop wall slivers
//!               ├─► normalize_runs   collapse points, drop reversed duplicates
//!               ├─► split_jumps      cut implausible chords
//!               ├─► stitch_runs      join fragments with tangent-aware matching
//!               ├─► snap_runs        endpoints onto analytic boundary crossings
//!               ├─► reassign_age_zero  one endpoint per age-zero crossing
//!               └─► filter_runs      drop insignificant runs
//!                        │
//!                        ▼
//!               flatten + validate → Vec<ContourEntry>
//! ```
//!
//! # Example
//!
//! ```ignore
//! use isolines::{extract_isolines, GridField, IsolineConfig, MarchingSquares};
//!
//! let field = GridField::from_rows(&rows)?;
//! let output = extract_isolines(&field, &MarchingSquares, &IsolineConfig::default())?;
//! for entry in &output.entries {
//!     println!("{} survivors: {} points", entry.level, entry.points.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod grid;
pub mod jumps;
pub mod levels;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod reassign;
pub mod run;
pub mod snap;
pub mod split;
pub mod stitch;
pub mod tracer;

// Re-export commonly used types at crate root
pub use config::IsolineConfig;
pub use error::{IsolineError, Result};
pub use grid::{Bounds, DomainPoint, GridField};
pub use levels::{is_heavy, select_levels};
pub use loader::{rows_from_file, rows_from_json, SurvivorRow};
pub use output::{to_json, validate_entries, ContourEntry};
pub use pipeline::{
    extract_from_parts, extract_isolines, IsolineOutput, LevelDiagnostics, PipelineDiagnostics,
};
pub use run::{Run, RunKind};
pub use tracer::{GridPoint, MarchingSquares, RawTracer, Ring, TracedLevel};
