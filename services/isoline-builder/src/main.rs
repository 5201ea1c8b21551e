//! Isoline builder.
//!
//! Reads survivor rows (JSON), extracts survivor-count isolines and writes
//! them as a JSON array of `{ level, points }` entries.

mod job;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Isoline builder
#[derive(Parser, Debug)]
#[command(name = "isoline-builder")]
#[command(about = "Extract survivor-count isolines from a year x age table")]
pub struct Args {
    /// Input rows: JSON array of { year, age, survivors }
    #[arg(short, long)]
    pub input: String,

    /// Output path (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// JSON configuration file (default: ISOLINE_* environment variables)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Threshold step between levels
    #[arg(long)]
    pub level_step: Option<f64>,

    /// Coarse step marking heavy levels
    #[arg(long)]
    pub heavy_step: Option<f64>,

    /// Process levels in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so stdout stays clean for the JSON output.
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(input = %args.input, "Starting isoline builder");

    let config = job::resolve_config(&args)?;
    let summary = job::run(&args, &config)?;

    info!(
        levels = summary.levels,
        entries = summary.entries,
        merges = summary.merges,
        filtered = summary.filtered,
        output = %args.output.as_deref().unwrap_or("stdout"),
        "Isolines written"
    );

    Ok(())
}
