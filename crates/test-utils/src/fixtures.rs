//! Common test fixtures for survivor-isoline tests.
//!
//! This module provides pre-defined input rows and helpers that write them
//! to temporary files, the way the CLI receives them.

use crate::generators::SyntheticGrid;
use std::io::Write;
use tempfile::NamedTempFile;

/// Default life-table radix.
pub const RADIX: f64 = 100_000.0;

/// A small abridged life table: three years, ages 0..20 in steps of 5.
pub const SAMPLE_ROWS_JSON: &str = r#"[
  { "year": 2000, "age": 0,  "survivors": 100000 },
  { "year": 2001, "age": 0,  "survivors": 100000 },
  { "year": 2002, "age": 0,  "survivors": 100000 },
  { "year": 2000, "age": 5,  "survivors": 98000 },
  { "year": 2001, "age": 5,  "survivors": 98500 },
  { "year": 2002, "age": 5,  "survivors": 99000 },
  { "year": 2000, "age": 10, "survivors": 91000 },
  { "year": 2001, "age": 10, "survivors": 93000 },
  { "year": 2002, "age": 10, "survivors": 95000 },
  { "year": 2000, "age": 15, "survivors": 72000 },
  { "year": 2001, "age": 15, "survivors": 76000 },
  { "year": 2002, "age": 15, "survivors": 81000 },
  { "year": 2000, "age": 20, "survivors": 40000 },
  { "year": 2001, "age": 20, "survivors": 47000 },
  { "year": 2002, "age": 20, "survivors": 55000 }
]"#;

/// Serialize a grid as the JSON array of rows the loader reads.
pub fn rows_json(grid: &SyntheticGrid) -> String {
    let rows: Vec<serde_json::Value> = grid
        .triples()
        .into_iter()
        .map(|(year, age, survivors)| {
            serde_json::json!({ "year": year, "age": age, "survivors": survivors })
        })
        .collect();
    serde_json::Value::Array(rows).to_string()
}

/// Write `contents` to a fresh temporary `.json` file.
///
/// The file is removed when the handle is dropped.
pub fn json_tempfile(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp file");
    file.flush().expect("failed to flush temp file");
    file
}
