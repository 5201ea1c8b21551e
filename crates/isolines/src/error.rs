//! Error types for isoline extraction.

use thiserror::Error;

/// Errors that can occur while building a grid or extracting isolines.
#[derive(Error, Debug)]
pub enum IsolineError {
    /// The grid parts are inconsistent (axis order, value count).
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Input rows could not be turned into a grid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration failed validation.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// A non-finite coordinate reached the output boundary.
    #[error(
        "non-finite coordinate at level {level}, run {run}, point {index}: year={year}, age={age}"
    )]
    NonFiniteCoordinate {
        level: f64,
        run: usize,
        index: usize,
        year: f64,
        age: f64,
    },

    /// Storage/IO error.
    #[error("io error: {0}")]
    Io(String),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(String),
}

impl IsolineError {
    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<std::io::Error> for IsolineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for IsolineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type for isoline operations.
pub type Result<T> = std::result::Result<T, IsolineError>;
