//! Error types for Barnes objective analysis

use thiserror::Error;

/// Main error type for analysis and I/O operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TIFF error: {0}")]
    Tiff(String),

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Degenerate grid: {reason}")]
    DegenerateGrid { reason: String },

    #[error("Length mismatch: {name} has {actual} entries, expected {expected}")]
    SizeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Index out of bounds: ({i}, {j}) in grid of size ({nx}, {ny})")]
    IndexOutOfBounds {
        i: usize,
        j: usize,
        nx: usize,
        ny: usize,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid_input(what: impl Into<String>) -> Self {
        Error::InvalidInput { what: what.into() }
    }

    pub(crate) fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, Error>;
