//! Error types shared by the region-series crates.

use thiserror::Error;

/// Result type alias using RegionError.
pub type RegionResult<T> = Result<T, RegionError>;

/// Errors raised while describing grids, boundaries and time axes.
#[derive(Debug, Error)]
pub enum RegionError {
    // === Geometry Errors ===
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid boundary: {0}")]
    InvalidBoundary(String),

    // === Time Errors ===
    #[error("Invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    #[error("Unsupported time units: {0}")]
    UnsupportedTimeUnits(String),
}

impl RegionError {
    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create an InvalidBoundary error.
    pub fn invalid_boundary(msg: impl Into<String>) -> Self {
        Self::InvalidBoundary(msg.into())
    }

    /// Create an InvalidTimestamp error.
    pub fn invalid_timestamp(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            message: message.into(),
        }
    }
}
