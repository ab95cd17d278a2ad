//! Error types for mask construction and aggregation.

use thiserror::Error;

use region_common::RegionError;

/// Errors that can occur while building masks or reducing fields.
#[derive(Error, Debug)]
pub enum MaskError {
    /// The mask selects no cells, so a regional mean is undefined.
    #[error("mask selects no grid cells; boundary lies outside the grid or is degenerate")]
    EmptyMask,

    /// A field does not have the mask's dimensions.
    #[error("field shape {actual:?} does not match mask shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Timestamps and fields are not paired one-to-one.
    #[error("{timestamps} timestamps supplied for {fields} fields")]
    LengthMismatch { timestamps: usize, fields: usize },

    /// The grid cannot be masked.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// A field could not be constructed.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error from the shared geometry types.
    #[error(transparent)]
    Region(#[from] RegionError),
}

impl MaskError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create an InvalidField error.
    pub fn invalid_field(msg: impl Into<String>) -> Self {
        Self::InvalidField(msg.into())
    }
}

/// Result type for mask operations.
pub type Result<T> = std::result::Result<T, MaskError>;
