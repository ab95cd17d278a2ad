//! Boundary parsing errors.

use thiserror::Error;

use region_common::RegionError;

/// Result type for boundary parsing.
pub type BoundaryResult<T> = Result<T, BoundaryError>;

/// Errors that can occur while reading a boundary.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// Invalid WKT text.
    #[error("Invalid WKT format: {0}")]
    InvalidWkt(String),

    /// Invalid or unsupported GeoJSON.
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    /// Invalid coordinate value.
    #[error("Invalid coordinate value: {0}")]
    InvalidCoordinate(String),

    /// Coordinate out of valid range.
    #[error("Coordinate out of range: {0}")]
    OutOfRange(String),

    /// Unreadable shapefile geometry.
    #[error("Invalid shapefile: {0}")]
    InvalidShapefile(String),

    /// The file contained no polygons.
    #[error("No polygons found in {0}")]
    Empty(String),

    /// File extension not recognised.
    #[error("Unsupported boundary format: {0}")]
    UnsupportedFormat(String),

    /// I/O failure reading the boundary file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The merged outline is not a valid boundary.
    #[error(transparent)]
    Region(#[from] RegionError),
}

impl From<serde_json::Error> for BoundaryError {
    fn from(err: serde_json::Error) -> Self {
        BoundaryError::InvalidGeoJson(err.to_string())
    }
}
