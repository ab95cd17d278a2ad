//! Common types shared by the region-series crates.
//!
//! Everything here is plain data: grid geometry, boundary rings, time series
//! and the timestamp helpers used when reading model output.

pub mod bbox;
pub mod boundary;
pub mod error;
pub mod grid;
pub mod series;
pub mod time;

pub use bbox::BoundingBox;
pub use boundary::BoundaryPolygon;
pub use error::{RegionError, RegionResult};
pub use grid::GridSpec;
pub use series::{TimePoint, TimeSeries};
