//! Regional masking for gridded time series.
//!
//! This crate turns a region boundary into a cell mask on a regular lon/lat
//! grid and reduces each time step of a gridded variable to the mean over that
//! region. The mask is rasterized once and reused for every time step.
//!
//! # Architecture
//!
//! ```text
//! BoundaryPolygon
//!      │
//!      ▼
//! CoordinateQuantizer::quantize_ring      snap vertices to cell centres
//!      │
//!      ▼
//! GridMaskBuilder::build                  seed cells, fill each row span
//!      │
//!      ▼
//! InclusionMask  ──────────────┐          built once
//!                              │
//! Field (t0), Field (t1), ... ─┴─► MaskedSpatialAggregator::aggregate
//!                                          │
//!                                          ▼
//!                                     TimeSeries
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_mask::{build_mask, aggregate};
//!
//! let mask = build_mask(&grid, &boundary)?;
//! let series = aggregate(&mask, &timestamps, &fields)?;
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod mask;
pub mod quantize;

// Re-export commonly used types at crate root
pub use aggregate::{aggregate, Field, MaskedSpatialAggregator};
pub use config::{MaskConfig, MissingValues};
pub use error::{MaskError, Result};
pub use mask::{build_mask, find_first_last_indices, GridMaskBuilder, InclusionMask, RowSpan};
pub use quantize::{native_grid, CoordinateQuantizer};

pub use region_common::{BoundaryPolygon, GridSpec, TimeSeries};
