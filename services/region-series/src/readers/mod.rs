//! Gridded input readers.
//!
//! Every reader returns a [`GriddedSeries`]: the grid, one timestamp per time
//! step and one row-major [`Field`] per time step, already oriented with row 0
//! in the south and column 0 in the west.

pub mod csv_grid;
#[cfg(feature = "netcdf")]
pub mod netcdf_file;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use grid_mask::{CoordinateQuantizer, Field, GridSpec};
use tracing::info;

use crate::config::{InputConfig, InputFormat};

pub use csv_grid::read_csv_grid;

/// Time steps of one variable on one grid.
#[derive(Debug, Clone)]
pub struct GriddedSeries {
    pub grid: GridSpec,
    pub timestamps: Vec<DateTime<Utc>>,
    pub fields: Vec<Field>,
}

impl GriddedSeries {
    /// An empty series on `grid`.
    pub fn new(grid: GridSpec) -> Self {
        Self {
            grid,
            timestamps: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append the time steps of `other`, which must share this grid.
    pub fn extend(&mut self, other: GriddedSeries) -> Result<()> {
        anyhow::ensure!(
            same_grid(&self.grid, &other.grid),
            "Input grids differ: {:?} vs {:?}",
            self.grid,
            other.grid
        );
        self.timestamps.extend(other.timestamps);
        self.fields.extend(other.fields);
        Ok(())
    }
}

/// Read every file in order and concatenate their time steps.
pub fn read_inputs(
    files: &[PathBuf],
    input: &InputConfig,
    quantizer: &CoordinateQuantizer,
) -> Result<GriddedSeries> {
    let format = input.resolved_format();
    let mut combined: Option<GriddedSeries> = None;

    for path in files {
        let series = match format {
            InputFormat::Csv => read_csv_grid(path, input.shape, quantizer)?,
            InputFormat::Netcdf => read_netcdf_input(path, input, quantizer)?,
        };

        match combined.as_mut() {
            Some(all) => all.extend(series)?,
            None => combined = Some(series),
        }
    }

    let combined =
        combined.ok_or_else(|| anyhow::anyhow!("No input files matched the configured suffix"))?;

    info!(
        files = files.len(),
        steps = combined.len(),
        rows = combined.grid.rows,
        cols = combined.grid.cols,
        "Read gridded inputs"
    );

    Ok(combined)
}

#[cfg(feature = "netcdf")]
fn read_netcdf_input(
    path: &std::path::Path,
    input: &InputConfig,
    quantizer: &CoordinateQuantizer,
) -> Result<GriddedSeries> {
    netcdf_file::read_netcdf(path, input, quantizer)
}

#[cfg(not(feature = "netcdf"))]
fn read_netcdf_input(
    path: &std::path::Path,
    _input: &InputConfig,
    _quantizer: &CoordinateQuantizer,
) -> Result<GriddedSeries> {
    anyhow::bail!(
        "Cannot read {:?}: region-series was built without the `netcdf` feature",
        path
    )
}

fn same_grid(a: &GridSpec, b: &GridSpec) -> bool {
    let tolerance = a.dlon.abs().min(a.dlat.abs()) * 1e-6;
    a.shape() == b.shape()
        && (a.first_lon - b.first_lon).abs() <= tolerance
        && (a.first_lat - b.first_lat).abs() <= tolerance
        && (a.dlon - b.dlon).abs() <= tolerance
        && (a.dlat - b.dlat).abs() <= tolerance
}
