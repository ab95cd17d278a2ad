//! Regular lon/lat grid specifications.
//!
//! Every grid in this workspace uses one orientation: row `0` is the
//! southernmost latitude and rows increase northward, column `0` is the
//! westernmost longitude and columns increase eastward. Data arrays are
//! row-major, so cell `(row, col)` lives at `row * cols + col`.

use crate::error::{RegionError, RegionResult};
use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// Relative tolerance used when checking that an axis is evenly spaced.
const SPACING_TOLERANCE: f64 = 1e-3;

/// Specification of a regular lat/lon grid of cell centres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of latitude rows
    pub rows: usize,
    /// Number of longitude columns
    pub cols: usize,
    /// Longitude of the centre of column 0
    pub first_lon: f64,
    /// Latitude of the centre of row 0
    pub first_lat: f64,
    /// Cell width in degrees of longitude
    pub dlon: f64,
    /// Cell height in degrees of latitude
    pub dlat: f64,
}

/// Direction of a 1-D coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    Ascending,
    Descending,
}

impl GridSpec {
    /// Create a new grid specification.
    pub fn new(
        rows: usize,
        cols: usize,
        first_lon: f64,
        first_lat: f64,
        dlon: f64,
        dlat: f64,
    ) -> Self {
        Self {
            rows,
            cols,
            first_lon,
            first_lat,
            dlon,
            dlat,
        }
    }

    /// Build a grid from 1-D cell-centre axes as read from a gridded file.
    ///
    /// Axes must be strictly monotonic and evenly spaced. Descending axes are
    /// accepted; the grid still starts at the smallest coordinate, so readers
    /// must flip data that was stored north-to-south (see [`axis_order`]).
    /// `fallback_spacing` is used for an axis with a single point.
    pub fn from_axes(lon: &[f64], lat: &[f64], fallback_spacing: f64) -> RegionResult<Self> {
        let dlon = axis_spacing("longitude", lon, fallback_spacing)?;
        let dlat = axis_spacing("latitude", lat, fallback_spacing)?;

        Ok(Self {
            rows: lat.len(),
            cols: lon.len(),
            first_lon: lon[0].min(lon[lon.len() - 1]),
            first_lat: lat[0].min(lat[lat.len() - 1]),
            dlon,
            dlat,
        })
    }

    /// Longitude of the centre of `col`.
    pub fn lon_at(&self, col: usize) -> f64 {
        self.first_lon + col as f64 * self.dlon
    }

    /// Latitude of the centre of `row`.
    pub fn lat_at(&self, row: usize) -> f64 {
        self.first_lat + row as f64 * self.dlat
    }

    /// Convert a grid index to cell-centre coordinates `(lon, lat)`.
    pub fn index_to_coord(&self, row: usize, col: usize) -> Option<(f64, f64)> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some((self.lon_at(col), self.lat_at(row)))
    }

    /// Signed `(row, col)` index of the cell nearest to a coordinate.
    ///
    /// Uses `round((coordinate - origin) / cell_size)` and may fall outside
    /// the grid; see [`GridSpec::coord_to_index`] for the bounds-checked form.
    pub fn raw_index(&self, lon: f64, lat: f64) -> (i64, i64) {
        let row = ((lat - self.first_lat) / self.dlat).round() as i64;
        let col = ((lon - self.first_lon) / self.dlon).round() as i64;
        (row, col)
    }

    /// Convert coordinates to the nearest `(row, col)` inside the grid.
    pub fn coord_to_index(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        let (row, col) = self.raw_index(lon, lat);
        if row < 0 || col < 0 || row >= self.rows as i64 || col >= self.cols as i64 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    /// Row-major array index of `(row, col)`.
    pub fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Bounding box of the cell centres.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.first_lon,
            self.first_lat,
            self.lon_at(self.cols.saturating_sub(1)),
            self.lat_at(self.rows.saturating_sub(1)),
        )
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Check if grid is empty.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

/// Determine whether a strictly monotonic axis ascends or descends.
pub fn axis_order(axis: &[f64]) -> RegionResult<AxisOrder> {
    if axis.len() < 2 {
        return Ok(AxisOrder::Ascending);
    }

    let ascending = axis.windows(2).all(|w| w[1] > w[0]);
    let descending = axis.windows(2).all(|w| w[1] < w[0]);

    match (ascending, descending) {
        (true, _) => Ok(AxisOrder::Ascending),
        (_, true) => Ok(AxisOrder::Descending),
        _ => Err(RegionError::invalid_grid(
            "coordinate axis is not strictly monotonic",
        )),
    }
}

fn axis_spacing(name: &str, axis: &[f64], fallback: f64) -> RegionResult<f64> {
    if axis.is_empty() {
        return Err(RegionError::invalid_grid(format!("{} axis is empty", name)));
    }
    if axis.iter().any(|v| !v.is_finite()) {
        return Err(RegionError::invalid_grid(format!(
            "{} axis contains non-finite values",
            name
        )));
    }
    if axis.len() == 1 {
        return Ok(fallback);
    }

    axis_order(axis)
        .map_err(|_| RegionError::invalid_grid(format!("{} axis is not strictly monotonic", name)))?;

    let spacing = (axis[axis.len() - 1] - axis[0]).abs() / (axis.len() - 1) as f64;
    let uneven = axis
        .windows(2)
        .any(|w| ((w[1] - w[0]).abs() - spacing).abs() > spacing * SPACING_TOLERANCE);
    if uneven {
        return Err(RegionError::invalid_grid(format!(
            "{} axis is not evenly spaced",
            name
        )));
    }

    Ok(spacing)
}
