//! Coordinate quantization onto the cell-centre lattice.
//!
//! A value is rounded to two decimals, floored to a multiple of the cell
//! size, then offset by half a cell. With the default 0.1° cell:
//!
//! ```text
//!   -179.93  ->  -179.95
//!   -180.01  ->  -180.05
//!      0.06  ->     0.05
//!     0.099  ->     0.15   (rounds to 0.10 first)
//! ```
//!
//! Flooring rather than rounding to nearest is what maps every coordinate
//! inside a cell onto that cell's centre.

use region_common::{BoundaryPolygon, GridSpec};

use crate::config::MaskConfig;
use crate::error::{MaskError, Result};

/// Decimal places kept before flooring.
const INPUT_SCALE: f64 = 100.0;

/// Quantized results are rounded to this many decimals to strip binary noise.
const OUTPUT_SCALE: f64 = 1e10;

/// Snaps coordinates to the centres of a regular lattice of cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateQuantizer {
    cell_size: f64,
    factor: f64,
    half_cell: f64,
}

impl Default for CoordinateQuantizer {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl CoordinateQuantizer {
    /// Create a quantizer for the given cell size in degrees.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            factor: (1.0 / cell_size).round(),
            half_cell: cell_size / 2.0,
        }
    }

    /// Create a quantizer from a validated configuration.
    pub fn from_config(config: &MaskConfig) -> Result<Self> {
        config.validate().map_err(MaskError::InvalidConfig)?;
        Ok(Self::new(config.cell_size))
    }

    /// Cell size in degrees.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Snap one coordinate to the centre of its cell.
    pub fn quantize(&self, value: f64) -> f64 {
        let rounded = round_half_even(value * INPUT_SCALE) / INPUT_SCALE;
        // Clean the scaled value before flooring so 2.3 * 10 never floors to 22.
        let scaled = clean(rounded * self.factor);
        clean(scaled.floor() / self.factor + self.half_cell)
    }

    /// Snap a `(lon, lat)` pair.
    pub fn quantize_point(&self, point: (f64, f64)) -> (f64, f64) {
        (self.quantize(point.0), self.quantize(point.1))
    }

    /// Snap every vertex of a boundary ring, keeping vertex order.
    pub fn quantize_ring(&self, boundary: &BoundaryPolygon) -> Vec<(f64, f64)> {
        boundary
            .vertices()
            .iter()
            .map(|&p| self.quantize_point(p))
            .collect()
    }

    /// Snap a flat array of coordinates, e.g. a model's 2-D longitude field.
    pub fn quantize_coordinates(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.quantize(v)).collect()
    }
}

/// Build a regular grid for a model's native (possibly curvilinear) grid.
///
/// `lon2d` and `lat2d` hold one coordinate per cell in row-major order. The
/// coordinates are quantized and their minima become the grid origin; spacing
/// is the quantizer's cell size. This treats the native grid as if it were
/// regular, which holds only approximately for projected model grids.
pub fn native_grid(
    lon2d: &[f64],
    lat2d: &[f64],
    rows: usize,
    cols: usize,
    quantizer: &CoordinateQuantizer,
) -> Result<GridSpec> {
    let expected = rows * cols;
    if expected == 0 {
        return Err(MaskError::invalid_grid("native grid has no cells"));
    }
    if lon2d.len() != expected || lat2d.len() != expected {
        return Err(MaskError::invalid_grid(format!(
            "coordinate arrays have {} and {} values, expected {} ({}x{})",
            lon2d.len(),
            lat2d.len(),
            expected,
            rows,
            cols
        )));
    }
    if lon2d.iter().chain(lat2d).any(|v| !v.is_finite()) {
        return Err(MaskError::invalid_grid(
            "native grid coordinates contain non-finite values",
        ));
    }

    let min_lon = quantizer
        .quantize_coordinates(lon2d)
        .into_iter()
        .fold(f64::INFINITY, f64::min);
    let min_lat = quantizer
        .quantize_coordinates(lat2d)
        .into_iter()
        .fold(f64::INFINITY, f64::min);

    let cell = quantizer.cell_size();
    Ok(GridSpec::new(rows, cols, min_lon, min_lat, cell, cell))
}

/// Round to the nearest integer, ties to even.
fn round_half_even(x: f64) -> f64 {
    let rounded = x.round();
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        rounded
    }
}

#[inline]
fn clean(x: f64) -> f64 {
    (x * OUTPUT_SCALE).round() / OUTPUT_SCALE
}
