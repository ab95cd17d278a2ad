//! Scanline rasterization of a boundary onto a regular grid.
//!
//! Building a mask takes two passes over the grid:
//!
//! 1. **Seed** - every boundary vertex is quantized, duplicates are removed,
//!    and the cell it lands in is marked.
//! 2. **Fill** - each row is filled from its first seeded column to its last
//!    seeded column, inclusive.
//!
//! The fill treats every row as one span, so a concave region whose row
//! crosses the boundary more than twice also selects the gap in between.
//! Rows without any seed stay empty, which can leave holes in a region whose
//! boundary is sparsely sampled.

use std::cmp::Ordering;

use region_common::{BoundaryPolygon, GridSpec};
use tracing::{debug, warn};

use crate::config::MaskConfig;
use crate::error::{MaskError, Result};
use crate::quantize::CoordinateQuantizer;

/// Allowed relative difference between grid spacing and quantizer cell size.
const SPACING_TOLERANCE: f64 = 1e-3;

/// First and last column (inclusive) of a seeded row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub first: usize,
    pub last: usize,
}

impl RowSpan {
    /// Number of cells covered by the span; never zero.
    pub fn width(&self) -> usize {
        self.last - self.first + 1
    }

    /// Check if a column lies inside the span.
    pub fn contains(&self, col: usize) -> bool {
        col >= self.first && col <= self.last
    }
}

/// Find the first and last positions of `value` in `row`.
///
/// Returns `None` when the row does not contain `value`. A single match
/// yields a span whose `first` and `last` are equal.
pub fn find_first_last_indices<T: PartialEq>(row: &[T], value: &T) -> Option<RowSpan> {
    let first = row.iter().position(|v| v == value)?;
    let last = row.iter().rposition(|v| v == value)?;
    Some(RowSpan { first, last })
}

/// Cells of a grid that lie inside a region.
///
/// Stored row-major as `0`/`1` bytes with the number of selected cells
/// cached, since every aggregation divides by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionMask {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
    selected: usize,
}

impl InclusionMask {
    /// Create a mask with no cells selected.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
            selected: 0,
        }
    }

    /// Create a mask from row-major cells. Any non-zero cell is selected.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<u8>) -> Result<Self> {
        if cells.len() != rows * cols {
            return Err(MaskError::invalid_grid(format!(
                "mask has {} cells, expected {}x{}",
                cells.len(),
                rows,
                cols
            )));
        }

        let cells: Vec<u8> = cells.into_iter().map(|c| u8::from(c != 0)).collect();
        let selected = cells.iter().filter(|&&c| c == 1).count();

        Ok(Self {
            rows,
            cols,
            cells,
            selected,
        })
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Check if a cell is selected. Out-of-range cells are not.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col] == 1
    }

    /// One row of the mask.
    pub fn row(&self, row: usize) -> &[u8] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Number of selected cells.
    pub fn selected_count(&self) -> usize {
        self.selected
    }

    /// True when no cell is selected.
    pub fn is_empty(&self) -> bool {
        self.selected == 0
    }

    /// Flat indices of the selected cells in ascending order.
    pub fn iter_selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == 1)
            .map(|(i, _)| i)
    }

    fn mark(&mut self, row: usize, col: usize) {
        self.cells[row * self.cols + col] = 1;
    }

    fn fill_span(&mut self, row: usize, span: RowSpan) {
        let start = row * self.cols;
        self.cells[start + span.first..=start + span.last].fill(1);
    }

    fn recount(&mut self) {
        self.selected = self.cells.iter().filter(|&&c| c == 1).count();
    }
}

/// Rasterizes boundaries onto one grid.
#[derive(Debug, Clone)]
pub struct GridMaskBuilder {
    grid: GridSpec,
    quantizer: CoordinateQuantizer,
}

impl GridMaskBuilder {
    /// Create a builder for `grid`.
    ///
    /// The grid spacing must equal the configured cell size, otherwise
    /// quantized vertices would not land on cell centres.
    pub fn new(grid: GridSpec, config: &MaskConfig) -> Result<Self> {
        let quantizer = CoordinateQuantizer::from_config(config)?;

        if grid.is_empty() {
            return Err(MaskError::invalid_grid("grid has no cells"));
        }

        let cell = config.cell_size;
        let tolerance = cell * SPACING_TOLERANCE;
        if (grid.dlon - cell).abs() > tolerance || (grid.dlat - cell).abs() > tolerance {
            return Err(MaskError::invalid_grid(format!(
                "grid spacing {}x{} does not match cell size {}",
                grid.dlon, grid.dlat, cell
            )));
        }

        Ok(Self { grid, quantizer })
    }

    /// The grid masks are built on.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Build the inclusion mask for `boundary`.
    pub fn build(&self, boundary: &BoundaryPolygon) -> InclusionMask {
        let (rows, cols) = self.grid.shape();
        let mut mask = InclusionMask::new(rows, cols);

        let mut vertices = self.quantizer.quantize_ring(boundary);
        vertices.sort_by(|a, b| match a.0.total_cmp(&b.0) {
            Ordering::Equal => a.1.total_cmp(&b.1),
            other => other,
        });
        vertices.dedup();

        let mut dropped = 0usize;
        for &(lon, lat) in &vertices {
            match self.grid.coord_to_index(lon, lat) {
                Some((row, col)) => mask.mark(row, col),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(
                dropped,
                total = vertices.len(),
                "Boundary vertices outside the grid were ignored"
            );
        }

        let mut filled_rows = 0usize;
        let mut widest = 0usize;
        for row in 0..rows {
            if let Some(span) = find_first_last_indices(mask.row(row), &1) {
                mask.fill_span(row, span);
                filled_rows += 1;
                widest = widest.max(span.width());
            }
        }
        mask.recount();

        debug!(
            vertices = vertices.len(),
            rows = filled_rows,
            widest,
            selected = mask.selected_count(),
            "Built inclusion mask"
        );

        mask
    }
}

/// Build a mask for `boundary` on `grid` with the default configuration.
pub fn build_mask(grid: &GridSpec, boundary: &BoundaryPolygon) -> Result<InclusionMask> {
    let builder = GridMaskBuilder::new(*grid, &MaskConfig::default())?;
    Ok(builder.build(boundary))
}
