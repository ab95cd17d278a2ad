//! Wide CSV grids.
//!
//! ```text
//! lon,-98.05,-97.95,-98.05,-97.95
//! lat,30.05,30.05,30.15,30.15
//! 2024-02-01T00:00:00Z,0.0,1.2,,0.4
//! 2024-02-01T01:00:00Z,0.1,0.9,0.3,0.2
//! ```
//!
//! Cells may be stored in any order; each one is placed on the grid by its
//! quantized coordinates. An empty cell or `NaN` is missing.

use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use grid_mask::{native_grid, CoordinateQuantizer, Field, GridSpec};
use region_common::time::parse_timestamp;
use tracing::debug;

use super::GriddedSeries;

/// Read a wide CSV grid file.
///
/// `shape` is `[rows, cols]`. When absent it is inferred from the number of
/// distinct quantized latitudes and longitudes, which works for regular grids.
/// Every stored cell must land on its own grid cell; a file whose coordinates
/// overlap or fall outside the grid is rejected.
pub fn read_csv_grid(
    path: &Path,
    shape: Option<[usize; 2]>,
    quantizer: &CoordinateQuantizer,
) -> Result<GriddedSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV grid {:?}", path))?;

    let mut records = reader.records();

    let lon = match records.next() {
        Some(record) => parse_coordinate_row(&record?, "lon")?,
        None => anyhow::bail!("CSV grid {:?} is empty", path),
    };
    let lat = match records.next() {
        Some(record) => parse_coordinate_row(&record?, "lat")?,
        None => anyhow::bail!("CSV grid {:?} has no lat row", path),
    };

    anyhow::ensure!(!lon.is_empty(), "CSV grid {:?} has no cells", path);
    anyhow::ensure!(
        lon.len() == lat.len(),
        "CSV grid {:?} has {} longitudes but {} latitudes",
        path,
        lon.len(),
        lat.len()
    );

    let [rows, cols] = match shape {
        Some(shape) => shape,
        None => infer_shape(&lon, &lat, quantizer).with_context(|| {
            format!("Cannot infer grid shape of {:?}; set input.shape", path)
        })?,
    };

    let grid = native_grid(&lon, &lat, rows, cols, quantizer)?;
    let placement = cell_placement(&lon, &lat, &grid, quantizer)
        .with_context(|| format!("CSV grid {:?} does not tile a {}x{} grid", path, rows, cols))?;
    let mut series = GriddedSeries::new(grid);

    for (line, record) in records.enumerate() {
        let record = record?;
        let row_no = line + 3;

        let stamp = record
            .get(0)
            .ok_or_else(|| anyhow::anyhow!("Row {} of {:?} is empty", row_no, path))?;
        let timestamp = parse_timestamp(stamp)
            .with_context(|| format!("Row {} of {:?}", row_no, path))?;

        let stored = record
            .iter()
            .skip(1)
            .map(parse_cell)
            .collect::<Result<Vec<f64>>>()
            .with_context(|| format!("Row {} of {:?}", row_no, path))?;
        anyhow::ensure!(
            stored.len() == placement.len(),
            "Row {} of {:?} has {} values, expected {}",
            row_no,
            path,
            stored.len(),
            placement.len()
        );

        let mut values = vec![f64::NAN; grid.len()];
        for (&target, value) in placement.iter().zip(stored) {
            values[target] = value;
        }

        series.timestamps.push(timestamp);
        series.fields.push(Field::new(rows, cols, values)?);
    }

    debug!(path = %path.display(), rows, cols, steps = series.len(), "Read CSV grid");
    Ok(series)
}

/// Row-major grid index of every stored cell.
fn cell_placement(
    lon: &[f64],
    lat: &[f64],
    grid: &GridSpec,
    quantizer: &CoordinateQuantizer,
) -> Result<Vec<usize>> {
    let mut taken = vec![false; grid.len()];

    lon.iter()
        .zip(lat)
        .enumerate()
        .map(|(cell, (&x, &y))| {
            let (qx, qy) = quantizer.quantize_point((x, y));
            let (row, col) = grid.coord_to_index(qx, qy).ok_or_else(|| {
                anyhow::anyhow!("cell {} at ({}, {}) lies outside the grid", cell + 1, x, y)
            })?;
            let target = grid.flat_index(row, col);
            anyhow::ensure!(
                !std::mem::replace(&mut taken[target], true),
                "cell {} at ({}, {}) repeats grid cell ({}, {})",
                cell + 1,
                x,
                y,
                row,
                col
            );
            Ok(target)
        })
        .collect()
}

fn parse_coordinate_row(record: &StringRecord, label: &str) -> Result<Vec<f64>> {
    let first = record.get(0).unwrap_or("").trim();
    anyhow::ensure!(
        first.eq_ignore_ascii_case(label),
        "Expected a '{}' row, found '{}'",
        label,
        first
    );

    record
        .iter()
        .skip(1)
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid {} value '{}'", label, v))
        })
        .collect()
}

fn parse_cell(value: &str) -> Result<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(f64::NAN);
    }
    value
        .parse::<f64>()
        .with_context(|| format!("Invalid value '{}'", value))
}

fn infer_shape(lon: &[f64], lat: &[f64], quantizer: &CoordinateQuantizer) -> Result<[usize; 2]> {
    let cols = distinct_count(&quantizer.quantize_coordinates(lon));
    let rows = distinct_count(&quantizer.quantize_coordinates(lat));
    anyhow::ensure!(
        rows * cols == lon.len(),
        "{} distinct latitudes x {} distinct longitudes != {} cells",
        rows,
        cols,
        lon.len()
    );
    Ok([rows, cols])
}

fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = "lon,-98.05,-97.95,-98.05,-97.95\n\
                          lat,30.05,30.05,30.15,30.15\n\
                          2024-02-01T00:00:00Z,0.0,1.2,,0.4\n\
                          2024-02-01 01:00:00,0.1,0.9,0.3,NaN\n";

    #[test]
    fn test_read_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        fs::write(&path, SAMPLE).unwrap();

        let series = read_csv_grid(&path, None, &CoordinateQuantizer::default()).unwrap();

        assert_eq!(series.grid.shape(), (2, 2));
        assert_eq!(series.grid.first_lon, -98.05);
        assert_eq!(series.grid.first_lat, 30.05);
        assert_eq!(series.len(), 2);
        assert_eq!(series.fields[0].get(0, 1), Some(1.2));
        assert!(series.fields[0].get(1, 0).unwrap().is_nan());
        assert!(series.fields[1].get(1, 1).unwrap().is_nan());
        assert_eq!(
            series.timestamps[1].to_rfc3339(),
            "2024-02-01T01:00:00+00:00"
        );
    }

    #[test]
    fn test_explicit_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        fs::write(&path, SAMPLE).unwrap();

        let series = read_csv_grid(&path, Some([2, 2]), &CoordinateQuantizer::default()).unwrap();
        assert_eq!(series.grid.shape(), (2, 2));

        // Two latitudes cannot fit in one row
        assert!(read_csv_grid(&path, Some([1, 4]), &CoordinateQuantizer::default()).is_err());
    }

    #[test]
    fn test_north_to_south_rows_are_placed_by_latitude() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        fs::write(
            &path,
            "lon,0.05,0.15,0.05,0.15\n\
             lat,0.15,0.15,0.05,0.05\n\
             2024-02-01T00:00:00Z,100,100,1,2\n",
        )
        .unwrap();

        let series = read_csv_grid(&path, None, &CoordinateQuantizer::default()).unwrap();
        assert_eq!(series.grid.first_lat, 0.05);
        // Row 0 is the south
        assert_eq!(series.fields[0].get(0, 0), Some(1.0));
        assert_eq!(series.fields[0].get(0, 1), Some(2.0));
        assert_eq!(series.fields[0].get(1, 0), Some(100.0));
    }

    #[test]
    fn test_repeated_cell_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        fs::write(
            &path,
            "lon,0.05,0.05,0.15,0.15\nlat,0.05,0.05,0.15,0.15\n2024-02-01T00:00:00Z,1,2,3,4\n",
        )
        .unwrap();

        assert!(read_csv_grid(&path, Some([2, 2]), &CoordinateQuantizer::default()).is_err());
    }

    #[test]
    fn test_missing_lat_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        fs::write(&path, "lon,1.0,2.0\nlatitude,1.0,1.0\n").unwrap();

        assert!(read_csv_grid(&path, None, &CoordinateQuantizer::default()).is_err());
    }

    #[test]
    fn test_ragged_row_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        fs::write(
            &path,
            "lon,0.05,0.15\nlat,0.05,0.05\n2024-02-01T00:00:00Z,1.0\n",
        )
        .unwrap();

        assert!(read_csv_grid(&path, None, &CoordinateQuantizer::default()).is_err());
    }
}
