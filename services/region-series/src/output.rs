//! CSV outputs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use grid_mask::TimeSeries;
use tracing::info;

use crate::readers::GriddedSeries;

/// Write a `timestamp,value` CSV with RFC 3339 UTC timestamps.
pub fn write_time_series(path: &Path, series: &TimeSeries) -> Result<()> {
    let mut writer = create_writer(path)?;
    writer.write_record(["timestamp", "value"])?;

    for point in series.iter() {
        writer.write_record([format_timestamp(&point.timestamp), format_value(point.value)])?;
    }
    writer.flush()?;

    info!(path = %path.display(), points = series.len(), "Wrote time series");
    Ok(())
}

/// Write every cell of every time step as a wide CSV grid.
///
/// Row 1 holds each cell's longitude, row 2 its latitude, then one row per
/// time step. Missing values are written as empty cells.
pub fn write_wide_csv(path: &Path, series: &GriddedSeries) -> Result<()> {
    let grid = &series.grid;
    let mut writer = create_writer(path)?;

    let mut lon_row = Vec::with_capacity(grid.len() + 1);
    let mut lat_row = Vec::with_capacity(grid.len() + 1);
    lon_row.push("lon".to_string());
    lat_row.push("lat".to_string());
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            lon_row.push(format_coordinate(grid.lon_at(col)));
            lat_row.push(format_coordinate(grid.lat_at(row)));
        }
    }
    writer.write_record(&lon_row)?;
    writer.write_record(&lat_row)?;

    for (timestamp, field) in series.timestamps.iter().zip(&series.fields) {
        let mut record = Vec::with_capacity(field.values().len() + 1);
        record.push(format_timestamp(timestamp));
        record.extend(field.values().iter().map(|&v| format_value(v)));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(
        path = %path.display(),
        cells = grid.len(),
        steps = series.len(),
        "Wrote wide grid CSV"
    );
    Ok(())
}

fn create_writer(path: &Path) -> Result<csv::Writer<fs::File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Coordinates are cell centres; round away accumulated step error.
fn format_coordinate(value: f64) -> String {
    ((value * 1e6).round() / 1e6).to_string()
}
