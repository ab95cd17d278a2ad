//! Subcommand implementations.

use std::path::Path;

use anyhow::{Context, Result};
use boundary_parser::read_boundary;
use grid_mask::{CoordinateQuantizer, GridMaskBuilder, MaskConfig, MaskedSpatialAggregator, TimeSeries};
use tracing::{info, warn};

use crate::config::{validate_input_config, validate_job_config, InputConfig, JobConfig};
use crate::discovery::{discover_files, exclude_file};
use crate::output::{write_time_series, write_wide_csv};
use crate::readers::read_inputs;

/// Compute the regional mean series for a job and write it to `job.output`.
pub fn run_series(job: &JobConfig) -> Result<TimeSeries> {
    validate_job_config(job)?;

    let boundary = read_boundary(&job.boundary)
        .with_context(|| format!("Failed to load boundary {:?}", job.boundary))?;

    let quantizer = CoordinateQuantizer::from_config(&job.mask)?;
    let files = exclude_file(
        discover_files(&job.input.dir, &job.input.suffix)?,
        &job.output,
    );
    let inputs = read_inputs(&files, &job.input, &quantizer)?;

    if !inputs.grid.bbox().intersects(&boundary.bbox()) {
        warn!(
            boundary = ?boundary.bbox(),
            grid = ?inputs.grid.bbox(),
            "Boundary does not overlap the input grid"
        );
    }

    let builder = GridMaskBuilder::new(inputs.grid, &job.mask)?;
    let mask = builder.build(&boundary);
    info!(
        selected = mask.selected_count(),
        cells = inputs.grid.len(),
        "Built region mask"
    );

    let aggregator = MaskedSpatialAggregator::with_config(&mask, &job.mask)
        .with_context(|| format!("Boundary {:?} does not cover the input grid", job.boundary))?;
    let series = aggregator.aggregate(&inputs.timestamps, &inputs.fields)?;

    write_time_series(&job.output, &series)?;
    Ok(series)
}

/// Read all inputs and write them unreduced as a wide CSV grid.
pub fn run_export(input: &InputConfig, mask: &MaskConfig, output: &Path) -> Result<usize> {
    validate_input_config(input)?;

    let quantizer = CoordinateQuantizer::from_config(mask)?;
    let files = exclude_file(discover_files(&input.dir, &input.suffix)?, output);
    let inputs = read_inputs(&files, input, &quantizer)?;

    write_wide_csv(output, &inputs)?;
    Ok(inputs.len())
}

/// Replace missing values with zero in every matching NetCDF file under
/// `dir`, after removing the `drop_variables` from each.
#[cfg(feature = "netcdf")]
pub fn run_clean(dir: &Path, suffix: &str, drop_variables: &[String]) -> Result<usize> {
    use crate::readers::netcdf_file::{drop_variable, replace_nan_with_zero};

    let mut total = 0;
    for path in discover_files(dir, suffix)? {
        for variable in drop_variables {
            drop_variable(&path, variable)
                .with_context(|| format!("Failed to drop {} from {:?}", variable, path))?;
        }
        let replaced = replace_nan_with_zero(&path)?;
        info!(path = %path.display(), replaced, "Cleaned NetCDF file");
        total += replaced;
    }
    Ok(total)
}

#[cfg(not(feature = "netcdf"))]
pub fn run_clean(_dir: &Path, _suffix: &str, _drop_variables: &[String]) -> Result<usize> {
    anyhow::bail!("region-series was built without the `netcdf` feature")
}
