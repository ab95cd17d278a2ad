//! Job configuration for region-series runs.
//!
//! A job is described by a YAML file:
//!
//! ```yaml
//! boundary: ${DATA_DIR}/texas.geojson
//! output: out/texas_precip.csv
//! input:
//!   dir: ${DATA_DIR:-/data}/gpm
//!   suffix: .HDF5
//!   variables: [Grid/precipitation]
//!   lon: Grid/lon
//!   lat: Grid/lat
//!   layout: lon_lat
//!   time:
//!     source: variable
//!     name: Grid/time
//! mask:
//!   cell_size: 0.1
//!   missing:
//!     negative_is_missing: true
//! ```
//!
//! Supports environment variable substitution using ${VAR} syntax.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use grid_mask::MaskConfig;
use serde::{Deserialize, Serialize};

/// A complete series job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Boundary file (`.wkt`, `.geojson`, `.shp`).
    pub boundary: PathBuf,

    /// Where to write the `timestamp,value` CSV.
    pub output: PathBuf,

    pub input: InputConfig,

    pub mask: MaskConfig,
}

/// Where the gridded inputs live and how to read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory scanned for input files.
    pub dir: PathBuf,

    /// File name suffix selecting inputs, e.g. `.nc` or `CHRTOUT_DOMAIN1`.
    /// Empty selects every file in `dir`.
    pub suffix: String,

    /// Input format. Detected from the suffix when absent.
    pub format: Option<InputFormat>,

    /// Data variables; several are summed cell-wise.
    pub variables: Vec<String>,

    /// Longitude variable (1-D axis or 2-D field such as `XLONG`).
    pub lon: String,

    /// Latitude variable (1-D axis or 2-D field such as `XLAT`).
    pub lat: String,

    /// Axis order of the data variables.
    pub layout: Layout,

    /// Where each time step's timestamp comes from.
    pub time: TimeSource,

    /// `[rows, cols]` of a CSV grid whose shape cannot be inferred.
    pub shape: Option<[usize; 2]>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            suffix: ".nc".to_string(),
            format: None,
            variables: Vec::new(),
            lon: "lon".to_string(),
            lat: "lat".to_string(),
            layout: Layout::LatLon,
            time: TimeSource::Variable {
                name: "time".to_string(),
            },
            shape: None,
        }
    }
}

impl InputConfig {
    /// Configured format, or one detected from the suffix.
    pub fn resolved_format(&self) -> InputFormat {
        self.format
            .unwrap_or_else(|| InputFormat::from_suffix(&self.suffix))
    }
}

/// Supported input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Wide CSV: `lon` row, `lat` row, one row per time step.
    Csv,
    /// NetCDF-4 / HDF5.
    Netcdf,
}

impl InputFormat {
    /// Detect from a file suffix (case-insensitive). Anything that is not CSV
    /// is assumed to be NetCDF/HDF5.
    pub fn from_suffix(suffix: &str) -> Self {
        if suffix.to_lowercase().ends_with(".csv") {
            Self::Csv
        } else {
            Self::Netcdf
        }
    }
}

/// Axis order of gridded variables, ignoring a leading time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// `[lat][lon]`, the CF convention and WRF's `[south_north][west_east]`.
    #[default]
    LatLon,
    /// `[lon][lat]`, as in GPM IMERG granules.
    LonLat,
}

/// Source of each time step's timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TimeSource {
    /// Parse the file name with a chrono pattern; one time step per file.
    Filename { pattern: String },
    /// Read a CF time variable (`units = "<unit> since <epoch>"`).
    Variable { name: String },
}

/// Load and parse a job file with environment variable substitution.
pub fn load_job_config<P: AsRef<Path>>(path: P) -> Result<JobConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read job config from {:?}", path.as_ref()))?;

    let expanded = expand_env_vars(&content)?;

    let config: JobConfig = serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse job config from {:?}", path.as_ref()))?;

    Ok(config)
}

/// Check that a job has everything a series run needs.
pub fn validate_job_config(config: &JobConfig) -> Result<()> {
    anyhow::ensure!(
        !config.boundary.as_os_str().is_empty(),
        "Boundary file must be set"
    );
    anyhow::ensure!(
        !config.output.as_os_str().is_empty(),
        "Output path must be set"
    );
    validate_input_config(&config.input)?;

    config
        .mask
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid mask config: {}", e))?;

    Ok(())
}

/// Check the input section on its own (used by `export`).
pub fn validate_input_config(input: &InputConfig) -> Result<()> {
    if input.resolved_format() == InputFormat::Netcdf {
        anyhow::ensure!(
            !input.variables.is_empty(),
            "At least one data variable is required for NetCDF input"
        );
        anyhow::ensure!(
            !input.lon.is_empty() && !input.lat.is_empty(),
            "Coordinate variable names cannot be empty"
        );
    }

    if let Some([rows, cols]) = input.shape {
        anyhow::ensure!(rows > 0 && cols > 0, "Grid shape must be non-zero");
    }

    Ok(())
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}
