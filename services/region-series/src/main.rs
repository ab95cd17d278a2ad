//! Region Series CLI
//!
//! Regional mean time series from gridded model output (GPM IMERG, WRF,
//! NLDAS, WRF-Hydro) and a boundary file.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use grid_mask::MaskConfig;
use region_series::config::{load_job_config, InputConfig, InputFormat, JobConfig};
use region_series::pipeline::{run_clean, run_export, run_series};

/// Region Series
#[derive(Parser, Debug)]
#[command(name = "region-series")]
#[command(about = "Masked regional means of gridded time series")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "REGION_SERIES_JSON_LOGS", global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the regional mean of every time step
    Series {
        #[command(flatten)]
        input: InputArgs,

        /// Boundary file (.wkt, .geojson, .shp)
        #[arg(short, long, env = "REGION_SERIES_BOUNDARY")]
        boundary: Option<PathBuf>,

        /// Output CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reduce time steps in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Write every grid cell of every time step to a wide CSV
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replace NaN with zero in NetCDF files, in place
    Clean {
        /// Directory holding the files
        #[arg(short, long)]
        dir: PathBuf,

        /// File name suffix
        #[arg(short, long, default_value = ".nc")]
        suffix: String,

        /// Variable removed from each file before cleaning (repeatable)
        #[arg(long = "drop-variable")]
        drop_variables: Vec<String>,
    },
}

/// Input options shared by `series` and `export`; each overrides the job file.
#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// YAML job file
    #[arg(short, long, env = "REGION_SERIES_CONFIG")]
    config: Option<PathBuf>,

    /// Input directory
    #[arg(short = 'i', long)]
    input_dir: Option<PathBuf>,

    /// Input file name suffix
    #[arg(short, long)]
    suffix: Option<String>,

    /// Input format (detected from the suffix by default)
    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    /// Data variable; repeat to sum several
    #[arg(long = "variable")]
    variables: Vec<String>,
}

impl InputArgs {
    /// Load the job file, if any, and apply command-line overrides.
    fn load(&self) -> Result<JobConfig> {
        let mut job = match &self.config {
            Some(path) => load_job_config(path)?,
            None => JobConfig {
                mask: MaskConfig::from_env(),
                ..JobConfig::default()
            },
        };

        apply_input_overrides(&mut job.input, self);
        Ok(job)
    }
}

fn apply_input_overrides(input: &mut InputConfig, args: &InputArgs) {
    if let Some(dir) = &args.input_dir {
        input.dir = dir.clone();
    }
    if let Some(suffix) = &args.suffix {
        input.suffix = suffix.clone();
    }
    if args.format.is_some() {
        input.format = args.format;
    }
    if !args.variables.is_empty() {
        input.variables = args.variables.clone();
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        fmt().with_env_filter(filter).with_target(true).json().init();
    } else {
        fmt().with_env_filter(filter).with_target(true).init();
    }

    match args.command {
        Command::Series {
            input,
            boundary,
            output,
            parallel,
        } => {
            let mut job = input.load()?;
            if let Some(boundary) = boundary {
                job.boundary = boundary;
            }
            if let Some(output) = output {
                job.output = output;
            }
            if parallel {
                job.mask.parallel = true;
            }

            info!(boundary = %job.boundary.display(), input = %job.input.dir.display(), "Starting series run");
            let series = run_series(&job)?;
            info!(points = series.len(), output = %job.output.display(), "Series run complete");
        }
        Command::Export { input, output } => {
            let job = input.load()?;
            let steps = run_export(&job.input, &job.mask, &output)?;
            info!(steps, output = %output.display(), "Export complete");
        }
        Command::Clean {
            dir,
            suffix,
            drop_variables,
        } => {
            let replaced = run_clean(&dir, &suffix, &drop_variables)?;
            info!(replaced, dir = %dir.display(), "Clean complete");
        }
    }

    Ok(())
}
