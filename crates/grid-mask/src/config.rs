//! Configuration for mask construction and aggregation.

use serde::{Deserialize, Serialize};

/// Smallest cell size accepted. Quantization rounds inputs to two decimals
/// first, so finer cells cannot be resolved.
const MIN_CELL_SIZE: f64 = 0.01;

/// Configuration shared by the quantizer, mask builder and aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Grid cell size in degrees. Boundary vertices are snapped to the
    /// centres of cells of this size.
    pub cell_size: f64,

    /// Reduce time steps on the rayon thread pool.
    pub parallel: bool,

    /// Which field values count as missing.
    pub missing: MissingValues,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            cell_size: 0.1,
            parallel: false,
            missing: MissingValues::default(),
        }
    }
}

impl MaskConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MASK_CELL_SIZE") {
            if let Ok(size) = val.parse() {
                config.cell_size = size;
            }
        }

        if let Ok(val) = std::env::var("MASK_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("MASK_FILL_VALUE") {
            if let Ok(fill) = val.parse() {
                config.missing.fill_value = Some(fill);
            }
        }

        if let Ok(val) = std::env::var("MASK_NEGATIVE_IS_MISSING") {
            config.missing.negative_is_missing = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err("cell_size must be a positive number".to_string());
        }

        if self.cell_size < MIN_CELL_SIZE {
            return Err(format!("cell_size must be >= {}", MIN_CELL_SIZE));
        }

        if let Some(fill) = self.missing.fill_value {
            if fill.is_nan() {
                return Err("fill_value must not be NaN".to_string());
            }
        }

        Ok(())
    }
}

/// Rules for recognising missing field values.
///
/// NaN is always missing. Missing cells contribute zero to the regional sum
/// but still count toward the divisor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MissingValues {
    /// Sentinel written by the producer for absent data (e.g. `-9999.0`).
    pub fill_value: Option<f64>,

    /// Treat negative values as missing. Useful for precipitation products
    /// that encode gaps as negative numbers.
    pub negative_is_missing: bool,
}

impl MissingValues {
    /// NaN only.
    pub fn nan_only() -> Self {
        Self::default()
    }

    /// Check whether a value is missing.
    #[inline]
    pub fn is_missing(&self, value: f64) -> bool {
        if value.is_nan() {
            return true;
        }
        if self.negative_is_missing && value < 0.0 {
            return true;
        }
        matches!(self.fill_value, Some(fill) if value == fill)
    }

    /// The value a cell contributes to the regional sum.
    #[inline]
    pub fn contribution(&self, value: f64) -> f64 {
        if self.is_missing(value) {
            0.0
        } else {
            value
        }
    }
}
