//! Masked regional means of gridded fields.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

use region_common::TimeSeries;

use crate::config::{MaskConfig, MissingValues};
use crate::error::{MaskError, Result};
use crate::mask::InclusionMask;

/// One time step of a gridded variable, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Field {
    /// Create a field from row-major values.
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(MaskError::invalid_field(format!(
                "{} values for a {}x{} field",
                values.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, values })
    }

    /// Create a field from single-precision values as stored in most files.
    pub fn from_f32(rows: usize, cols: usize, values: &[f32]) -> Result<Self> {
        Self::new(rows, cols, values.iter().map(|&v| v as f64).collect())
    }

    /// A field with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            values: vec![value; rows * cols],
        }
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Value at a cell, if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.values[row * self.cols + col])
    }

    /// Row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the field, returning its values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Swap rows and columns.
    ///
    /// Use for sources stored as `[lon][lat]`, so that rows become latitude.
    pub fn transposed(&self) -> Self {
        let mut values = Vec::with_capacity(self.values.len());
        for col in 0..self.cols {
            for row in 0..self.rows {
                values.push(self.values[row * self.cols + col]);
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            values,
        }
    }

    /// Reverse the row order, for sources stored north to south.
    pub fn flipped_rows(&self) -> Self {
        let values = self
            .values
            .chunks(self.cols.max(1))
            .rev()
            .flatten()
            .copied()
            .collect();
        Self {
            rows: self.rows,
            cols: self.cols,
            values,
        }
    }

    /// Cell-wise sum of several variables on the same grid.
    ///
    /// A cell that is NaN in any input is NaN in the result.
    pub fn sum(fields: &[Field]) -> Result<Field> {
        let first = fields
            .first()
            .ok_or_else(|| MaskError::invalid_field("no fields to sum"))?;

        let mut values = first.values.clone();
        for field in &fields[1..] {
            if field.shape() != first.shape() {
                return Err(MaskError::shape_mismatch(first.shape(), field.shape()));
            }
            for (acc, v) in values.iter_mut().zip(&field.values) {
                *acc += v;
            }
        }

        Ok(Self {
            rows: first.rows,
            cols: first.cols,
            values,
        })
    }
}

/// Reduces fields to the mean over the cells selected by a mask.
///
/// Missing cells add zero to the sum but still count in the divisor, so a
/// region with gaps reads lower than the mean of its valid cells.
#[derive(Debug, Clone)]
pub struct MaskedSpatialAggregator<'m> {
    mask: &'m InclusionMask,
    indices: Vec<usize>,
    missing: MissingValues,
    parallel: bool,
}

impl<'m> MaskedSpatialAggregator<'m> {
    /// Create an aggregator with NaN-only missing values.
    pub fn new(mask: &'m InclusionMask) -> Result<Self> {
        Self::with_config(mask, &MaskConfig::default())
    }

    /// Create an aggregator using the missing-value rules and parallelism
    /// setting from `config`.
    pub fn with_config(mask: &'m InclusionMask, config: &MaskConfig) -> Result<Self> {
        if mask.is_empty() {
            return Err(MaskError::EmptyMask);
        }

        Ok(Self {
            mask,
            indices: mask.iter_selected().collect(),
            missing: config.missing,
            parallel: config.parallel,
        })
    }

    /// Number of cells each mean is taken over.
    pub fn selected_count(&self) -> usize {
        self.indices.len()
    }

    /// Mean of `field` over the masked cells.
    pub fn reduce(&self, field: &Field) -> Result<f64> {
        if field.shape() != self.mask.shape() {
            return Err(MaskError::shape_mismatch(self.mask.shape(), field.shape()));
        }

        let values = field.values();
        let sum: f64 = self
            .indices
            .iter()
            .map(|&i| self.missing.contribution(values[i]))
            .sum();

        Ok(sum / self.indices.len() as f64)
    }

    /// Reduce every field, keeping input order.
    pub fn reduce_all(&self, fields: &[Field]) -> Result<Vec<f64>> {
        if self.parallel {
            fields.par_iter().map(|f| self.reduce(f)).collect()
        } else {
            fields.iter().map(|f| self.reduce(f)).collect()
        }
    }

    /// Pair each field's regional mean with its timestamp.
    pub fn aggregate(&self, timestamps: &[DateTime<Utc>], fields: &[Field]) -> Result<TimeSeries> {
        if timestamps.len() != fields.len() {
            return Err(MaskError::LengthMismatch {
                timestamps: timestamps.len(),
                fields: fields.len(),
            });
        }

        let values = self.reduce_all(fields)?;
        let series: TimeSeries = timestamps.iter().copied().zip(values).collect();

        debug!(parallel = self.parallel, "Reduced fields through mask");
        info!(
            steps = series.len(),
            cells = self.indices.len(),
            "Computed regional time series"
        );

        Ok(series)
    }
}

/// Regional mean time series with the default configuration.
pub fn aggregate(
    mask: &InclusionMask,
    timestamps: &[DateTime<Utc>],
    fields: &[Field],
) -> Result<TimeSeries> {
    MaskedSpatialAggregator::new(mask)?.aggregate(timestamps, fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_mask(rows: usize, cols: usize) -> InclusionMask {
        InclusionMask::from_cells(rows, cols, vec![1; rows * cols]).unwrap()
    }

    #[test]
    fn test_missing_counts_in_denominator() {
        let mask = full_mask(2, 2);
        let field = Field::new(2, 2, vec![2.0, f64::NAN, 4.0, 6.0]).unwrap();
        let agg = MaskedSpatialAggregator::new(&mask).unwrap();
        assert_eq!(agg.reduce(&field).unwrap(), 3.0);
    }

    #[test]
    fn test_only_selected_cells_contribute() {
        let mask = InclusionMask::from_cells(2, 2, vec![1, 0, 0, 1]).unwrap();
        let field = Field::new(2, 2, vec![1.0, 100.0, 100.0, 3.0]).unwrap();
        let agg = MaskedSpatialAggregator::new(&mask).unwrap();
        assert_eq!(agg.reduce(&field).unwrap(), 2.0);
    }

    #[test]
    fn test_fill_value_and_negatives() {
        let mask = full_mask(1, 4);
        let field = Field::new(1, 4, vec![-9999.0, -1.0, 4.0, 8.0]).unwrap();

        let mut config = MaskConfig::default();
        config.missing.fill_value = Some(-9999.0);
        let agg = MaskedSpatialAggregator::with_config(&mask, &config).unwrap();
        assert_eq!(agg.reduce(&field).unwrap(), 11.0 / 4.0);

        config.missing.negative_is_missing = true;
        let agg = MaskedSpatialAggregator::with_config(&mask, &config).unwrap();
        assert_eq!(agg.reduce(&field).unwrap(), 3.0);
    }

    #[test]
    fn test_empty_mask_rejected() {
        let mask = InclusionMask::new(3, 3);
        assert!(matches!(
            MaskedSpatialAggregator::new(&mask),
            Err(MaskError::EmptyMask)
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let mask = full_mask(2, 3);
        let agg = MaskedSpatialAggregator::new(&mask).unwrap();
        let err = agg.reduce(&Field::filled(3, 2, 1.0)).unwrap_err();
        match err {
            MaskError::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, (2, 3));
                assert_eq!(actual, (3, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_length_mismatch() {
        let mask = full_mask(1, 1);
        let result = aggregate(&mask, &[], &[Field::filled(1, 1, 1.0)]);
        assert!(matches!(
            result,
            Err(MaskError::LengthMismatch {
                timestamps: 0,
                fields: 1
            })
        ));
    }

    #[test]
    fn test_transposed_and_flipped() {
        // 2 rows x 3 cols
        let field = Field::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

        let t = field.transposed();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.values(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

        let f = field.flipped_rows();
        assert_eq!(f.values(), &[4.0, 5.0, 6.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sum_fields() {
        let a = Field::new(1, 3, vec![1.0, 2.0, f64::NAN]).unwrap();
        let b = Field::new(1, 3, vec![0.5, 0.5, 0.5]).unwrap();
        let total = Field::sum(&[a, b]).unwrap();

        assert_eq!(total.get(0, 0), Some(1.5));
        assert_eq!(total.get(0, 1), Some(2.5));
        assert!(total.get(0, 2).unwrap().is_nan());

        assert!(Field::sum(&[]).is_err());
        assert!(Field::sum(&[Field::filled(1, 2, 0.0), Field::filled(2, 1, 0.0)]).is_err());
    }

    #[test]
    fn test_field_length_checked() {
        assert!(matches!(
            Field::new(2, 2, vec![1.0; 3]),
            Err(MaskError::InvalidField(_))
        ));
        let f = Field::from_f32(1, 2, &[0.5, 1.5]).unwrap();
        assert_eq!(f.values(), &[0.5, 1.5]);
    }
}
