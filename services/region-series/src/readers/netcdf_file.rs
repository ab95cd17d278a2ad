//! NetCDF-4 / HDF5 inputs using the native netcdf library.
//!
//! Handles the layouts the supported models write:
//!
//! - 1-D `lon`/`lat` axes with data `[time][lat][lon]` (CF, NLDAS), latitude
//!   either ascending or descending;
//! - 1-D axes with data `[time][lon][lat]` (GPM IMERG, `layout: lon_lat`),
//!   variables addressed through their HDF5 group as `Grid/precipitation`;
//! - 2-D `XLONG`/`XLAT` with data `[Time][south_north][west_east]` (WRF),
//!   mapped onto a regular grid by quantizing the native coordinates.
//!
//! `_FillValue` and `missing_value` cells become NaN; `scale_factor` and
//! `add_offset` are applied.

use std::fs;
use std::path::{Path, PathBuf};

use ::netcdf::types::{FloatType, IntType, NcTypeDescriptor, NcVariableType};
use anyhow::{Context, Result};
use grid_mask::{native_grid, CoordinateQuantizer, Field, GridSpec};
use region_common::grid::{axis_order, AxisOrder};
use region_common::time::{timestamp_from_filename, CfTimeUnits};
use tracing::debug;

use super::GriddedSeries;
use crate::config::{InputConfig, Layout, TimeSource};

/// Values and metadata of one variable.
struct VariableData {
    values: Vec<f64>,
    shape: Vec<usize>,
    units: Option<String>,
}

/// How stored 2-D slices map onto the south-to-north grid.
#[derive(Debug, Clone, Copy)]
struct Orientation {
    rows: usize,
    cols: usize,
    transpose: bool,
    flip_rows: bool,
}

/// Read all time steps of one NetCDF/HDF5 file.
pub fn read_netcdf(
    path: &Path,
    input: &InputConfig,
    quantizer: &CoordinateQuantizer,
) -> Result<GriddedSeries> {
    let file =
        ::netcdf::open(path).with_context(|| format!("Failed to open NetCDF file {:?}", path))?;

    let lon = read_variable(&file, &input.lon)?;
    let lat = read_variable(&file, &input.lat)?;
    let (grid, orientation) = build_grid(&lon, &lat, input.layout, quantizer)?;

    let mut per_variable = Vec::with_capacity(input.variables.len());
    for name in &input.variables {
        let data = read_variable(&file, name)?;
        let steps = split_steps(&data, orientation).with_context(|| format!("Variable {}", name))?;
        per_variable.push(steps);
    }

    let steps = per_variable.first().map(Vec::len).unwrap_or(0);
    anyhow::ensure!(
        per_variable.iter().all(|v| v.len() == steps),
        "Variables in {:?} have different numbers of time steps",
        path
    );

    let mut fields = Vec::with_capacity(steps);
    for t in 0..steps {
        let parts: Vec<Field> = per_variable.iter().map(|v| v[t].clone()).collect();
        fields.push(Field::sum(&parts)?);
    }

    let timestamps = match &input.time {
        TimeSource::Filename { pattern } => {
            anyhow::ensure!(
                steps == 1,
                "{:?} holds {} time steps; a filename gives only one timestamp",
                path,
                steps
            );
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid file name {:?}", path))?;
            vec![timestamp_from_filename(name, pattern)?]
        }
        TimeSource::Variable { name } => {
            let time = read_variable(&file, name)?;
            let units = time
                .units
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Time variable {} has no units", name))?;
            let units = CfTimeUnits::parse(units)?;
            let stamps = time
                .values
                .iter()
                .map(|&offset| units.to_datetime(offset))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            anyhow::ensure!(
                stamps.len() == steps,
                "Time variable {} has {} values for {} time steps",
                name,
                stamps.len(),
                steps
            );
            stamps
        }
    };

    debug!(
        path = %path.display(),
        rows = grid.rows,
        cols = grid.cols,
        steps,
        "Read NetCDF input"
    );

    Ok(GriddedSeries {
        grid,
        timestamps,
        fields,
    })
}

/// Replace missing values with zero in every floating-point variable of a
/// file, in place.
///
/// NaN and cells equal to the variable's `_FillValue` or `missing_value` are
/// missing. Returns the number of values replaced.
pub fn replace_nan_with_zero(path: &Path) -> Result<usize> {
    let mut file = ::netcdf::append(path)
        .with_context(|| format!("Failed to open NetCDF file {:?} for writing", path))?;

    let names: Vec<String> = file.variables().map(|v| v.name()).collect();
    let mut replaced = 0usize;

    for name in names {
        let (values, fills) = match file.variable(&name) {
            Some(var) if matches!(var.vartype(), NcVariableType::Float(_)) => {
                let values: Vec<f64> = var
                    .get_values(..)
                    .with_context(|| format!("Failed to read {} in {:?}", name, path))?;
                let fills: Vec<f64> = ["_FillValue", "missing_value"]
                    .iter()
                    .filter_map(|attr| get_f64_attr(&var, attr))
                    .collect();
                (values, fills)
            }
            _ => continue,
        };

        let is_missing = |v: f64| v.is_nan() || fills.contains(&v);
        let count = values.iter().filter(|&&v| is_missing(v)).count();
        if count == 0 {
            continue;
        }

        let cleaned: Vec<f64> = values
            .into_iter()
            .map(|v| if is_missing(v) { 0.0 } else { v })
            .collect();

        let mut var = file
            .variable_mut(&name)
            .ok_or_else(|| anyhow::anyhow!("Variable {} disappeared", name))?;
        var.put_values(&cleaned, ..)
            .with_context(|| format!("Failed to write {} in {:?}", name, path))?;

        debug!(variable = %name, replaced = count, "Replaced missing values");
        replaced += count;
    }

    Ok(replaced)
}

/// Rewrite a file without `variable`, in place.
///
/// NetCDF cannot delete a variable, so the root group's attributes,
/// dimensions and remaining variables are copied to `<file>.tmp`, which then
/// replaces the original. Unlimited dimensions are written with their current
/// length; files with subgroups are rejected.
pub fn drop_variable(path: &Path, variable: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Err(err) = copy_without(path, &tmp, variable) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {:?} with {:?}", path, tmp))?;
    debug!(path = %path.display(), variable, "Dropped variable");
    Ok(())
}

fn copy_without(src_path: &Path, dst_path: &Path, excluded: &str) -> Result<()> {
    let src = ::netcdf::open(src_path)
        .with_context(|| format!("Failed to open NetCDF file {:?}", src_path))?;
    anyhow::ensure!(
        src.variable(excluded).is_some(),
        "Variable {} not found in {:?}",
        excluded,
        src_path
    );
    anyhow::ensure!(
        src.groups()?.next().is_none(),
        "{:?} has groups; only flat files can be rewritten",
        src_path
    );

    let mut dst = ::netcdf::create(dst_path)
        .with_context(|| format!("Failed to create {:?}", dst_path))?;

    for attr in src.attributes() {
        dst.add_attribute(attr.name(), attr.value()?)?;
    }
    for dim in src.dimensions() {
        dst.add_dimension(&dim.name(), dim.len())?;
    }

    for var in src.variables() {
        let name = var.name();
        if name == excluded {
            continue;
        }
        match var.vartype() {
            NcVariableType::Float(FloatType::F32) => copy_variable::<f32>(&var, &mut dst)?,
            NcVariableType::Float(FloatType::F64) => copy_variable::<f64>(&var, &mut dst)?,
            NcVariableType::Int(IntType::I8) => copy_variable::<i8>(&var, &mut dst)?,
            NcVariableType::Int(IntType::U8) => copy_variable::<u8>(&var, &mut dst)?,
            NcVariableType::Int(IntType::I16) => copy_variable::<i16>(&var, &mut dst)?,
            NcVariableType::Int(IntType::U16) => copy_variable::<u16>(&var, &mut dst)?,
            NcVariableType::Int(IntType::I32) => copy_variable::<i32>(&var, &mut dst)?,
            NcVariableType::Int(IntType::U32) => copy_variable::<u32>(&var, &mut dst)?,
            NcVariableType::Int(IntType::I64) => copy_variable::<i64>(&var, &mut dst)?,
            NcVariableType::Int(IntType::U64) => copy_variable::<u64>(&var, &mut dst)?,
            other => anyhow::bail!("Cannot copy variable {} of type {:?}", name, other),
        }
    }

    Ok(())
}

fn copy_variable<T>(src: &::netcdf::Variable, dst: &mut ::netcdf::FileMut) -> Result<()>
where
    T: NcTypeDescriptor + Copy,
{
    let name = src.name();
    let dims: Vec<String> = src.dimensions().iter().map(|d| d.name()).collect();
    let dims: Vec<&str> = dims.iter().map(String::as_str).collect();
    let values: Vec<T> = src
        .get_values(..)
        .with_context(|| format!("Failed to read {}", name))?;

    let mut var = dst.add_variable::<T>(&name, &dims)?;
    for attr in src.attributes() {
        var.put_attribute(attr.name(), attr.value()?)?;
    }
    var.put_values(&values, ..)
        .with_context(|| format!("Failed to write {}", name))?;
    Ok(())
}

fn read_variable(file: &::netcdf::File, path: &str) -> Result<VariableData> {
    match path.rsplit_once('/') {
        Some((group_path, name)) => {
            let group = file
                .group(group_path)
                .with_context(|| format!("Failed to open group {}", group_path))?
                .ok_or_else(|| anyhow::anyhow!("Group {} not found", group_path))?;
            let var = group
                .variable(name)
                .ok_or_else(|| anyhow::anyhow!("Variable {} not found", path))?;
            variable_data(&var, path)
        }
        None => {
            let var = file
                .variable(path)
                .ok_or_else(|| anyhow::anyhow!("Variable {} not found", path))?;
            variable_data(&var, path)
        }
    }
}

fn variable_data(var: &::netcdf::Variable, name: &str) -> Result<VariableData> {
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

    let raw: Vec<f64> = var
        .get_values(..)
        .with_context(|| format!("Failed to read {}", name))?;

    let fill = get_f64_attr(var, "_FillValue").or_else(|| get_f64_attr(var, "missing_value"));
    let scale = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
    let offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);

    let values = raw
        .into_iter()
        .map(|v| match fill {
            Some(fill) if v == fill => f64::NAN,
            _ => v * scale + offset,
        })
        .collect();

    Ok(VariableData {
        values,
        shape,
        units: get_string_attr(var, "units"),
    })
}

fn build_grid(
    lon: &VariableData,
    lat: &VariableData,
    layout: Layout,
    quantizer: &CoordinateQuantizer,
) -> Result<(GridSpec, Orientation)> {
    if lon.shape.len() == 1 && lat.shape.len() == 1 {
        anyhow::ensure!(
            axis_order(&lon.values)? == AxisOrder::Ascending,
            "Descending longitude axes are not supported"
        );
        let flip_rows = axis_order(&lat.values)? == AxisOrder::Descending;
        let grid = GridSpec::from_axes(&lon.values, &lat.values, quantizer.cell_size())?;

        let orientation = Orientation {
            rows: grid.rows,
            cols: grid.cols,
            transpose: layout == Layout::LonLat,
            flip_rows,
        };
        return Ok((grid, orientation));
    }

    // 2-D coordinates, possibly with a leading time axis: use the first slice.
    anyhow::ensure!(
        lon.shape.len() >= 2 && lon.shape == lat.shape,
        "Coordinate variables must both be 1-D axes or share a 2-D shape"
    );
    let (a, b) = last_two(&lon.shape);
    let mut lon2d = Field::new(a, b, lon.values[..a * b].to_vec())?;
    let mut lat2d = Field::new(a, b, lat.values[..a * b].to_vec())?;
    if layout == Layout::LonLat {
        lon2d = lon2d.transposed();
        lat2d = lat2d.transposed();
    }

    let (rows, cols) = lon2d.shape();
    let grid = native_grid(lon2d.values(), lat2d.values(), rows, cols, quantizer)?;
    let orientation = Orientation {
        rows,
        cols,
        transpose: layout == Layout::LonLat,
        flip_rows: false,
    };
    Ok((grid, orientation))
}

/// Split a variable into one oriented field per leading index.
fn split_steps(data: &VariableData, orientation: Orientation) -> Result<Vec<Field>> {
    anyhow::ensure!(data.shape.len() >= 2, "Expected at least 2 dimensions");

    let (a, b) = last_two(&data.shape);
    let expected = if orientation.transpose {
        (orientation.cols, orientation.rows)
    } else {
        (orientation.rows, orientation.cols)
    };
    anyhow::ensure!(
        (a, b) == expected,
        "Stored shape {:?} does not match grid {:?}",
        (a, b),
        expected
    );

    data.values
        .chunks(a * b)
        .map(|chunk| {
            let mut field = Field::new(a, b, chunk.to_vec())?;
            if orientation.transpose {
                field = field.transposed();
            }
            if orientation.flip_rows {
                field = field.flipped_rows();
            }
            Ok(field)
        })
        .collect()
}

fn last_two(shape: &[usize]) -> (usize, usize) {
    let n = shape.len();
    (shape[n - 2], shape[n - 1])
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &::netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &::netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

fn get_string_attr(var: &::netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        ::netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
