//! NetCDF I/O for gridded climate datasets.
//!
//! This module reads model-output and emission-inventory files into
//! [`Dataset`] values and writes processed datasets back out with
//! CF-style metadata.
//!
//! # Conventions
//!
//! - Fill values and `missing_value` sentinels become NaN on read;
//!   `scale_factor`/`add_offset` packing is applied.
//! - Coordinate names are tried in alternatives (`lon`/`longitude`, ...),
//!   so both inventory and CESM-style files load without per-file glue.
//! - Monthly time axes are decoded from `days since Y-M-D` units with the
//!   file's `calendar` attribute (`noleap` or standard).
//! - Written files carry a history stamp and `Conventions = CF-1.8`.
//!
//! # Example
//!
//! ```rust,ignore
//! use clpost_rs::io::{read_dataset, write_dataset, NetCDFWriterConfig};
//!
//! let ds = read_dataset("merge_fin.nc")?;
//! let config = NetCDFWriterConfig::new("column_fin.nc")
//!     .with_title("Column concentrations, S1");
//! write_dataset(&config, &column)?;
//! ```

#[cfg(feature = "netcdf")]
use std::path::Path;

#[cfg(feature = "netcdf")]
use chrono::Utc;
#[cfg(feature = "netcdf")]
use log::warn;
use thiserror::Error;

use crate::grid::GridError;
#[cfg(feature = "netcdf")]
use crate::grid::{Dataset, DimKind, Field, LatLonGrid};
#[cfg(feature = "netcdf")]
use crate::types::{Calendar, YearMonth};

/// Error type for NetCDF operations.
#[derive(Debug, Error)]
pub enum NetCDFError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF library error
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Invalid data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Missing variable
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Grid or field inconsistency while decoding
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// Feature not enabled
    #[error("NetCDF feature not enabled")]
    FeatureDisabled,
}

/// Fill value for missing data (CF-conventions standard).
pub const FILL_VALUE_F64: f64 = 9.96920996838687e+36;
pub const FILL_VALUE_F32: f32 = 9.96921e+36;

/// Check if a value is valid (not a fill value).
#[inline]
pub fn is_valid_f32(v: f32) -> bool {
    v.is_finite() && v.abs() < 1.0e+30
}

/// Check if a value is valid (not a fill value).
#[inline]
pub fn is_valid_f64(v: f64) -> bool {
    v.is_finite() && v.abs() < 1.0e+30
}

/// Coordinate name alternatives tried in order.
#[cfg(feature = "netcdf")]
const LON_NAMES: [&str; 2] = ["lon", "longitude"];
#[cfg(feature = "netcdf")]
const LAT_NAMES: [&str; 2] = ["lat", "latitude"];

// ============================================================================
// Writer configuration
// ============================================================================

/// Configuration for NetCDF output.
#[derive(Debug, Clone)]
pub struct NetCDFWriterConfig {
    /// Output file path
    pub path: String,
    /// Title attribute (CF-conventions)
    pub title: Option<String>,
    /// Institution attribute
    pub institution: Option<String>,
    /// Source attribute (tool name/version)
    pub source: Option<String>,
    /// Extra history line prepended to the creation stamp
    pub history: Option<String>,
    /// Comment attribute
    pub comment: Option<String>,
}

impl NetCDFWriterConfig {
    /// Create a new configuration with the given output path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: None,
            institution: None,
            source: Some("clpost-rs".to_string()),
            history: None,
            comment: None,
        }
    }

    /// Set the title attribute.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the institution attribute.
    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    /// Set the source attribute.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set an extra history line.
    pub fn with_history(mut self, history: impl Into<String>) -> Self {
        self.history = Some(history.into());
        self
    }

    /// Set the comment attribute.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Read every decodable variable from a file.
///
/// Variables with dimensions other than time/lev/lat/lon (interface
/// levels, bounds helpers) are skipped with a warning.
#[cfg(feature = "netcdf")]
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset, NetCDFError> {
    read_dataset_impl(path.as_ref(), None)
}

/// Read only the named variables (plus coordinates) from a file.
///
/// Errors when any requested variable is absent.
#[cfg(feature = "netcdf")]
pub fn read_dataset_vars(
    path: impl AsRef<Path>,
    names: &[&str],
) -> Result<Dataset, NetCDFError> {
    read_dataset_impl(path.as_ref(), Some(names))
}

#[cfg(feature = "netcdf")]
fn read_dataset_impl(path: &Path, names: Option<&[&str]>) -> Result<Dataset, NetCDFError> {
    let file = netcdf::open(path)?;

    let lon = read_coord(&file, &LON_NAMES)?;
    let lat = read_coord(&file, &LAT_NAMES)?;
    let grid = LatLonGrid::new(lon, lat)?;

    let mut ds = Dataset::new(grid);

    if file.variable("time").is_some() {
        ds.time = read_time_axis(&file)?;
    }
    if let Some(var) = file.variable("lev") {
        ds.lev = var.get_values(..)?;
        ds.lev_bounds = read_lev_bounds(&file, ds.lev.len())?;
    }

    let coord_names = ["time", "lev", "lev_bnds", "ilev", "lon", "longitude", "lat", "latitude"];
    match names {
        Some(requested) => {
            for name in requested {
                let var = file
                    .variable(name)
                    .ok_or_else(|| NetCDFError::MissingVariable(name.to_string()))?;
                let field = read_field(&var)?;
                ds.push_field(field)?;
            }
        }
        None => {
            for var in file.variables() {
                let name = var.name();
                if coord_names.contains(&name.as_str()) {
                    continue;
                }
                match read_field(&var) {
                    Ok(field) => ds.push_field(field)?,
                    Err(NetCDFError::InvalidData(reason)) => {
                        warn!("skipping '{}': {}", name, reason);
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok(ds)
}

/// Read a coordinate variable, trying name alternatives in order.
#[cfg(feature = "netcdf")]
fn read_coord(file: &netcdf::File, names: &[&str]) -> Result<Vec<f64>, NetCDFError> {
    for name in names {
        if let Some(var) = file.variable(name) {
            let data: Vec<f64> = var.get_values(..)?;
            return Ok(data);
        }
    }
    Err(NetCDFError::MissingVariable(names.join(" or ")))
}

/// Decode the time axis from `days since Y-M-D` units and the calendar
/// attribute.
#[cfg(feature = "netcdf")]
fn read_time_axis(file: &netcdf::File) -> Result<Vec<YearMonth>, NetCDFError> {
    let var = file
        .variable("time")
        .ok_or_else(|| NetCDFError::MissingVariable("time".to_string()))?;
    let values: Vec<f64> = var.get_values(..)?;

    let units = get_attr_str(&var, "units")
        .ok_or_else(|| NetCDFError::InvalidData("time has no units attribute".to_string()))?;
    let origin = parse_time_origin(&units)?;
    let calendar = get_attr_str(&var, "calendar")
        .map(|s| Calendar::from_attribute(&s))
        .unwrap_or(Calendar::Standard);

    Ok(values
        .iter()
        .map(|&d| calendar.decode_days(origin, d))
        .collect())
}

/// Parse a `days since Y-M-D[...]` units string into its origin date.
#[cfg(feature = "netcdf")]
fn parse_time_origin(units: &str) -> Result<(i32, u32, u32), NetCDFError> {
    let rest = units
        .strip_prefix("days since ")
        .ok_or_else(|| {
            NetCDFError::InvalidData(format!("unsupported time units '{}'", units))
        })?;
    let date = rest.split_whitespace().next().unwrap_or(rest);
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() < 3 {
        return Err(NetCDFError::InvalidData(format!(
            "cannot parse time origin from '{}'",
            units
        )));
    }
    let parse = |s: &str| {
        s.parse::<i64>()
            .map_err(|_| NetCDFError::InvalidData(format!("bad time origin in '{}'", units)))
    };
    Ok((parse(parts[0])? as i32, parse(parts[1])? as u32, parse(parts[2])? as u32))
}

/// Read `lev_bnds` as `(lower, upper)` pairs per level, when present.
#[cfg(feature = "netcdf")]
fn read_lev_bounds(
    file: &netcdf::File,
    n_lev: usize,
) -> Result<Option<Vec<(f64, f64)>>, NetCDFError> {
    let Some(var) = file.variable("lev_bnds") else {
        return Ok(None);
    };
    let flat: Vec<f64> = var.get_values(..)?;
    if flat.len() != 2 * n_lev {
        return Err(NetCDFError::InvalidData(format!(
            "lev_bnds has {} values for {} levels",
            flat.len(),
            n_lev
        )));
    }
    Ok(Some(
        flat.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect(),
    ))
}

/// Decode one variable into a field, mapping fill values to NaN.
#[cfg(feature = "netcdf")]
fn read_field(var: &netcdf::Variable) -> Result<Field, NetCDFError> {
    let mut dims = Vec::new();
    let mut shape = Vec::new();
    for dim in var.dimensions() {
        let kind = match dim.name().as_str() {
            "time" => DimKind::Time,
            "lev" => DimKind::Lev,
            "lat" | "latitude" => DimKind::Lat,
            "lon" | "longitude" => DimKind::Lon,
            other => {
                return Err(NetCDFError::InvalidData(format!(
                    "unsupported dimension '{}'",
                    other
                )));
            }
        };
        dims.push(kind);
        shape.push(dim.len());
    }
    if dims.is_empty() {
        return Err(NetCDFError::InvalidData("scalar variable".to_string()));
    }

    let scale = get_attr_f64(var, "scale_factor").unwrap_or(1.0);
    let offset = get_attr_f64(var, "add_offset").unwrap_or(0.0);
    let fill = get_attr_f64(var, "_FillValue")
        .or_else(|| get_attr_f64(var, "missing_value"));

    let raw: Vec<f64> = var.get_values(..)?;
    let data: Vec<f64> = raw
        .iter()
        .map(|&v| {
            let missing = fill.map(|f| v == f).unwrap_or(false);
            if missing || !is_valid_f64(v) {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect();

    let units = get_attr_str(var, "units").unwrap_or_default();
    let mut field = Field::new(var.name(), units, dims, shape, data)?;
    if let Some(long_name) = get_attr_str(var, "long_name") {
        field = field.with_long_name(long_name);
    }
    Ok(field)
}

/// Get f64 attribute value.
#[cfg(feature = "netcdf")]
fn get_attr_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Double(d) => Some(d),
            netcdf::AttributeValue::Float(f) => Some(f as f64),
            netcdf::AttributeValue::Int(i) => Some(i as f64),
            netcdf::AttributeValue::Short(s) => Some(s as f64),
            _ => None,
        })
}

/// Get string attribute value.
#[cfg(feature = "netcdf")]
fn get_attr_str(var: &netcdf::Variable, name: &str) -> Option<String> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Str(s) => Some(s),
            _ => None,
        })
}

// ============================================================================
// Writer
// ============================================================================

/// Write a dataset to a new NetCDF file.
///
/// Axes present in the dataset become coordinate variables; the time axis
/// is encoded as `days since` the first month on the noleap calendar, so
/// a written file reads back to the same [`Dataset`]. NaN values are
/// stored as [`FILL_VALUE_F64`].
#[cfg(feature = "netcdf")]
pub fn write_dataset(config: &NetCDFWriterConfig, ds: &Dataset) -> Result<(), NetCDFError> {
    let mut file = netcdf::create(&config.path)?;

    file.add_dimension("lat", ds.grid.n_lat())?;
    file.add_dimension("lon", ds.grid.n_lon())?;
    if !ds.time.is_empty() {
        file.add_unlimited_dimension("time")?;
    }
    if !ds.lev.is_empty() {
        file.add_dimension("lev", ds.lev.len())?;
    }
    if ds.lev_bounds.is_some() {
        file.add_dimension("bnds", 2)?;
    }

    {
        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put_attribute("standard_name", "latitude")?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_values(ds.grid.lat(), ..)?;
    }
    {
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put_attribute("standard_name", "longitude")?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_values(ds.grid.lon(), ..)?;
    }

    if let Some(first) = ds.time.first() {
        let units = format!("days since {:04}-{:02}-01 00:00:00", first.year, first.month);
        let days: Vec<f64> = ds
            .time
            .iter()
            .map(|ym| noleap_days_between(*first, *ym))
            .collect();
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("standard_name", "time")?;
        time_var.put_attribute("units", units.as_str())?;
        time_var.put_attribute("calendar", "noleap")?;
        time_var.put_values(&days, ..)?;
    }

    if !ds.lev.is_empty() {
        let mut lev_var = file.add_variable::<f64>("lev", &["lev"])?;
        lev_var.put_attribute("standard_name", "air_pressure")?;
        lev_var.put_attribute("units", "hPa")?;
        lev_var.put_attribute("positive", "down")?;
        lev_var.put_values(&ds.lev, ..)?;
    }
    if let Some(bounds) = &ds.lev_bounds {
        let flat: Vec<f64> = bounds.iter().flat_map(|&(a, b)| [a, b]).collect();
        let mut bnds_var = file.add_variable::<f64>("lev_bnds", &["lev", "bnds"])?;
        bnds_var.put_attribute("units", "hPa")?;
        bnds_var.put_values(&flat, ..)?;
    }

    for field in ds.fields() {
        let dim_names: Vec<&str> = field.dims().iter().map(|d| d.name()).collect();
        let mut var = file.add_variable::<f64>(&field.name, &dim_names)?;
        var.put_attribute("_FillValue", FILL_VALUE_F64)?;
        if !field.units.is_empty() {
            var.put_attribute("units", field.units.as_str())?;
        }
        if let Some(long_name) = &field.long_name {
            var.put_attribute("long_name", long_name.as_str())?;
        }
        let data: Vec<f64> = field
            .values()
            .iter()
            .map(|&v| if v.is_nan() { FILL_VALUE_F64 } else { v })
            .collect();
        var.put_values(&data, ..)?;
    }

    file.add_attribute("Conventions", "CF-1.8")?;
    if let Some(title) = &config.title {
        file.add_attribute("title", title.as_str())?;
    }
    if let Some(institution) = &config.institution {
        file.add_attribute("institution", institution.as_str())?;
    }
    if let Some(source) = &config.source {
        file.add_attribute("source", source.as_str())?;
    }
    if let Some(comment) = &config.comment {
        file.add_attribute("comment", comment.as_str())?;
    }

    let stamp = format!(
        "{}: Created by clpost-rs",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    let history = match &config.history {
        Some(extra) => format!("{}; {}", stamp, extra),
        None => stamp,
    };
    file.add_attribute("history", history.as_str())?;

    Ok(())
}

/// Whole days from the first of `from` to the first of `to` on the
/// noleap calendar.
#[cfg(feature = "netcdf")]
fn noleap_days_between(from: YearMonth, to: YearMonth) -> f64 {
    let mut days: i64 = i64::from(to.year - from.year) * 365;
    let month_start = |m: u32| -> i64 {
        crate::types::DAYS_PER_MONTH[..(m - 1) as usize]
            .iter()
            .map(|&d| i64::from(d))
            .sum()
    };
    days += month_start(to.month) - month_start(from.month);
    days as f64
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_value_check() {
        assert!(is_valid_f64(10.0));
        assert!(is_valid_f64(-5.0));
        assert!(!is_valid_f64(f64::NAN));
        assert!(!is_valid_f64(f64::INFINITY));
        assert!(!is_valid_f64(FILL_VALUE_F64));
        assert!(!is_valid_f64(1.0e31));
    }

    #[test]
    fn test_writer_config() {
        let config = NetCDFWriterConfig::new("out.nc")
            .with_title("Masked HCl inventory")
            .with_history("country mask applied");
        assert_eq!(config.path, "out.nc");
        assert_eq!(config.title, Some("Masked HCl inventory".to_string()));
        assert_eq!(config.source, Some("clpost-rs".to_string()));
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_time_origin_parsing() {
        assert_eq!(
            parse_time_origin("days since 2015-01-01 00:00:00").unwrap(),
            (2015, 1, 1)
        );
        assert_eq!(parse_time_origin("days since 0001-01-01").unwrap(), (1, 1, 1));
        assert!(parse_time_origin("hours since 2015-01-01").is_err());
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_noleap_days_between() {
        let a = YearMonth::new(2015, 1);
        assert_eq!(noleap_days_between(a, YearMonth::new(2015, 1)), 0.0);
        assert_eq!(noleap_days_between(a, YearMonth::new(2015, 2)), 31.0);
        assert_eq!(noleap_days_between(a, YearMonth::new(2016, 1)), 365.0);
        assert_eq!(noleap_days_between(YearMonth::new(2015, 3), a), -59.0);
    }
}
