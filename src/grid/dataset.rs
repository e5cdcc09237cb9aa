//! In-memory datasets: coordinate axes plus a set of fields.

use std::fmt;

use crate::grid::{DimKind, Field, GridError, LatLonGrid};
use crate::types::{GeoBounds, YearMonth};

/// A decoded dataset: time/level axes, the horizontal grid, and fields.
///
/// Mirrors the shape of one NetCDF file after decoding: every field's
/// dimensions are validated against the axes when it is added, so
/// downstream arithmetic can rely on consistent shapes.
#[derive(Clone, Debug)]
pub struct Dataset {
    /// Monthly time axis (empty for static datasets).
    pub time: Vec<YearMonth>,
    /// Vertical level midpoints in hPa (empty for surface-only datasets).
    pub lev: Vec<f64>,
    /// Vertical level bounds in hPa, when the file carries them.
    pub lev_bounds: Option<Vec<(f64, f64)>>,
    /// Horizontal grid.
    pub grid: LatLonGrid,
    fields: Vec<Field>,
}

impl Dataset {
    /// Create an empty dataset over a grid.
    pub fn new(grid: LatLonGrid) -> Self {
        Self {
            time: Vec::new(),
            lev: Vec::new(),
            lev_bounds: None,
            grid,
            fields: Vec::new(),
        }
    }

    /// Set the time axis (builder style).
    pub fn with_time(mut self, time: Vec<YearMonth>) -> Self {
        self.time = time;
        self
    }

    /// Set the vertical axis (builder style).
    pub fn with_levels(mut self, lev: Vec<f64>, bounds: Option<Vec<(f64, f64)>>) -> Self {
        self.lev = lev;
        self.lev_bounds = bounds;
        self
    }

    /// Add a field after validating its dimensions against the axes.
    pub fn push_field(&mut self, field: Field) -> Result<(), GridError> {
        for (dim, &len) in field.dims().iter().zip(field.shape()) {
            let expected = match dim {
                DimKind::Time => self.time.len(),
                DimKind::Lev => self.lev.len(),
                DimKind::Lat => self.grid.n_lat(),
                DimKind::Lon => self.grid.n_lon(),
            };
            if len != expected {
                return Err(GridError::AxisMismatch {
                    name: field.name.clone(),
                    dim: *dim,
                    expected,
                    got: len,
                });
            }
        }
        self.fields.push(field);
        Ok(())
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by name, erroring when absent.
    pub fn expect_field(&self, name: &str) -> Result<&Field, GridError> {
        self.field(name)
            .ok_or_else(|| GridError::MissingVariable(name.to_string()))
    }

    /// Remove and return a field by name.
    pub fn remove_field(&mut self, name: &str) -> Option<Field> {
        let pos = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(pos))
    }

    /// Consume the dataset, returning its fields.
    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    /// Keep only the named fields, erroring on the first missing name.
    pub fn select_vars(&self, names: &[&str]) -> Result<Dataset, GridError> {
        let mut out = Dataset {
            time: self.time.clone(),
            lev: self.lev.clone(),
            lev_bounds: self.lev_bounds.clone(),
            grid: self.grid.clone(),
            fields: Vec::with_capacity(names.len()),
        };
        for name in names {
            out.fields.push(self.expect_field(name)?.clone());
        }
        Ok(out)
    }

    /// Crop the dataset to a bounding box.
    ///
    /// Fields without horizontal dimensions pass through unchanged.
    pub fn crop(&self, bounds: &GeoBounds) -> Result<Dataset, GridError> {
        let window = self.grid.window(bounds)?;
        let mut out = Dataset {
            time: self.time.clone(),
            lev: self.lev.clone(),
            lev_bounds: self.lev_bounds.clone(),
            grid: self.grid.subgrid(&window),
            fields: Vec::with_capacity(self.fields.len()),
        };
        for field in &self.fields {
            if field.is_horizontal() {
                out.fields.push(field.crop(&window)?);
            } else {
                out.fields.push(field.clone());
            }
        }
        Ok(out)
    }

    /// Concatenate datasets along the time axis.
    ///
    /// All parts must share the grid and vertical axis and carry the same
    /// fields; the combined time axis must be strictly increasing. Fields
    /// without a time dimension are taken from the first part.
    pub fn concat_time(parts: Vec<Dataset>) -> Result<Dataset, GridError> {
        let mut iter = parts.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| GridError::ConcatMismatch("no datasets to concatenate".into()))?;
        let mut out = first.clone();

        for (part_no, part) in iter.enumerate() {
            if !part.grid.approx_eq(&out.grid, 1e-6) {
                return Err(GridError::ConcatMismatch(format!(
                    "part {} is on a different grid",
                    part_no + 1
                )));
            }
            if part.lev != out.lev {
                return Err(GridError::ConcatMismatch(format!(
                    "part {} has a different vertical axis",
                    part_no + 1
                )));
            }
            if let (Some(last), Some(next)) = (out.time.last(), part.time.first()) {
                if next <= last {
                    return Err(GridError::ConcatMismatch(format!(
                        "time axis not increasing across parts ({} then {})",
                        last, next
                    )));
                }
            }

            for field in &mut out.fields {
                if !field.has_dim(DimKind::Time) {
                    continue;
                }
                let other = part
                    .field(&field.name)
                    .ok_or_else(|| GridError::MissingVariable(field.name.clone()))?;
                if field.dims() != other.dims() {
                    return Err(GridError::ConcatMismatch(format!(
                        "dimensions of '{}' differ between parts",
                        field.name
                    )));
                }
                let mut shape = field.shape().to_vec();
                shape[0] += other.shape()[0];
                let mut data = field.values().to_vec();
                data.extend_from_slice(other.values());
                let mut merged =
                    Field::new(&field.name, &field.units, field.dims().to_vec(), shape, data)?;
                merged.long_name = field.long_name.clone();
                *field = merged;
            }
            out.time.extend_from_slice(&part.time);
        }
        Ok(out)
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        let time = match (self.time.first(), self.time.last()) {
            (Some(a), Some(b)) => format!("{} times [{}..{}]", self.time.len(), a, b),
            _ => "no time axis".to_string(),
        };
        format!(
            "{}, {} levels, {}, {} variables",
            time,
            self.lev.len(),
            self.grid,
            self.fields.len()
        )
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
