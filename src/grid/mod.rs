//! Gridded data core: lat/lon grids, fields, datasets, regridding.
//!
//! The central invariant is alignment: arithmetic between two fields
//! requires identical dimensions and shapes, and two datasets must share
//! their grid (within 1e-6 degrees) before being combined. Callers
//! conform mismatched grids first via [`regrid_nearest`].
//!
//! # Example
//!
//! ```
//! use clpost_rs::grid::{DimKind, Field, LatLonGrid};
//!
//! let grid = LatLonGrid::aceic();
//! let areas = grid.cell_areas();
//! assert_eq!(areas.len(), grid.n_cells());
//!
//! let field = Field::new(
//!     "HCl_total",
//!     "kg m-2 s-1",
//!     vec![DimKind::Lat, DimKind::Lon],
//!     vec![grid.n_lat(), grid.n_lon()],
//!     vec![0.0; grid.n_cells()],
//! )
//! .unwrap();
//! assert!(field.is_horizontal());
//! ```

mod dataset;
mod field;
mod latlon;
mod regrid;

use thiserror::Error;

pub use dataset::Dataset;
pub use field::{DimKind, Field};
pub use latlon::{GridWindow, LatLonGrid, EARTH_RADIUS_M};
pub use regrid::{regrid_dataset_nearest, regrid_nearest};

/// Errors from grid and field operations.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("axis '{axis}' has {len} points, need at least 2")]
    AxisTooShort { axis: &'static str, len: usize },

    #[error("axis '{axis}' is not strictly ascending at index {index}")]
    NonMonotonicAxis { axis: &'static str, index: usize },

    #[error("no {axis} centers inside [{min}, {max}]")]
    EmptyWindow {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    #[error("invalid dimensions for '{name}': {reason}")]
    BadDims { name: String, reason: String },

    #[error("'{name}' has {got} values but its shape needs {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("'{name}' has no {dim} dimension")]
    MissingDim { name: String, dim: DimKind },

    #[error("fields are not aligned: {left} vs {right}")]
    FieldMismatch { left: String, right: String },

    #[error("'{name}' {dim} length {got} does not match the dataset axis ({expected})")]
    AxisMismatch {
        name: String,
        dim: DimKind,
        expected: usize,
        got: usize,
    },

    #[error("dataset has no variable '{0}'")]
    MissingVariable(String),

    #[error("cannot concatenate datasets: {0}")]
    ConcatMismatch(String),

    #[error("grid mismatch: {0}")]
    GridMismatch(String),
}
