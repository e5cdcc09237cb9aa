//! I/O utilities for reading and writing data files.
//!
//! This module provides:
//! - **NetCDF I/O**: dataset reading/writing with CF-style metadata
//!   (requires the `netcdf` feature)
//! - **Boundary shapes**: province/country polygons from shapefiles
//! - **Tables**: CSV time-series and summary tables
//! - **Coordinate projections**: Web-Mercator projection for polygon areas
//!
//! # Example
//!
//! ```ignore
//! use clpost_rs::io::{read_dataset, BoundarySet, TimeTable};
//!
//! let provinces = BoundarySet::load("data/china_provinces.shp")?;
//! let inventory = read_dataset("HCl_total.nc")?;
//!
//! let means = TimeTable::read_csv("fldmean.csv")?;
//! println!("{:?}", means.column_names());
//! ```

mod netcdf_io;
mod projection;
mod shapes;
mod table;

#[cfg(feature = "netcdf")]
pub use netcdf_io::{read_dataset, read_dataset_vars, write_dataset};
pub use netcdf_io::{
    FILL_VALUE_F32, FILL_VALUE_F64, NetCDFError, NetCDFWriterConfig, is_valid_f32, is_valid_f64,
};
pub use projection::{CoordinateProjection, WebMercatorProjection, projected_area_km2};
pub use shapes::{BoundaryRegion, BoundarySet, BoundaryStatistics, ShapeError};
pub use table::{TableError, TimeTable, write_csv_records};
