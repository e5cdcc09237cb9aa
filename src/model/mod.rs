//! Model-output postprocessing: history merging, derived variables, and
//! column integration.
//!
//! Works on the CESM/CAM-chem style monthly history output of the two
//! scenarios: per-period files are merged along time, aerosol and
//! deposition groupings are summed into derived variables, and 4-D
//! mixing-ratio fields are integrated into column burdens.

mod column;
mod derived;
#[cfg(feature = "netcdf")]
mod merge;

pub use column::{G, M_AIR, column_dataset, column_integral};
pub use derived::{
    ACID_DEPOSITION, AEROSOL_GROUPS, BC, DUST, POM, PRECT, SEA_SALT, SOA, SULFATE, TOTAL_AEROSOL,
    DerivedVariable, add_derived, precip_to_mm_per_day,
};
#[cfg(feature = "netcdf")]
pub use merge::merge_history_files;

use thiserror::Error;

use crate::grid::GridError;

/// Errors from model postprocessing.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("'{name}' is on a different vertical grid ({got} levels, axis has {expected})")]
    WrongVerticalGrid {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("'{name}' has unsupported units '{units}' for column integration")]
    UnsupportedUnits { name: String, units: String },

    #[error("dataset has no level bounds, cannot integrate columns")]
    MissingLevelBounds,

    #[error("no components of '{0}' present in the dataset")]
    NoComponents(&'static str),
}
