//! Chlorine-emission inventory preparation.
//!
//! The ACEIC-style inventory arrives as per-sector monthly fields in Mg
//! per grid cell per month on the 0.1 degree grid. This module merges the
//! sectors per species, converts to flux units, builds the multi-year
//! monthly climatology, computes annual totals, and aggregates masked
//! fluxes per province.
//!
//! # Example
//!
//! ```ignore
//! use clpost_rs::inventory::{self, Species};
//!
//! let total = inventory::merge_sectors(&raw, Species::Hcl)?;
//! let flux = inventory::mg_per_cell_to_flux(&total, &raw.grid, &raw.time)?;
//! let totals = inventory::annual_totals_tg(&flux, &raw.time, &raw.grid)?;
//! ```

mod climatology;
mod convert;
mod provincial;

pub use climatology::{climatology_time_axis, monthly_climatology};
pub use convert::{annual_totals_tg, flux_to_mg_per_cell, merge_sectors, mg_per_cell_to_flux};
pub use provincial::{
    ProvinceTotals, SECONDS_PER_MONTH_MEAN, long_term_years, province_monthly_totals,
};

use thiserror::Error;

use crate::grid::GridError;

/// Errors from inventory processing.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("no {0} sector fields found in the dataset")]
    NoSectors(&'static str),

    #[error("field '{name}' has {got} time steps but the axis has {expected}")]
    TimeMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("field '{0}' is not a monthly (time, lat, lon) field")]
    NotMonthly(String),
}

/// Emitted chlorine species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    /// Hydrogen chloride gas.
    Hcl,
    /// Particulate chloride.
    Pcl,
}

impl Species {
    /// Both species, gas first.
    pub const BOTH: [Species; 2] = [Species::Hcl, Species::Pcl];

    /// Variable-name prefix in the inventory files.
    pub fn prefix(&self) -> &'static str {
        match self {
            Species::Hcl => "HCl",
            Species::Pcl => "pCl",
        }
    }

    /// Per-sector variable names, in inventory order.
    pub fn sector_names(&self) -> [String; 6] {
        let p = self.prefix();
        [
            format!("{}_agri", p),
            format!("{}_bbop", p),
            format!("{}_ene", p),
            format!("{}_ind", p),
            format!("{}_res", p),
            format!("{}_wstop", p),
        ]
    }

    /// Name of the waste-open sector, excluded during the phase-out
    /// window of the provincial totals.
    pub fn wstop_name(&self) -> String {
        format!("{}_wstop", self.prefix())
    }

    /// Name of the merged total variable.
    pub fn total_name(&self) -> String {
        format!("{}_total", self.prefix())
    }

    /// Whether the country mask for this species includes Taiwan.
    ///
    /// The HCl inventory covers all provinces; the particulate-chloride
    /// inventory is mainland-only.
    pub fn mask_includes_taiwan(&self) -> bool {
        matches!(self, Species::Hcl)
    }

    /// File name of the cached country mask for this species.
    pub fn mask_cache_name(&self) -> &'static str {
        match self {
            Species::Hcl => "maskwithtaiwan.nc",
            Species::Pcl => "mask.nc",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}
