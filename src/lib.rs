//! # clpost-rs
//!
//! Postprocessing for anthropogenic chlorine emission experiments.
//!
//! This crate provides the building blocks of the pipeline:
//! - Regular lat/lon grids, gridded fields, and in-memory datasets
//! - Emission inventory preparation (sector merging, unit conversion,
//!   climatologies, provincial totals)
//! - Region masking from shapefile boundaries and lat/lon boxes
//! - Model-output postprocessing (history merging, derived variables,
//!   column integration)
//! - Statistics (area-weighted means, yearly/seasonal grouping, Welch
//!   tests, convergent cross mapping)
//! - SVG figures for trends, difference maps, and vertical profiles

pub mod analysis;
pub mod batch;
pub mod config;
pub mod figures;
pub mod grid;
pub mod inventory;
pub mod io;
pub mod model;
pub mod regions;
pub mod types;

// Re-export main types for convenience
// Grid types
pub use grid::{Dataset, DimKind, EARTH_RADIUS_M, Field, GridError, GridWindow, LatLonGrid,
    regrid_nearest};

// Core value types
pub use types::{Calendar, GeoBounds, Scenario, Season, YearMonth};

// Inventory pipeline
pub use inventory::{
    InventoryError, ProvinceTotals, SECONDS_PER_MONTH_MEAN, Species, annual_totals_tg,
    climatology_time_axis, flux_to_mg_per_cell, long_term_years, merge_sectors,
    mg_per_cell_to_flux, monthly_climatology, province_monthly_totals,
};

// Regions and masks
pub use regions::{MaskStatistics, ProvinceMask, RegionMask, province_masks};

// Model postprocessing
pub use model::{
    AEROSOL_GROUPS, DerivedVariable, G, M_AIR, ModelError, add_derived, column_dataset,
    column_integral, precip_to_mm_per_day,
};
#[cfg(feature = "netcdf")]
pub use model::merge_history_files;

// Statistics
pub use analysis::{
    AnalysisError, CcmResult, EmbeddingScan, FieldMean, FldmeanTables, RatioSummary,
    best_embedding, ccm_pair, deviation_rate, fldmean, fldmean_dataset, seasonal_means,
    significance_mask, simplex_mae, tail_ratio_summary, welch_p_field, welch_p_value,
    yearly_means,
};

// Figures
pub use figures::{FigureError, TrendPanel, plot_difference_map, plot_profiles,
    plot_yearly_trends};

// Batch running and configuration
pub use batch::{BatchReport, output_exists, run_batch};
#[cfg(feature = "parallel")]
pub use batch::run_batch_parallel;
pub use config::ProjectConfig;

// I/O types
pub use io::{
    BoundaryRegion, BoundarySet, CoordinateProjection, NetCDFWriterConfig, ShapeError,
    TableError, TimeTable, WebMercatorProjection, projected_area_km2,
    FILL_VALUE_F32, FILL_VALUE_F64, is_valid_f32, is_valid_f64,
};
#[cfg(feature = "netcdf")]
pub use io::{NetCDFError, read_dataset, read_dataset_vars, write_dataset};
