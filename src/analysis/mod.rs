//! Spatial and temporal statistics over gridded fields.
//!
//! This module provides tools for:
//! - Area-weighted spatial means over a grid or a masked region
//! - Yearly and seasonal grouping of monthly series and fields
//! - Welch's unequal-variance t-test for per-cell significance maps
//! - Tail-ratio summaries between two scenarios
//! - Simplex projection and convergent cross mapping for causality
//!   screening between emission and concentration series
//!
//! # Example
//!
//! ```ignore
//! use clpost::analysis::{fldmean, FieldMean};
//!
//! let mean = fldmean(&field, &grid, None)?;
//! if let FieldMean::TimeSeries(series) = mean {
//!     println!("first month: {:.3e}", series[0]);
//! }
//! ```

mod ccm;
mod difference;
mod fldmean;
mod grouping;
mod welch;

pub use ccm::{CcmResult, EmbeddingScan, best_embedding, ccm_pair, simplex_mae};
pub use difference::{DEFAULT_TAIL_MONTHS, RatioSummary, tail_ratio_summary};
pub use fldmean::{FieldMean, FldmeanTables, fldmean, fldmean_dataset};
pub use grouping::{
    annual_mean_field, deviation_rate, seasonal_mean_field, seasonal_means, yearly_means,
};
pub use welch::{significance_mask, welch_p_field, welch_p_value};

use thiserror::Error;

use crate::grid::GridError;
use crate::io::TableError;

/// Errors from statistics over fields and tables.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("series are not aligned: {0}")]
    Mismatch(String),
}
