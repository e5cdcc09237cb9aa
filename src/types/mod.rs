//! Strongly-typed domain types for safer APIs.
//!
//! This module provides the small value types the pipelines share:
//! geographic bounds, monthly calendar types, and scenario identifiers.
//!
//! # Example
//!
//! ```
//! use clpost_rs::types::{GeoBounds, Scenario, Season, YearMonth};
//!
//! let bounds = GeoBounds::new(70.0, 140.0, 15.0, 55.0);
//! assert!(bounds.contains(116.4, 39.9));
//!
//! let ym = YearMonth::new(2038, 1);
//! assert_eq!(ym.season(), Season::Djf);
//!
//! assert_eq!(Scenario::S1.case_dir(), "fin");
//! ```

mod bounds;
mod scenario;
mod time;

pub use bounds::GeoBounds;
pub use scenario::Scenario;
pub use time::{
    Calendar, ParseYearMonthError, Season, YearMonth, DAYS_PER_MONTH, SECONDS_PER_DAY,
};
