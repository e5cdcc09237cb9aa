//! Region masks and named analysis boxes.
//!
//! Masks mark the grid cells inside a union of boundary polygons and are
//! applied by NaN-ing everything outside. Country-level masks are cached
//! to NetCDF because the point-in-polygon sweep over the 0.1 degree
//! inventory grid is the slowest step of the emission pipelines.
//!
//! # Example
//!
//! ```ignore
//! use clpost_rs::io::BoundarySet;
//! use clpost_rs::regions::{RegionMask, boxes};
//!
//! let provinces = BoundarySet::load("china_provinces.shp")?;
//! let mask = RegionMask::from_polygons(grid.clone(), &provinces.union());
//! let masked = mask.apply(&inventory_field)?;
//!
//! let plain = dataset.crop(&boxes::NORTH_CHINA_PLAIN)?;
//! ```

mod mask;
mod provinces;

pub use mask::{MaskStatistics, RegionMask};
pub use provinces::{ProvinceMask, province_masks};

use crate::types::GeoBounds;

/// Named rectangular analysis regions.
pub mod boxes {
    use super::GeoBounds;

    /// North China Plain.
    pub const NORTH_CHINA_PLAIN: GeoBounds = GeoBounds {
        lon_min: 110.0,
        lon_max: 120.0,
        lat_min: 34.0,
        lat_max: 40.0,
    };

    /// East China Sea.
    pub const EAST_CHINA_SEA: GeoBounds = GeoBounds {
        lon_min: 127.0,
        lon_max: 130.0,
        lat_min: 23.0,
        lat_max: 33.0,
    };

    /// South China Sea.
    pub const SOUTH_CHINA_SEA: GeoBounds = GeoBounds {
        lon_min: 108.0,
        lon_max: 115.0,
        lat_min: 21.0,
        lat_max: 28.0,
    };

    /// Central China.
    pub const CENTRAL_CHINA: GeoBounds = GeoBounds {
        lon_min: 110.0,
        lon_max: 120.0,
        lat_min: 28.0,
        lat_max: 34.0,
    };

    /// Crop window covering China, used before country masking.
    pub const CHINA_WINDOW: GeoBounds = GeoBounds {
        lon_min: 70.0,
        lon_max: 140.0,
        lat_min: 15.0,
        lat_max: 55.0,
    };

    /// All named analysis boxes with their display names.
    pub const NAMED: [(&str, GeoBounds); 4] = [
        ("North China Plain", NORTH_CHINA_PLAIN),
        ("East China Sea", EAST_CHINA_SEA),
        ("South China Sea", SOUTH_CHINA_SEA),
        ("Central China", CENTRAL_CHINA),
    ];
}
