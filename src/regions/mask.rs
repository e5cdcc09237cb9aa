//! Boolean grid masks from polygon unions, with a NetCDF disk cache.

use std::fmt;
#[cfg(feature = "netcdf")]
use std::path::Path;

use geo::{Contains, MultiPolygon, Point};
#[cfg(feature = "netcdf")]
use log::info;

use crate::grid::{DimKind, Field, GridError, LatLonGrid};
#[cfg(feature = "netcdf")]
use crate::grid::Dataset;
#[cfg(feature = "netcdf")]
use crate::io::{NetCDFError, NetCDFWriterConfig, read_dataset, write_dataset};

/// Boolean mask over a lat/lon grid (lat-major, like cell areas).
///
/// A cell is inside when its center passes the polygon containment test;
/// boundary inclusion is whatever `geo`'s `Contains` does.
#[derive(Clone, Debug)]
pub struct RegionMask {
    grid: LatLonGrid,
    inside: Vec<bool>,
}

impl RegionMask {
    /// Build a mask by testing every cell center against the polygons.
    pub fn from_polygons(grid: LatLonGrid, polygons: &MultiPolygon<f64>) -> Self {
        let mut inside = Vec::with_capacity(grid.n_cells());
        for &lat in grid.lat() {
            for &lon in grid.lon() {
                inside.push(polygons.contains(&Point::new(lon, lat)));
            }
        }
        Self { grid, inside }
    }

    /// Build a mask from an explicit flag vector (lat-major).
    ///
    /// # Panics
    ///
    /// Panics when the flag count does not match the grid.
    pub fn from_flags(grid: LatLonGrid, inside: Vec<bool>) -> Self {
        assert_eq!(
            inside.len(),
            grid.n_cells(),
            "mask has {} flags for a {} cell grid",
            inside.len(),
            grid.n_cells()
        );
        Self { grid, inside }
    }

    /// The grid this mask is defined on.
    pub fn grid(&self) -> &LatLonGrid {
        &self.grid
    }

    /// Flags in lat-major order.
    pub fn flags(&self) -> &[bool] {
        &self.inside
    }

    /// Whether the cell at `(lat_index, lon_index)` is inside.
    #[inline]
    pub fn is_inside(&self, j: usize, i: usize) -> bool {
        self.inside[self.grid.cell_index(j, i)]
    }

    /// Number of cells inside the region.
    pub fn count_inside(&self) -> usize {
        self.inside.iter().filter(|&&b| b).count()
    }

    /// NaN out every value outside the region.
    ///
    /// The field's trailing lat/lon dimensions must match the mask grid.
    pub fn apply(&self, field: &Field) -> Result<Field, GridError> {
        self.check_field(field)?;
        let mut out = field.clone();
        for slab in out.horizontal_slabs_mut() {
            for (value, &keep) in slab.iter_mut().zip(&self.inside) {
                if !keep {
                    *value = f64::NAN;
                }
            }
        }
        Ok(out)
    }

    /// Sum of `value * cell_area` over the cells inside, NaN treated as 0.
    ///
    /// Used for provincial emission totals, where the integrand is a flux
    /// in kg m-2 s-1 and the result is kg/s.
    pub fn weighted_sum(&self, slab: &[f64], areas: &[f64]) -> f64 {
        debug_assert_eq!(slab.len(), self.inside.len());
        debug_assert_eq!(areas.len(), self.inside.len());
        let mut total = 0.0;
        for ((&value, &area), &keep) in slab.iter().zip(areas).zip(&self.inside) {
            if keep && !value.is_nan() {
                total += value * area;
            }
        }
        total
    }

    /// Statistics over the mask.
    pub fn statistics(&self) -> MaskStatistics {
        MaskStatistics {
            n_cells: self.inside.len(),
            n_inside: self.count_inside(),
        }
    }

    fn check_field(&self, field: &Field) -> Result<(), GridError> {
        if !field.is_horizontal() {
            return Err(GridError::MissingDim {
                name: field.name.clone(),
                dim: DimKind::Lat,
            });
        }
        let n_lat = field.shape()[field.rank() - 2];
        let n_lon = field.shape()[field.rank() - 1];
        if n_lat != self.grid.n_lat() || n_lon != self.grid.n_lon() {
            return Err(GridError::GridMismatch(format!(
                "'{}' is {}x{} but the mask grid is {}x{}",
                field.name,
                n_lat,
                n_lon,
                self.grid.n_lat(),
                self.grid.n_lon()
            )));
        }
        Ok(())
    }

    /// Write the mask to a NetCDF cache file (axes plus a 0/1 `mask`
    /// variable).
    #[cfg(feature = "netcdf")]
    pub fn write_cache(&self, path: impl AsRef<Path>) -> Result<(), NetCDFError> {
        let data: Vec<f64> = self.inside.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect();
        let field = Field::new(
            "mask",
            "1",
            vec![DimKind::Lat, DimKind::Lon],
            vec![self.grid.n_lat(), self.grid.n_lon()],
            data,
        )?
        .with_long_name("region mask (1 = inside)");

        let mut ds = Dataset::new(self.grid.clone());
        ds.push_field(field)?;
        let config = NetCDFWriterConfig::new(path.as_ref().to_string_lossy())
            .with_title("cached region mask");
        write_dataset(&config, &ds)
    }

    /// Read a mask written by [`RegionMask::write_cache`].
    #[cfg(feature = "netcdf")]
    pub fn read_cache(path: impl AsRef<Path>) -> Result<Self, NetCDFError> {
        let ds = read_dataset(path)?;
        let field = ds.expect_field("mask")?;
        let inside = field.values().iter().map(|&v| v > 0.5).collect();
        Ok(Self::from_flags(ds.grid.clone(), inside))
    }

    /// Read the cached mask when the file exists, otherwise build it and
    /// write the cache.
    #[cfg(feature = "netcdf")]
    pub fn cached(
        path: impl AsRef<Path>,
        grid: &LatLonGrid,
        polygons: impl FnOnce() -> MultiPolygon<f64>,
    ) -> Result<Self, NetCDFError> {
        let path = path.as_ref();
        if path.exists() {
            info!("reading cached mask from {}", path.display());
            let mask = Self::read_cache(path)?;
            if mask.grid.approx_eq(grid, 1e-6) {
                return Ok(mask);
            }
            info!("cached mask is on a different grid, rebuilding");
        }
        info!("building mask on {}", grid);
        let mask = Self::from_polygons(grid.clone(), &polygons());
        mask.write_cache(path)?;
        Ok(mask)
    }
}

/// Statistics about a region mask.
#[derive(Debug, Clone, Copy)]
pub struct MaskStatistics {
    /// Total cells on the grid
    pub n_cells: usize,
    /// Cells inside the region
    pub n_inside: usize,
}

impl MaskStatistics {
    /// Fraction of cells inside.
    pub fn inside_fraction(&self) -> f64 {
        if self.n_cells == 0 {
            0.0
        } else {
            self.n_inside as f64 / self.n_cells as f64
        }
    }
}

impl fmt::Display for MaskStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mask: {} of {} cells inside ({:.1}%)",
            self.n_inside,
            self.n_cells,
            100.0 * self.inside_fraction()
        )
    }
}
