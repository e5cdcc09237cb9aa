//! Regular latitude/longitude grids.
//!
//! Axes hold cell-center coordinates in degrees and must be strictly
//! ascending. Cell edges are reconstructed from midpoints between
//! neighbouring centers, which is exact for the uniform inventory and
//! model grids this crate works with.

use std::fmt;

use crate::grid::GridError;
use crate::types::GeoBounds;

/// Mean Earth radius in meters, used for spherical cell areas.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A rectilinear lon/lat grid of cell centers (degrees).
///
/// # Example
///
/// ```
/// use clpost_rs::grid::LatLonGrid;
///
/// let grid = LatLonGrid::uniform(70.05, 700, 0.1, 15.05, 410, 0.1);
/// assert_eq!(grid.n_lon(), 700);
/// assert_eq!(grid.n_lat(), 410);
/// assert!((grid.lon()[699] - 139.95).abs() < 1e-9);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LatLonGrid {
    lon: Vec<f64>,
    lat: Vec<f64>,
}

/// Index window into a grid produced by cropping to a bounding box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridWindow {
    /// Included longitude indices, half-open.
    pub lon: std::ops::Range<usize>,
    /// Included latitude indices, half-open.
    pub lat: std::ops::Range<usize>,
}

impl LatLonGrid {
    /// Create a grid from explicit center coordinates.
    ///
    /// Both axes must have at least two points and be strictly ascending.
    pub fn new(lon: Vec<f64>, lat: Vec<f64>) -> Result<Self, GridError> {
        check_axis("lon", &lon)?;
        check_axis("lat", &lat)?;
        Ok(Self { lon, lat })
    }

    /// Create a uniform grid from origin, count and step per axis.
    ///
    /// # Panics
    ///
    /// Panics if a count is below 2 or a step is not positive.
    pub fn uniform(
        lon0: f64,
        n_lon: usize,
        d_lon: f64,
        lat0: f64,
        n_lat: usize,
        d_lat: f64,
    ) -> Self {
        assert!(n_lon >= 2 && n_lat >= 2, "grid needs at least 2x2 cells");
        assert!(d_lon > 0.0 && d_lat > 0.0, "grid steps must be positive");
        let lon = (0..n_lon).map(|i| lon0 + d_lon * i as f64).collect();
        let lat = (0..n_lat).map(|j| lat0 + d_lat * j as f64).collect();
        Self { lon, lat }
    }

    /// The 0.1 degree Chinese chlorine-inventory grid
    /// (lon 70.05..139.95, lat 15.05..55.95, cell centers).
    pub fn aceic() -> Self {
        Self::uniform(70.05, 700, 0.1, 15.05, 410, 0.1)
    }

    /// Longitude centers in degrees east.
    #[inline]
    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    /// Latitude centers in degrees north.
    #[inline]
    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    #[inline]
    pub fn n_lon(&self) -> usize {
        self.lon.len()
    }

    #[inline]
    pub fn n_lat(&self) -> usize {
        self.lat.len()
    }

    /// Number of horizontal cells.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.lon.len() * self.lat.len()
    }

    /// Flat cell index for `(lat_index, lon_index)` (lat-major).
    #[inline]
    pub fn cell_index(&self, j: usize, i: usize) -> usize {
        j * self.lon.len() + i
    }

    /// Index of the longitude center closest to `lon`.
    pub fn nearest_lon_index(&self, lon: f64) -> usize {
        nearest_index(&self.lon, lon)
    }

    /// Index of the latitude center closest to `lat`.
    pub fn nearest_lat_index(&self, lat: f64) -> usize {
        nearest_index(&self.lat, lat)
    }

    /// Check that two grids share the same axes within `tol` degrees.
    pub fn approx_eq(&self, other: &LatLonGrid, tol: f64) -> bool {
        axes_close(&self.lon, &other.lon, tol) && axes_close(&self.lat, &other.lat, tol)
    }

    /// Index window of cells whose centers fall inside `bounds`.
    ///
    /// Returns an error when no cell center lies inside on either axis.
    pub fn window(&self, bounds: &GeoBounds) -> Result<GridWindow, GridError> {
        let lon = axis_window(&self.lon, bounds.lon_min, bounds.lon_max).ok_or_else(|| {
            GridError::EmptyWindow {
                axis: "lon",
                min: bounds.lon_min,
                max: bounds.lon_max,
            }
        })?;
        let lat = axis_window(&self.lat, bounds.lat_min, bounds.lat_max).ok_or_else(|| {
            GridError::EmptyWindow {
                axis: "lat",
                min: bounds.lat_min,
                max: bounds.lat_max,
            }
        })?;
        Ok(GridWindow { lon, lat })
    }

    /// The grid restricted to a window.
    pub fn subgrid(&self, window: &GridWindow) -> LatLonGrid {
        LatLonGrid {
            lon: self.lon[window.lon.clone()].to_vec(),
            lat: self.lat[window.lat.clone()].to_vec(),
        }
    }

    /// Spherical surface area of every cell, lat-major
    /// (`area[j * n_lon + i]` in square meters).
    ///
    /// `A = R^2 * (lambda_e - lambda_w) * (sin(phi_n) - sin(phi_s))`
    /// with edges at midpoints between neighbouring centers.
    pub fn cell_areas(&self) -> Vec<f64> {
        let lon_edges = axis_edges(&self.lon);
        let lat_edges = axis_edges(&self.lat);
        let r2 = EARTH_RADIUS_M * EARTH_RADIUS_M;

        let mut areas = Vec::with_capacity(self.n_cells());
        for j in 0..self.lat.len() {
            let band = (lat_edges[j + 1].to_radians().sin() - lat_edges[j].to_radians().sin())
                .abs();
            for i in 0..self.lon.len() {
                let width = (lon_edges[i + 1] - lon_edges[i]).to_radians();
                areas.push(r2 * width * band);
            }
        }
        areas
    }
}

impl fmt::Display for LatLonGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} grid, lon [{:.2}, {:.2}], lat [{:.2}, {:.2}]",
            self.n_lat(),
            self.n_lon(),
            self.lon[0],
            self.lon[self.lon.len() - 1],
            self.lat[0],
            self.lat[self.lat.len() - 1],
        )
    }
}

fn check_axis(name: &'static str, values: &[f64]) -> Result<(), GridError> {
    if values.len() < 2 {
        return Err(GridError::AxisTooShort {
            axis: name,
            len: values.len(),
        });
    }
    for (index, pair) in values.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(GridError::NonMonotonicAxis { axis: name, index });
        }
    }
    Ok(())
}

fn axes_close(a: &[f64], b: &[f64], tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol)
}

/// Nearest index in a strictly ascending axis.
fn nearest_index(axis: &[f64], value: f64) -> usize {
    match axis.binary_search_by(|probe| probe.total_cmp(&value)) {
        Ok(i) => i,
        Err(0) => 0,
        Err(i) if i >= axis.len() => axis.len() - 1,
        Err(i) => {
            if (value - axis[i - 1]).abs() <= (axis[i] - value).abs() {
                i - 1
            } else {
                i
            }
        }
    }
}

/// Half-open index range of axis values in `[min, max]`.
fn axis_window(axis: &[f64], min: f64, max: f64) -> Option<std::ops::Range<usize>> {
    let start = axis.iter().position(|&v| v >= min)?;
    let end = axis.iter().rposition(|&v| v <= max)?;
    if end < start {
        return None;
    }
    Some(start..end + 1)
}

/// Cell edges reconstructed from midpoints between centers, length n+1.
fn axis_edges(centers: &[f64]) -> Vec<f64> {
    let n = centers.len();
    debug_assert!(n >= 2);
    let mut edges = Vec::with_capacity(n + 1);
    edges.push(centers[0] - (centers[1] - centers[0]) / 2.0);
    for pair in centers.windows(2) {
        edges.push((pair[0] + pair[1]) / 2.0);
    }
    edges.push(centers[n - 1] + (centers[n - 1] - centers[n - 2]) / 2.0);
    edges
}
