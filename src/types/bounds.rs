//! Geographic bounding boxes.

use std::fmt;

/// Rectangular lon/lat region (degrees, inclusive edges).
///
/// Used for cropping fields to analysis regions and for bounding-box
/// prefilters before point-in-polygon tests.
///
/// # Example
///
/// ```
/// use clpost_rs::types::GeoBounds;
///
/// // North China Plain
/// let bounds = GeoBounds::new(110.0, 120.0, 34.0, 40.0);
///
/// assert!(bounds.contains(115.0, 37.0));
/// assert!(!bounds.contains(109.0, 37.0));
/// assert_eq!(bounds.center(), (115.0, 37.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    /// Western edge (minimum longitude, degrees east).
    pub lon_min: f64,
    /// Eastern edge (maximum longitude, degrees east).
    pub lon_max: f64,
    /// Southern edge (minimum latitude, degrees north).
    pub lat_min: f64,
    /// Northern edge (maximum latitude, degrees north).
    pub lat_max: f64,
}

impl GeoBounds {
    /// Create new bounds.
    ///
    /// # Panics
    ///
    /// Panics if `lon_max <= lon_min` or `lat_max <= lat_min`.
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        assert!(
            lon_max > lon_min,
            "lon_max ({}) must be greater than lon_min ({})",
            lon_max,
            lon_min
        );
        assert!(
            lat_max > lat_min,
            "lat_max ({}) must be greater than lat_min ({})",
            lat_max,
            lat_min
        );

        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    /// Longitudinal extent in degrees.
    #[inline]
    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Latitudinal extent in degrees.
    #[inline]
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Center point as `(lon, lat)`.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.lon_min + self.lon_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }

    /// Check whether a point lies inside (edges inclusive).
    #[inline]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.lon_min && lon <= self.lon_max && lat >= self.lat_min && lat <= self.lat_max
    }

    /// Check whether a coordinate list has any point inside these bounds.
    pub fn intersects_any(&self, coords: &[(f64, f64)]) -> bool {
        coords.iter().any(|&(lon, lat)| self.contains(lon, lat))
    }
}

impl fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.2}E, {:.2}E] × [{:.2}N, {:.2}N]",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let b = GeoBounds::new(70.0, 140.0, 15.0, 55.0);
        assert_eq!(b.width(), 70.0);
        assert_eq!(b.height(), 40.0);
    }

    #[test]
    fn test_contains_edges() {
        let b = GeoBounds::new(110.0, 120.0, 34.0, 40.0);
        assert!(b.contains(110.0, 34.0));
        assert!(b.contains(120.0, 40.0));
        assert!(!b.contains(120.1, 37.0));
        assert!(!b.contains(115.0, 33.9));
    }

    #[test]
    fn test_center() {
        let b = GeoBounds::new(108.0, 115.0, 21.0, 28.0);
        assert_eq!(b.center(), (111.5, 24.5));
    }

    #[test]
    #[should_panic(expected = "lon_max")]
    fn test_invalid_lon() {
        GeoBounds::new(120.0, 110.0, 34.0, 40.0);
    }

    #[test]
    #[should_panic(expected = "lat_max")]
    fn test_invalid_lat() {
        GeoBounds::new(110.0, 120.0, 40.0, 34.0);
    }
}
