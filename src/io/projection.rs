//! Coordinate projection utilities for geographic data.
//!
//! Provides transformations between geographic coordinates (lat/lon) and
//! projected Cartesian coordinates (meters), used when polygon geometry
//! needs metric areas.
//!
//! # Example
//!
//! ```
//! use clpost_rs::io::{CoordinateProjection, WebMercatorProjection};
//!
//! let proj = WebMercatorProjection::new();
//! let (x, y) = proj.geo_to_xy(39.9, 116.4);
//! let (lat, lon) = proj.xy_to_geo(x, y);
//! assert!((lat - 39.9).abs() < 1e-9);
//! assert!((lon - 116.4).abs() < 1e-9);
//! ```

use std::f64::consts::PI;

use geo::{Area, Coord, LineString, MultiPolygon, Polygon};

/// Trait for coordinate projections.
pub trait CoordinateProjection {
    /// Convert geographic coordinates (lat, lon) to projected (x, y) in meters.
    fn geo_to_xy(&self, lat: f64, lon: f64) -> (f64, f64);

    /// Convert projected coordinates (x, y) to geographic (lat, lon).
    fn xy_to_geo(&self, x: f64, y: f64) -> (f64, f64);
}

/// Spherical Web-Mercator projection (EPSG:3857 style).
///
/// Areas computed in this projection are inflated away from the equator
/// by roughly `sec^2(lat)`; the provincial-area tables keep this
/// projection anyway to stay comparable with earlier published tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercatorProjection;

impl WebMercatorProjection {
    /// Spherical radius used by Web Mercator, in meters.
    const R: f64 = 6_378_137.0;

    /// Latitude cutoff where the projection diverges.
    const MAX_LAT: f64 = 85.051_128_78;

    pub fn new() -> Self {
        Self
    }
}

impl CoordinateProjection for WebMercatorProjection {
    fn geo_to_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let lat = lat.clamp(-Self::MAX_LAT, Self::MAX_LAT);
        let x = Self::R * lon.to_radians();
        let y = Self::R * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        (x, y)
    }

    fn xy_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = (x / Self::R).to_degrees();
        let lat = (2.0 * (y / Self::R).exp().atan() - PI / 2.0).to_degrees();
        (lat, lon)
    }
}

/// Planar area of a multipolygon in km^2 after projecting each vertex.
///
/// Interior rings are not subtracted; the boundary sets this crate loads
/// keep only exterior rings.
pub fn projected_area_km2<P: CoordinateProjection>(
    projection: &P,
    polygons: &MultiPolygon<f64>,
) -> f64 {
    let mut total = 0.0;
    for polygon in polygons.0.iter() {
        let projected: Vec<Coord<f64>> = polygon
            .exterior()
            .0
            .iter()
            .map(|c| {
                let (x, y) = projection.geo_to_xy(c.y, c.x);
                Coord { x, y }
            })
            .collect();
        let projected = Polygon::new(LineString::from(projected), vec![]);
        total += projected.unsigned_area();
    }
    total / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn square(lon0: f64, lat0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (lon0, lat0),
                (lon0 + size, lat0),
                (lon0 + size, lat0 + size),
                (lon0, lat0 + size),
                (lon0, lat0),
            ]),
            vec![],
        )])
    }

    #[test]
    fn test_mercator_roundtrip() {
        let proj = WebMercatorProjection::new();
        let test_points = [
            (0.0, 0.0),
            (39.9, 116.4),  // Beijing
            (23.5, 121.0),  // Taiwan
            (-33.9, 151.2), // Sydney
        ];

        for (lat, lon) in test_points {
            let (x, y) = proj.geo_to_xy(lat, lon);
            let (lat2, lon2) = proj.xy_to_geo(x, y);
            assert!((lat - lat2).abs() < TOL, "lat roundtrip: {} -> {}", lat, lat2);
            assert!((lon - lon2).abs() < TOL, "lon roundtrip: {} -> {}", lon, lon2);
        }
    }

    #[test]
    fn test_equator_scale() {
        let proj = WebMercatorProjection::new();
        let (x, _) = proj.geo_to_xy(0.0, 1.0);
        // One degree of longitude at the equator is about 111.32 km.
        assert!((x - 111_319.49).abs() < 1.0, "equator easting: {}", x);
    }

    #[test]
    fn test_area_one_degree_square() {
        let proj = WebMercatorProjection::new();
        let area = projected_area_km2(&proj, &square(0.0, 0.0, 1.0));
        // Roughly 111.32 km on each side at the equator.
        assert!(area > 12_300.0 && area < 12_500.0, "area: {}", area);
    }

    #[test]
    fn test_area_inflates_poleward() {
        let proj = WebMercatorProjection::new();
        let equator = projected_area_km2(&proj, &square(0.0, 0.0, 1.0));
        let north = projected_area_km2(&proj, &square(0.0, 60.0, 1.0));
        // Mercator area grows like sec^2(lat); at 60N the factor is ~4.
        assert!(north / equator > 3.5, "ratio: {}", north / equator);
    }
}
