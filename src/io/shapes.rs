//! Administrative boundary polygons from shapefiles.
//!
//! Loads province or country outlines and keeps them grouped per record,
//! with the record's name attribute, so masks can be built for the whole
//! country, for the country minus named regions, or per province.
//!
//! # Example
//!
//! ```ignore
//! use clpost_rs::io::BoundarySet;
//!
//! let provinces = BoundarySet::load("data/china_provinces.shp")?;
//! println!("{}", provinces.statistics());
//!
//! let mainland = provinces.union_excluding(&["Taiwan"]);
//! ```

use std::fmt;
use std::path::Path;

use geo::{Contains, Coord, LineString, MultiPolygon, Point, Polygon};
use shapefile::dbase::FieldValue;
use shapefile::{Reader, Shape};
use thiserror::Error;

use crate::types::GeoBounds;

/// Attribute names tried, in order, for a record's region name.
const NAME_FIELDS: [&str; 4] = ["NAME_1", "NAME", "name", "NL_NAME_1"];

/// Error type for boundary loading.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shapefile parsing error
    #[error("Shapefile error: {0}")]
    Shapefile(String),

    /// No polygons found in the data
    #[error("No polygons found in shapefile")]
    NoPolygons,
}

impl From<shapefile::Error> for ShapeError {
    fn from(e: shapefile::Error) -> Self {
        ShapeError::Shapefile(e.to_string())
    }
}

/// One named region: the polygons of a single shapefile record.
#[derive(Debug, Clone)]
pub struct BoundaryRegion {
    /// Region name from the record attributes.
    pub name: String,
    /// Outer rings of the record (holes are ignored).
    pub polygons: MultiPolygon<f64>,
    /// Bounding box of all vertices, used as a containment prefilter.
    pub bbox: GeoBounds,
}

impl BoundaryRegion {
    /// Create a region from polygons, computing its bounding box.
    ///
    /// Returns `None` when the polygon set has no vertices.
    pub fn new(name: impl Into<String>, polygons: MultiPolygon<f64>) -> Option<Self> {
        let mut lon_min = f64::INFINITY;
        let mut lon_max = f64::NEG_INFINITY;
        let mut lat_min = f64::INFINITY;
        let mut lat_max = f64::NEG_INFINITY;
        for polygon in polygons.0.iter() {
            for c in polygon.exterior().0.iter() {
                lon_min = lon_min.min(c.x);
                lon_max = lon_max.max(c.x);
                lat_min = lat_min.min(c.y);
                lat_max = lat_max.max(c.y);
            }
        }
        if lon_min >= lon_max || lat_min >= lat_max {
            return None;
        }
        Some(Self {
            name: name.into(),
            polygons,
            bbox: GeoBounds::new(lon_min, lon_max, lat_min, lat_max),
        })
    }

    /// Point-in-region test (bounding box first, then polygon containment).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.bbox.contains(lon, lat) && self.polygons.contains(&Point::new(lon, lat))
    }

    /// Total number of exterior vertices.
    pub fn vertex_count(&self) -> usize {
        self.polygons
            .0
            .iter()
            .map(|p| p.exterior().0.len())
            .sum()
    }
}

/// A set of named boundary regions loaded from one shapefile.
pub struct BoundarySet {
    regions: Vec<BoundaryRegion>,
}

impl BoundarySet {
    /// Load all polygon records from a shapefile.
    ///
    /// The region name is taken from the first present attribute among
    /// `NAME_1`, `NAME`, `name`, `NL_NAME_1`; records without one get a
    /// positional fallback name. Records without polygon geometry are
    /// skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ShapeError> {
        let mut reader = Reader::from_path(path)?;
        let mut regions = Vec::new();

        for (index, result) in reader.iter_shapes_and_records().enumerate() {
            let (shape, record) = result?;

            let polygon = match shape {
                Shape::Polygon(polygon) => polygon,
                _ => continue,
            };

            let mut parts = Vec::new();
            for ring in polygon.rings() {
                let coords: Vec<Coord<f64>> = ring
                    .points()
                    .iter()
                    .map(|p| Coord { x: p.x, y: p.y })
                    .collect();
                if coords.len() >= 4 {
                    parts.push(Polygon::new(LineString::from(coords), vec![]));
                }
            }

            let name = NAME_FIELDS
                .iter()
                .find_map(|field| match record.get(field) {
                    Some(FieldValue::Character(Some(s))) if !s.trim().is_empty() => {
                        Some(s.trim().to_string())
                    }
                    _ => None,
                })
                .unwrap_or_else(|| format!("region_{}", index));

            if let Some(region) = BoundaryRegion::new(name, MultiPolygon(parts)) {
                regions.push(region);
            }
        }

        if regions.is_empty() {
            return Err(ShapeError::NoPolygons);
        }
        Ok(Self { regions })
    }

    /// Build a set from already constructed regions.
    pub fn from_regions(regions: Vec<BoundaryRegion>) -> Self {
        Self { regions }
    }

    /// All regions in record order.
    pub fn regions(&self) -> &[BoundaryRegion] {
        &self.regions
    }

    /// Look up a region by exact name.
    pub fn region(&self, name: &str) -> Option<&BoundaryRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Region names in record order.
    pub fn names(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.name.as_str()).collect()
    }

    /// All polygons of all regions as one multipolygon.
    pub fn union(&self) -> MultiPolygon<f64> {
        self.union_excluding(&[])
    }

    /// All polygons except those of the named regions.
    ///
    /// Used to build the mainland mask with Taiwan excluded for the
    /// particulate-chloride inventory.
    pub fn union_excluding(&self, excluded: &[&str]) -> MultiPolygon<f64> {
        let mut polygons = Vec::new();
        for region in &self.regions {
            if excluded.contains(&region.name.as_str()) {
                continue;
            }
            polygons.extend(region.polygons.0.iter().cloned());
        }
        MultiPolygon(polygons)
    }

    /// Statistics over the loaded regions.
    pub fn statistics(&self) -> BoundaryStatistics {
        BoundaryStatistics {
            region_count: self.regions.len(),
            total_vertices: self.regions.iter().map(|r| r.vertex_count()).sum(),
        }
    }
}

/// Statistics about a boundary set.
#[derive(Debug, Clone)]
pub struct BoundaryStatistics {
    /// Number of named regions
    pub region_count: usize,
    /// Total number of exterior vertices
    pub total_vertices: usize,
}

impl fmt::Display for BoundaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Boundary Statistics:")?;
        writeln!(f, "  Regions: {}", self.region_count)?;
        write!(f, "  Total vertices: {}", self.total_vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (x0, y0),
                (x0 + size, y0),
                (x0 + size, y0 + size),
                (x0, y0 + size),
                (x0, y0),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_region_contains() {
        let region =
            BoundaryRegion::new("A", MultiPolygon(vec![square(0.0, 0.0, 10.0)])).unwrap();
        assert!(region.contains(5.0, 5.0));
        assert!(!region.contains(15.0, 5.0));
        assert_eq!(region.bbox, GeoBounds::new(0.0, 10.0, 0.0, 10.0));
    }

    #[test]
    fn test_union_excluding() {
        let set = BoundarySet::from_regions(vec![
            BoundaryRegion::new("A", MultiPolygon(vec![square(0.0, 0.0, 1.0)])).unwrap(),
            BoundaryRegion::new("B", MultiPolygon(vec![square(2.0, 0.0, 1.0)])).unwrap(),
        ]);
        assert_eq!(set.union().0.len(), 2);
        assert_eq!(set.union_excluding(&["B"]).0.len(), 1);
        assert!(set.region("B").is_some());
        assert!(set.region("C").is_none());
    }

    #[test]
    fn test_degenerate_region_rejected() {
        assert!(BoundaryRegion::new("empty", MultiPolygon(vec![])).is_none());
    }

    #[test]
    fn test_statistics() {
        let set = BoundarySet::from_regions(vec![BoundaryRegion::new(
            "A",
            MultiPolygon(vec![square(0.0, 0.0, 1.0)]),
        )
        .unwrap()]);
        let stats = set.statistics();
        assert_eq!(stats.region_count, 1);
        assert_eq!(stats.total_vertices, 5);
    }
}
