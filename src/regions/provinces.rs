//! Per-province masks for provincial aggregation.

use log::info;

use crate::grid::LatLonGrid;
use crate::io::{BoundarySet, WebMercatorProjection, projected_area_km2};
use crate::regions::RegionMask;

/// One province: its mask on the working grid and its polygon area.
#[derive(Clone, Debug)]
pub struct ProvinceMask {
    /// Province name from the shapefile attributes.
    pub name: String,
    /// Mask on the working grid.
    pub mask: RegionMask,
    /// Polygon area in km2 (Web-Mercator planar area).
    pub area_km2: f64,
}

/// Build one mask per boundary record, keyed by the province name.
///
/// Provinces whose polygons cover no cell center on the grid are kept
/// with an empty mask; the aggregation reports them as zero rather than
/// dropping the row.
pub fn province_masks(boundaries: &BoundarySet, grid: &LatLonGrid) -> Vec<ProvinceMask> {
    let projection = WebMercatorProjection::new();
    let mut masks = Vec::with_capacity(boundaries.regions().len());
    for region in boundaries.regions() {
        let mask = RegionMask::from_polygons(grid.clone(), &region.polygons);
        let area_km2 = projected_area_km2(&projection, &region.polygons);
        info!(
            "province '{}': {} cells, {:.0} km2",
            region.name,
            mask.count_inside(),
            area_km2
        );
        masks.push(ProvinceMask {
            name: region.name.clone(),
            mask,
            area_km2,
        });
    }
    masks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::BoundaryRegion;
    use geo::{LineString, MultiPolygon, Polygon};

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
    fn test_one_mask_per_region() {
        let set = BoundarySet::from_regions(vec![
            BoundaryRegion::new("A", MultiPolygon(vec![square(0.0, 0.0, 2.0)])).unwrap(),
            BoundaryRegion::new("B", MultiPolygon(vec![square(3.0, 3.0, 1.0)])).unwrap(),
        ]);
        let grid = LatLonGrid::uniform(0.5, 5, 1.0, 0.5, 5, 1.0);
        let masks = province_masks(&set, &grid);

        assert_eq!(masks.len(), 2);
        assert_eq!(masks[0].name, "A");
        assert_eq!(masks[0].mask.count_inside(), 4);
        assert_eq!(masks[1].mask.count_inside(), 1);
        assert!(masks[0].area_km2 > masks[1].area_km2);
    }

    #[test]
    fn test_empty_province_kept() {
        // Polygon between cell centers: no cell inside, row still present.
        let set = BoundarySet::from_regions(vec![
            BoundaryRegion::new("tiny", MultiPolygon(vec![square(0.6, 0.6, 0.2)])).unwrap(),
        ]);
        let grid = LatLonGrid::uniform(0.0, 3, 1.0, 0.0, 3, 1.0);
        let masks = province_masks(&set, &grid);
        assert_eq!(masks.len(), 1);
        assert_eq!(masks[0].mask.count_inside(), 0);
    }
}
