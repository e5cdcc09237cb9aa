//! Nearest-neighbour regridding between lat/lon grids.
//!
//! Each target cell takes the value of the source cell whose center is
//! closest, looked up independently per axis. This is the conforming
//! step required before arithmetic between datasets on different grids.

use crate::grid::{Dataset, Field, GridError, LatLonGrid};

/// Resample a field from `src` onto `dst` by nearest neighbour.
///
/// The field must have trailing lat/lon dimensions matching `src`.
/// Leading dimensions (time, lev) are preserved.
pub fn regrid_nearest(
    field: &Field,
    src: &LatLonGrid,
    dst: &LatLonGrid,
) -> Result<Field, GridError> {
    if !field.is_horizontal() {
        return Err(GridError::GridMismatch(format!(
            "'{}' has no horizontal dimensions to regrid",
            field.name
        )));
    }
    let n_lat = field.shape()[field.rank() - 2];
    let n_lon = field.shape()[field.rank() - 1];
    if n_lat != src.n_lat() || n_lon != src.n_lon() {
        return Err(GridError::GridMismatch(format!(
            "'{}' is {}x{} but the source grid is {}x{}",
            field.name,
            n_lat,
            n_lon,
            src.n_lat(),
            src.n_lon()
        )));
    }

    let lat_map: Vec<usize> = dst.lat().iter().map(|&v| src.nearest_lat_index(v)).collect();
    let lon_map: Vec<usize> = dst.lon().iter().map(|&v| src.nearest_lon_index(v)).collect();

    let slab_out = dst.n_lat() * dst.n_lon();
    let mut data = Vec::with_capacity(field.len() / (n_lat * n_lon) * slab_out);
    for slab in field.horizontal_slabs() {
        for &sj in &lat_map {
            let row = &slab[sj * n_lon..(sj + 1) * n_lon];
            for &si in &lon_map {
                data.push(row[si]);
            }
        }
    }

    let mut shape = field.shape().to_vec();
    let rank = shape.len();
    shape[rank - 2] = dst.n_lat();
    shape[rank - 1] = dst.n_lon();
    let mut out = Field::new(&field.name, &field.units, field.dims().to_vec(), shape, data)?;
    out.long_name = field.long_name.clone();
    Ok(out)
}

/// Regrid every horizontal field of a dataset onto `dst`.
///
/// Non-horizontal fields pass through unchanged.
pub fn regrid_dataset_nearest(ds: &Dataset, dst: &LatLonGrid) -> Result<Dataset, GridError> {
    let mut out = Dataset::new(dst.clone()).with_time(ds.time.clone());
    out.lev = ds.lev.clone();
    out.lev_bounds = ds.lev_bounds.clone();
    for field in ds.fields() {
        let resampled = if field.is_horizontal() {
            regrid_nearest(field, &ds.grid, dst)?
        } else {
            field.clone()
        };
        out.push_field(resampled)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DimKind;

    #[test]
    fn test_identity_regrid() {
        let grid = LatLonGrid::uniform(0.5, 3, 1.0, 0.5, 2, 1.0);
        let field = Field::new(
            "x",
            "",
            vec![DimKind::Lat, DimKind::Lon],
            vec![2, 3],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();
        let out = regrid_nearest(&field, &grid, &grid).unwrap();
        assert_eq!(out.values(), field.values());
    }

    #[test]
    fn test_upsample_repeats_nearest() {
        // 2-cell axis onto a 4-cell axis at double resolution.
        let src = LatLonGrid::uniform(0.5, 2, 1.0, 0.5, 2, 1.0);
        let dst = LatLonGrid::uniform(0.25, 4, 0.5, 0.25, 4, 0.5);
        let field = Field::new(
            "x",
            "",
            vec![DimKind::Lat, DimKind::Lon],
            vec![2, 2],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let out = regrid_nearest(&field, &src, &dst).unwrap();
        assert_eq!(out.shape(), &[4, 4]);
        // Top-left quadrant all map to the (0, 0) source cell.
        assert_eq!(out.get(&[0, 0]), 1.0);
        assert_eq!(out.get(&[1, 1]), 1.0);
        // Bottom-right quadrant maps to (1, 1).
        assert_eq!(out.get(&[3, 3]), 4.0);
    }

    #[test]
    fn test_wrong_source_grid() {
        let src = LatLonGrid::uniform(0.5, 2, 1.0, 0.5, 2, 1.0);
        let other = LatLonGrid::uniform(0.5, 3, 1.0, 0.5, 3, 1.0);
        let field = Field::new(
            "x",
            "",
            vec![DimKind::Lat, DimKind::Lon],
            vec![2, 2],
            vec![0.0; 4],
        )
        .unwrap();
        assert!(regrid_nearest(&field, &other, &src).is_err());
    }
}
