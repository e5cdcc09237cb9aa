//! Vertical column integration of mixing-ratio fields.

use log::warn;

use crate::grid::{Dataset, DimKind, Field};
use crate::model::ModelError;

/// Standard gravity, m s-2.
pub const G: f64 = 9.806_65;

/// Molar mass of dry air, kg/mol.
pub const M_AIR: f64 = 0.028_97;

/// Hectopascals to pascals.
const PA_PER_HPA: f64 = 100.0;

/// Integrate a 4-D mixing-ratio field into a column burden.
///
/// `column = sum_k q_k * dp_k / g` with `dp` from the level bounds in
/// hPa. Units dispatch: `mol/mol` divides by the molar mass of air and
/// yields mol m-2; `kg/kg` yields kg m-2 directly. NaN levels are
/// omitted; a column with no valid level is NaN.
pub fn column_integral(
    field: &Field,
    lev_bounds: &[(f64, f64)],
) -> Result<Field, ModelError> {
    if field.dims() != [DimKind::Time, DimKind::Lev, DimKind::Lat, DimKind::Lon] {
        return Err(ModelError::Grid(crate::grid::GridError::MissingDim {
            name: field.name.clone(),
            dim: DimKind::Lev,
        }));
    }
    let n_lev = field.shape()[1];
    if n_lev != lev_bounds.len() {
        return Err(ModelError::WrongVerticalGrid {
            name: field.name.clone(),
            expected: lev_bounds.len(),
            got: n_lev,
        });
    }

    let (per_mass, units) = match field.units.trim() {
        "mol/mol" => (1.0 / M_AIR, "mol m-2"),
        "kg/kg" => (1.0, "kg m-2"),
        other => {
            return Err(ModelError::UnsupportedUnits {
                name: field.name.clone(),
                units: other.to_string(),
            });
        }
    };

    let dp: Vec<f64> = lev_bounds
        .iter()
        .map(|&(lower, upper)| (upper - lower).abs() * PA_PER_HPA)
        .collect();

    let n_time = field.shape()[0];
    let slab_len = field.horizontal_len();
    let mut data = vec![f64::NAN; n_time * slab_len];

    for (index, slab) in field.horizontal_slabs().enumerate() {
        let t = index / n_lev;
        let k = index % n_lev;
        let weight = dp[k] / G * per_mass;
        let out = &mut data[t * slab_len..(t + 1) * slab_len];
        for (acc, &q) in out.iter_mut().zip(slab) {
            if q.is_nan() {
                continue;
            }
            if acc.is_nan() {
                *acc = q * weight;
            } else {
                *acc += q * weight;
            }
        }
    }

    let shape = vec![n_time, field.shape()[2], field.shape()[3]];
    let mut out = Field::new(
        &field.name,
        units,
        vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
        shape,
        data,
    )?;
    out.long_name = Some(match &field.long_name {
        Some(long_name) => format!("{}, column burden", long_name),
        None => format!("{} column burden", field.name),
    });
    Ok(out)
}

/// Column-integrate every eligible field of a dataset.
///
/// Fields on other vertical grids or with unsupported units are logged
/// and skipped; fields without a level dimension are skipped silently.
pub fn column_dataset(ds: &Dataset) -> Result<Dataset, ModelError> {
    let bounds = ds.lev_bounds.as_ref().ok_or(ModelError::MissingLevelBounds)?;

    let mut out = Dataset::new(ds.grid.clone()).with_time(ds.time.clone());
    for field in ds.fields() {
        if !field.has_dim(DimKind::Lev) {
            continue;
        }
        match column_integral(field, bounds) {
            Ok(column) => out.push_field(column)?,
            Err(e @ (ModelError::WrongVerticalGrid { .. } | ModelError::UnsupportedUnits { .. })) => {
                warn!("skipping '{}': {}", field.name, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LatLonGrid;
    use crate::types::YearMonth;

    const TOL: f64 = 1e-12;

    fn field_4d(units: &str, value: f64, n_lev: usize) -> Field {
        Field::new(
            "HCL",
            units,
            vec![DimKind::Time, DimKind::Lev, DimKind::Lat, DimKind::Lon],
            vec![1, n_lev, 1, 2],
            vec![value; n_lev * 2],
        )
        .unwrap()
    }

    #[test]
    fn test_constant_mol_per_mol_column() {
        // Two levels of 100 hPa each, q = 1e-9 mol/mol:
        // column = q * 2e4 Pa / g / M_air.
        let bounds = vec![(900.0, 1000.0), (800.0, 900.0)];
        let field = field_4d("mol/mol", 1.0e-9, 2);
        let column = column_integral(&field, &bounds).unwrap();

        assert_eq!(column.units, "mol m-2");
        assert_eq!(column.dims(), &[DimKind::Time, DimKind::Lat, DimKind::Lon]);
        let expected = 1.0e-9 * 2.0e4 / G / M_AIR;
        assert!((column.values()[0] - expected).abs() / expected < TOL);
    }

    #[test]
    fn test_kg_per_kg_dispatch() {
        let bounds = vec![(900.0, 1000.0)];
        let field = field_4d("kg/kg", 2.0e-6, 1);
        let column = column_integral(&field, &bounds).unwrap();

        assert_eq!(column.units, "kg m-2");
        let expected = 2.0e-6 * 1.0e4 / G;
        assert!((column.values()[0] - expected).abs() / expected < TOL);
    }

    #[test]
    fn test_nan_levels_omitted() {
        let bounds = vec![(900.0, 1000.0), (800.0, 900.0)];
        let mut field = field_4d("kg/kg", 1.0e-6, 2);
        field.values_mut()[0] = f64::NAN; // level 0, first lon
        let column = column_integral(&field, &bounds).unwrap();

        let full = 1.0e-6 * 2.0e4 / G;
        assert!((column.values()[1] - full).abs() / full < TOL);
        assert!((column.values()[0] - full / 2.0).abs() / full < TOL);
    }

    #[test]
    fn test_unsupported_units() {
        let bounds = vec![(900.0, 1000.0)];
        let field = field_4d("K", 300.0, 1);
        assert!(matches!(
            column_integral(&field, &bounds),
            Err(ModelError::UnsupportedUnits { .. })
        ));
    }

    #[test]
    fn test_dataset_integrates_and_skips() {
        let grid = LatLonGrid::uniform(0.5, 2, 1.0, 0.5, 2, 1.0);
        let mut ds = Dataset::new(grid)
            .with_time(vec![YearMonth::new(2038, 1)])
            .with_levels(vec![950.0, 850.0], Some(vec![(900.0, 1000.0), (800.0, 900.0)]));
        ds.push_field(
            Field::new(
                "CLY",
                "mol/mol",
                vec![DimKind::Time, DimKind::Lev, DimKind::Lat, DimKind::Lon],
                vec![1, 2, 2, 2],
                vec![1.0e-9; 8],
            )
            .unwrap(),
        )
        .unwrap();
        // Temperature is on the level grid but not a mixing ratio.
        ds.push_field(
            Field::new(
                "T",
                "K",
                vec![DimKind::Time, DimKind::Lev, DimKind::Lat, DimKind::Lon],
                vec![1, 2, 2, 2],
                vec![270.0; 8],
            )
            .unwrap(),
        )
        .unwrap();

        let out = column_dataset(&ds).unwrap();
        assert!(out.field("CLY").is_some());
        assert_eq!(out.field("CLY").unwrap().rank(), 3);
        assert!(out.field("T").is_none());
    }

    #[test]
    fn test_missing_bounds_is_error() {
        let grid = LatLonGrid::uniform(0.5, 2, 1.0, 0.5, 2, 1.0);
        let ds = Dataset::new(grid).with_time(vec![YearMonth::new(2038, 1)]);
        assert!(matches!(
            column_dataset(&ds),
            Err(ModelError::MissingLevelBounds)
        ));
    }
}
