//! Area-weighted spatial means.

use log::warn;

use crate::analysis::AnalysisError;
use crate::grid::{Dataset, DimKind, Field, LatLonGrid};
use crate::io::TimeTable;
use crate::regions::RegionMask;

/// The spatial mean of one field, shaped by its rank.
#[derive(Clone, Debug)]
pub enum FieldMean {
    /// Field without horizontal dimensions, values passed through.
    Copied(Vec<f64>),
    /// Mean of a single `[Lat, Lon]` map.
    Scalar(f64),
    /// Mean per time step of a `[Time, Lat, Lon]` field.
    TimeSeries(Vec<f64>),
    /// Mean per time step and level of a `[Time, Lev, Lat, Lon]` field,
    /// time-major.
    Levels { n_lev: usize, values: Vec<f64> },
}

/// Compute the area-weighted spatial mean of a field.
///
/// Weights are the spherical cell areas of `grid`; NaN cells are
/// omitted from both the numerator and the weight sum. With a mask,
/// only cells inside the region contribute. A step whose cells are all
/// NaN (or all outside the mask) yields NaN.
pub fn fldmean(
    field: &Field,
    grid: &LatLonGrid,
    mask: Option<&RegionMask>,
) -> Result<FieldMean, AnalysisError> {
    if !field.is_horizontal() {
        return Ok(FieldMean::Copied(field.values().to_vec()));
    }
    if field.horizontal_len() != grid.n_cells() {
        return Err(AnalysisError::Grid(crate::grid::GridError::ShapeMismatch {
            name: field.name.clone(),
            expected: grid.n_cells(),
            got: field.horizontal_len(),
        }));
    }

    let areas = grid.cell_areas();
    let flags = mask.map(RegionMask::flags);
    let means: Vec<f64> = field
        .horizontal_slabs()
        .map(|slab| weighted_mean(slab, &areas, flags))
        .collect();

    match field.dims() {
        [DimKind::Lat, DimKind::Lon] => Ok(FieldMean::Scalar(means[0])),
        [DimKind::Time, DimKind::Lat, DimKind::Lon] => Ok(FieldMean::TimeSeries(means)),
        [DimKind::Time, DimKind::Lev, DimKind::Lat, DimKind::Lon] => Ok(FieldMean::Levels {
            n_lev: field.shape()[1],
            values: means,
        }),
        [DimKind::Lev, DimKind::Lat, DimKind::Lon] => Ok(FieldMean::Levels {
            n_lev: field.shape()[0],
            values: means,
        }),
        dims => Err(AnalysisError::Mismatch(format!(
            "'{}' has unsupported dimensions {:?}",
            field.name, dims
        ))),
    }
}

fn weighted_mean(slab: &[f64], areas: &[f64], flags: Option<&[bool]>) -> f64 {
    let mut sum = 0.0;
    let mut weight = 0.0;
    for (cell, (&v, &a)) in slab.iter().zip(areas).enumerate() {
        if let Some(flags) = flags {
            if !flags[cell] {
                continue;
            }
        }
        if v.is_nan() {
            continue;
        }
        sum += v * a;
        weight += a;
    }
    if weight > 0.0 { sum / weight } else { f64::NAN }
}

/// Field-mean tables for a whole dataset.
#[derive(Clone, Debug)]
pub struct FldmeanTables {
    /// One column per variable; for 4-D variables the series at the
    /// lowest model level (last level index).
    pub combined: TimeTable,
    /// For each 4-D variable, a table with one `level_<k>` column per
    /// model level.
    pub levels: Vec<(String, TimeTable)>,
}

/// Compute field-mean time series for every variable of a dataset.
///
/// Variables whose rank the mean does not support are logged and
/// skipped.
pub fn fldmean_dataset(
    ds: &Dataset,
    mask: Option<&RegionMask>,
) -> Result<FldmeanTables, AnalysisError> {
    let mut combined = TimeTable::new(ds.time.clone());
    let mut levels = Vec::new();

    for field in ds.fields() {
        let mean = match fldmean(field, &ds.grid, mask) {
            Ok(mean) => mean,
            Err(AnalysisError::Mismatch(reason)) => {
                warn!("skipping '{}': {}", field.name, reason);
                continue;
            }
            Err(e) => return Err(e),
        };
        match mean {
            FieldMean::TimeSeries(series) => {
                combined.push_column(&field.name, series)?;
            }
            FieldMean::Levels { n_lev, values } => {
                let n_time = values.len() / n_lev;
                let mut table = TimeTable::new(ds.time.clone());
                for k in 0..n_lev {
                    let column: Vec<f64> =
                        (0..n_time).map(|t| values[t * n_lev + k]).collect();
                    table.push_column(&format!("level_{}", k + 1), column)?;
                }
                // Surface series: the lowest model level is stored last.
                let surface: Vec<f64> =
                    (0..n_time).map(|t| values[t * n_lev + n_lev - 1]).collect();
                combined.push_column(&field.name, surface)?;
                levels.push((field.name.clone(), table));
            }
            FieldMean::Scalar(_) | FieldMean::Copied(_) => {
                warn!("skipping '{}': no time dimension", field.name);
            }
        }
    }

    Ok(FldmeanTables { combined, levels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::YearMonth;

    const TOL: f64 = 1e-12;

    fn grid_2x2() -> LatLonGrid {
        LatLonGrid::uniform(0.5, 2, 1.0, 10.0, 2, 20.0)
    }

    #[test]
    fn test_uniform_field_mean_is_value() {
        let grid = grid_2x2();
        let field = Field::new(
            "CLY",
            "mol/mol",
            vec![DimKind::Lat, DimKind::Lon],
            vec![2, 2],
            vec![3.5; 4],
        )
        .unwrap();
        match fldmean(&field, &grid, None).unwrap() {
            FieldMean::Scalar(v) => assert!((v - 3.5).abs() < TOL),
            other => panic!("expected a scalar, got {:?}", other),
        }
    }

    #[test]
    fn test_area_weighting() {
        // Two latitude rows of different area, one value each.
        let grid = grid_2x2();
        let areas = grid.cell_areas();
        let field = Field::new(
            "v",
            "1",
            vec![DimKind::Lat, DimKind::Lon],
            vec![2, 2],
            vec![1.0, 1.0, 3.0, 3.0],
        )
        .unwrap();
        let expected = (2.0 * areas[0] + 3.0 * 2.0 * areas[2]) / (2.0 * areas[0] + 2.0 * areas[2]);
        match fldmean(&field, &grid, None).unwrap() {
            FieldMean::Scalar(v) => assert!((v - expected).abs() < TOL),
            other => panic!("expected a scalar, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_cells_omitted() {
        let grid = grid_2x2();
        let field = Field::new(
            "v",
            "1",
            vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
            vec![2, 2, 2],
            vec![
                2.0,
                f64::NAN,
                2.0,
                2.0,
                f64::NAN,
                f64::NAN,
                f64::NAN,
                f64::NAN,
            ],
        )
        .unwrap();
        match fldmean(&field, &grid, None).unwrap() {
            FieldMean::TimeSeries(series) => {
                assert!((series[0] - 2.0).abs() < TOL);
                assert!(series[1].is_nan());
            }
            other => panic!("expected a time series, got {:?}", other),
        }
    }

    #[test]
    fn test_masked_mean() {
        let grid = grid_2x2();
        let mask = RegionMask::from_flags(grid.clone(), vec![true, false, false, false]);
        let field = Field::new(
            "v",
            "1",
            vec![DimKind::Lat, DimKind::Lon],
            vec![2, 2],
            vec![7.0, 1.0, 1.0, 1.0],
        )
        .unwrap();
        match fldmean(&field, &grid, Some(&mask)).unwrap() {
            FieldMean::Scalar(v) => assert!((v - 7.0).abs() < TOL),
            other => panic!("expected a scalar, got {:?}", other),
        }
    }

    #[test]
    fn test_dataset_tables() {
        let grid = grid_2x2();
        let times = vec![YearMonth::new(2038, 1), YearMonth::new(2038, 2)];
        let mut ds = Dataset::new(grid)
            .with_time(times)
            .with_levels(vec![850.0, 1000.0], None);
        ds.push_field(
            Field::new(
                "surface",
                "1",
                vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
                vec![2, 2, 2],
                vec![1.0; 8],
            )
            .unwrap(),
        )
        .unwrap();
        ds.push_field(
            Field::new(
                "CLY",
                "mol/mol",
                vec![DimKind::Time, DimKind::Lev, DimKind::Lat, DimKind::Lon],
                vec![2, 2, 2, 2],
                // Level 0 holds 10, level 1 (surface) holds 20.
                vec![
                    10.0, 10.0, 10.0, 10.0, 20.0, 20.0, 20.0, 20.0, //
                    10.0, 10.0, 10.0, 10.0, 20.0, 20.0, 20.0, 20.0,
                ],
            )
            .unwrap(),
        )
        .unwrap();

        let tables = fldmean_dataset(&ds, None).unwrap();
        assert_eq!(tables.combined.column_names(), &["surface", "CLY"]);
        assert!((tables.combined.column("CLY").unwrap()[0] - 20.0).abs() < TOL);

        assert_eq!(tables.levels.len(), 1);
        let (name, levels) = &tables.levels[0];
        assert_eq!(name, "CLY");
        assert_eq!(levels.column_names(), &["level_1", "level_2"]);
        assert!((levels.column("level_1").unwrap()[1] - 10.0).abs() < TOL);
    }
}
