//! Provincial emission totals from masked flux fields.

use crate::grid::{DimKind, Field, LatLonGrid};
use crate::inventory::InventoryError;
use crate::regions::ProvinceMask;
use crate::types::YearMonth;

/// Mean seconds per month used by the provincial tables
/// (30.44 days, the Gregorian mean month).
pub const SECONDS_PER_MONTH_MEAN: f64 = 30.44 * 24.0 * 3600.0;

/// Months at the end of the series during which the waste-open sector is
/// excluded (phase-out scenario).
const WSTOP_CUTOFF_MONTHS: usize = 12;

/// Monthly emission totals for one province.
#[derive(Clone, Debug)]
pub struct ProvinceTotals {
    /// Province name.
    pub name: String,
    /// Polygon area in km2.
    pub area_km2: f64,
    /// Emission per month in kg (flux integrated over the province).
    pub monthly_kg: Vec<f64>,
}

impl ProvinceTotals {
    /// Mean over all months, in kg.
    pub fn mean_kg(&self) -> f64 {
        if self.monthly_kg.is_empty() {
            0.0
        } else {
            self.monthly_kg.iter().sum::<f64>() / self.monthly_kg.len() as f64
        }
    }
}

/// Integrate a flux field over each province, per month.
///
/// For every month, `sum(flux * cell_area) * seconds_per_month` over the
/// cells inside the province; NaN cells count as zero. When `wstop` is
/// given, its contribution is subtracted during the final 12 months of
/// the series.
pub fn province_monthly_totals(
    total: &Field,
    wstop: Option<&Field>,
    times: &[YearMonth],
    masks: &[ProvinceMask],
    grid: &LatLonGrid,
) -> Result<Vec<ProvinceTotals>, InventoryError> {
    check_flux(total, times)?;
    if let Some(wstop) = wstop {
        check_flux(wstop, times)?;
    }
    let areas = grid.cell_areas();
    let cutoff = times.len().saturating_sub(WSTOP_CUTOFF_MONTHS);

    let mut out: Vec<ProvinceTotals> = masks
        .iter()
        .map(|p| ProvinceTotals {
            name: p.name.clone(),
            area_km2: p.area_km2,
            monthly_kg: Vec::with_capacity(times.len()),
        })
        .collect();

    let wstop_slabs: Option<Vec<&[f64]>> = wstop.map(|w| w.horizontal_slabs().collect());
    for (t, slab) in total.horizontal_slabs().enumerate() {
        for (province, totals) in masks.iter().zip(&mut out) {
            let mut rate = province.mask.weighted_sum(slab, &areas);
            if t >= cutoff {
                if let Some(slabs) = &wstop_slabs {
                    rate -= province.mask.weighted_sum(slabs[t], &areas);
                }
            }
            totals.monthly_kg.push(rate * SECONDS_PER_MONTH_MEAN);
        }
    }
    Ok(out)
}

/// Inventory years sampled for the long-term provincial table
/// (every 4th year from 1962 through 2018).
pub fn long_term_years() -> Vec<i32> {
    (1962..=2018).step_by(4).collect()
}

fn check_flux(field: &Field, times: &[YearMonth]) -> Result<(), InventoryError> {
    if field.dims() != [DimKind::Time, DimKind::Lat, DimKind::Lon] {
        return Err(InventoryError::NotMonthly(field.name.clone()));
    }
    if field.shape()[0] != times.len() {
        return Err(InventoryError::TimeMismatch {
            name: field.name.clone(),
            expected: times.len(),
            got: field.shape()[0],
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{BoundaryRegion, BoundarySet};
    use crate::regions::province_masks;
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

    fn flux_field(n_time: usize, value: f64) -> Field {
        Field::new(
            "HCl_total",
            "kg m-2 s-1",
            vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
            vec![n_time, 3, 3],
            vec![value; n_time * 9],
        )
        .unwrap()
    }

    fn setup() -> (LatLonGrid, Vec<ProvinceMask>, Vec<YearMonth>) {
        let grid = LatLonGrid::uniform(0.5, 3, 1.0, 0.5, 3, 1.0);
        let set = BoundarySet::from_regions(vec![
            BoundaryRegion::new("A", MultiPolygon(vec![square(0.0, 0.0, 2.0)])).unwrap(),
        ]);
        let masks = province_masks(&set, &grid);
        let times: Vec<YearMonth> = (0..14)
            .map(|i| YearMonth::new(2017 + i / 12, (i % 12) as u32 + 1))
            .collect();
        (grid, masks, times)
    }

    #[test]
    fn test_totals_integrate_flux() {
        let (grid, masks, times) = setup();
        let total = flux_field(14, 1.0e-9);

        let out = province_monthly_totals(&total, None, &times, &masks, &grid).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].monthly_kg.len(), 14);

        // 4 cells inside; every month the same.
        let areas = grid.cell_areas();
        let expected = (areas[0] + areas[1] + areas[3] + areas[4])
            * 1.0e-9
            * SECONDS_PER_MONTH_MEAN;
        assert!((out[0].monthly_kg[0] - expected).abs() / expected < 1e-12);
        assert!((out[0].mean_kg() - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn test_wstop_excluded_in_final_year() {
        let (grid, masks, times) = setup();
        let total = flux_field(14, 2.0e-9);
        let wstop = flux_field(14, 0.5e-9);

        let out =
            province_monthly_totals(&total, Some(&wstop), &times, &masks, &grid).unwrap();
        let series = &out[0].monthly_kg;
        // First two months keep the full total, the final 12 drop wstop.
        assert!(series[0] > series[2]);
        assert!((series[0] / series[2] - 2.0 / 1.5).abs() < 1e-9);
        assert!((series[2] - series[13]).abs() < 1e-9);
    }

    #[test]
    fn test_nan_counts_as_zero() {
        let (grid, masks, times) = setup();
        let mut total = flux_field(14, 1.0e-9);
        for v in total.values_mut().iter_mut() {
            *v = f64::NAN;
        }
        let out = province_monthly_totals(&total, None, &times, &masks, &grid).unwrap();
        assert!(out[0].monthly_kg.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_long_term_years() {
        let years = long_term_years();
        assert_eq!(years.first(), Some(&1962));
        assert_eq!(years.last(), Some(&2018));
        assert_eq!(years.len(), 15);
        assert!(years.windows(2).all(|w| w[1] - w[0] == 4));
    }
}
