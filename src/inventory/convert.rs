//! Sector merging and unit conversion for emission inventories.

use log::warn;

use crate::grid::{Dataset, DimKind, Field, LatLonGrid};
use crate::inventory::{InventoryError, Species};
use crate::types::YearMonth;

/// Megagrams (tonnes) to kilograms.
const KG_PER_MG: f64 = 1000.0;
/// Kilograms per teragram.
const KG_PER_TG: f64 = 1.0e9;

/// Sum the per-sector fields of a species into one total field.
///
/// Missing sectors are logged and skipped; a cell is NaN only when every
/// present sector is NaN there. Errors when no sector field exists at
/// all.
pub fn merge_sectors(ds: &Dataset, species: Species) -> Result<Field, InventoryError> {
    let mut total: Option<Field> = None;

    for name in species.sector_names() {
        let Some(sector) = ds.field(&name) else {
            warn!("sector '{}' missing, skipped", name);
            continue;
        };
        total = Some(match total {
            None => {
                let mut first = sector.clone();
                first.name = species.total_name();
                first
            }
            Some(sum) => sum.zip_with(
                sector,
                species.total_name(),
                &sum.units,
                nan_aware_add,
            )?,
        });
    }

    let mut total = total.ok_or(InventoryError::NoSectors(match species {
        Species::Hcl => "HCl",
        Species::Pcl => "pCl",
    }))?;
    total.long_name = Some(format!("total {} emission, all sectors", species));
    Ok(total)
}

fn nan_aware_add(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::NAN,
        (true, false) => b,
        (false, true) => a,
        (false, false) => a + b,
    }
}

/// Convert Mg per grid cell per month to kg m-2 s-1.
///
/// `times` must match the field's time axis; each monthly slab is scaled
/// by `1000 / cell_area / seconds_in_month` on the 365-day calendar.
pub fn mg_per_cell_to_flux(
    field: &Field,
    grid: &LatLonGrid,
    times: &[YearMonth],
) -> Result<Field, InventoryError> {
    scale_monthly(field, grid, times, |area, seconds| KG_PER_MG / (area * seconds))
        .map(|mut out| {
            out.units = "kg m-2 s-1".to_string();
            out
        })
}

/// Inverse of [`mg_per_cell_to_flux`]: kg m-2 s-1 back to Mg per cell
/// per month.
pub fn flux_to_mg_per_cell(
    field: &Field,
    grid: &LatLonGrid,
    times: &[YearMonth],
) -> Result<Field, InventoryError> {
    scale_monthly(field, grid, times, |area, seconds| area * seconds / KG_PER_MG)
        .map(|mut out| {
            out.units = "Mg/grid/month".to_string();
            out
        })
}

/// Scale each monthly slab by a per-cell factor of (area, seconds).
fn scale_monthly(
    field: &Field,
    grid: &LatLonGrid,
    times: &[YearMonth],
    factor: impl Fn(f64, f64) -> f64,
) -> Result<Field, InventoryError> {
    check_monthly(field, times)?;
    let areas = grid.cell_areas();

    let mut out = field.clone();
    for (slab, ym) in out.horizontal_slabs_mut().zip(times) {
        let seconds = ym.seconds();
        for (value, &area) in slab.iter_mut().zip(&areas) {
            *value *= factor(area, seconds);
        }
    }
    Ok(out)
}

/// Annual inventory totals in Tg from a flux field.
///
/// Sums `flux * area * seconds` over the grid and the months of each
/// year present on the time axis; NaN cells contribute nothing. Partial
/// years are totalled over the months available.
pub fn annual_totals_tg(
    flux: &Field,
    times: &[YearMonth],
    grid: &LatLonGrid,
) -> Result<Vec<(i32, f64)>, InventoryError> {
    check_monthly(flux, times)?;
    let areas = grid.cell_areas();

    let mut totals: Vec<(i32, f64)> = Vec::new();
    for (slab, ym) in flux.horizontal_slabs().zip(times) {
        let seconds = ym.seconds();
        let mut month_kg = 0.0;
        for (&value, &area) in slab.iter().zip(&areas) {
            if !value.is_nan() {
                month_kg += value * area * seconds;
            }
        }
        match totals.last_mut() {
            Some((year, total)) if *year == ym.year => *total += month_kg / KG_PER_TG,
            _ => totals.push((ym.year, month_kg / KG_PER_TG)),
        }
    }
    Ok(totals)
}

fn check_monthly(field: &Field, times: &[YearMonth]) -> Result<(), InventoryError> {
    if field.dims() != [DimKind::Time, DimKind::Lat, DimKind::Lon] {
        return Err(InventoryError::NotMonthly(field.name.clone()));
    }
    let n_time = field.shape()[0];
    if n_time != times.len() {
        return Err(InventoryError::TimeMismatch {
            name: field.name.clone(),
            expected: times.len(),
            got: n_time,
        });
    }
    Ok(())
}
