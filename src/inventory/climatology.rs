//! Multi-year monthly climatology.

use crate::grid::{DimKind, Field};
use crate::inventory::InventoryError;
use crate::types::YearMonth;

/// Mean over years for each calendar month.
///
/// Returns a field with 12 time steps in January..December order. A
/// month with no data in any year is NaN; NaN cells are omitted from
/// the mean like everywhere else.
pub fn monthly_climatology(
    field: &Field,
    times: &[YearMonth],
) -> Result<Field, InventoryError> {
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

    let slab_len = field.horizontal_len();
    let mut sums = vec![0.0; 12 * slab_len];
    let mut counts = vec![0usize; 12 * slab_len];

    for (slab, ym) in field.horizontal_slabs().zip(times) {
        let base = (ym.month - 1) as usize * slab_len;
        for (offset, &value) in slab.iter().enumerate() {
            if !value.is_nan() {
                sums[base + offset] += value;
                counts[base + offset] += 1;
            }
        }
    }

    let data: Vec<f64> = sums
        .into_iter()
        .zip(counts)
        .map(|(s, n)| if n > 0 { s / n as f64 } else { f64::NAN })
        .collect();

    let mut shape = field.shape().to_vec();
    shape[0] = 12;
    let mut out = Field::new(&field.name, &field.units, field.dims().to_vec(), shape, data)?;
    out.long_name = Some(match &field.long_name {
        Some(long_name) => format!("{}, monthly climatology", long_name),
        None => format!("{}, monthly climatology", field.name),
    });
    Ok(out)
}

/// The placeholder time axis written with a climatology (year 1, one
/// entry per calendar month).
pub fn climatology_time_axis() -> Vec<YearMonth> {
    (1..=12).map(|m| YearMonth::new(1, m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_climatology_averages_years() {
        // Two years of data on a single cell: value = year offset + month.
        let times: Vec<YearMonth> = (0..24)
            .map(|i| YearMonth::new(2017 + i / 12, (i % 12) as u32 + 1))
            .collect();
        let data: Vec<f64> = (0..24)
            .map(|i| (i / 12 * 100 + i % 12) as f64)
            .collect();
        let field = Field::new(
            "x",
            "",
            vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
            vec![24, 1, 1],
            data,
        )
        .unwrap();

        let clim = monthly_climatology(&field, &times).unwrap();
        assert_eq!(clim.shape(), &[12, 1, 1]);
        // January: mean of 0 and 100.
        assert_eq!(clim.values()[0], 50.0);
        // December: mean of 11 and 111.
        assert_eq!(clim.values()[11], 61.0);
    }

    #[test]
    fn test_partial_year_and_nan() {
        // 13 months: two Januaries, the first one NaN.
        let times: Vec<YearMonth> = (0..13)
            .map(|i| YearMonth::new(2017 + i / 12, (i % 12) as u32 + 1))
            .collect();
        let mut data: Vec<f64> = (0..13).map(|i| i as f64).collect();
        data[0] = f64::NAN;
        let field = Field::new(
            "x",
            "",
            vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
            vec![13, 1, 1],
            data,
        )
        .unwrap();

        let clim = monthly_climatology(&field, &times).unwrap();
        // Only the second January is valid.
        assert_eq!(clim.values()[0], 12.0);
        // February has a single year.
        assert_eq!(clim.values()[1], 1.0);
    }

    #[test]
    fn test_time_axis() {
        let axis = climatology_time_axis();
        assert_eq!(axis.len(), 12);
        assert_eq!(axis[0], YearMonth::new(1, 1));
        assert_eq!(axis[11], YearMonth::new(1, 12));
    }
}
