//! Yearly and seasonal grouping of monthly series and fields.

use crate::analysis::AnalysisError;
use crate::grid::{DimKind, Field};
use crate::types::{Season, YearMonth};

/// Group a monthly series by calendar year and average each year.
///
/// A trailing partial year is dropped; NaN months are omitted from the
/// year's mean. Returns the years and their means in order.
pub fn yearly_means(
    times: &[YearMonth],
    values: &[f64],
) -> Result<(Vec<i32>, Vec<f64>), AnalysisError> {
    let groups = year_groups(times, values.len())?;
    let mut years = Vec::with_capacity(groups.len());
    let mut means = Vec::with_capacity(groups.len());
    for (year, indices) in groups {
        years.push(year);
        means.push(nan_mean(indices.iter().map(|&i| values[i])));
    }
    Ok((years, means))
}

/// Group a monthly series by season and average each season-year.
///
/// December counts towards the following winter, so DJF 2038 covers
/// December 2037 through February 2038. Partial seasons at the edges of
/// the series keep the months they have.
pub fn seasonal_means(
    times: &[YearMonth],
    values: &[f64],
    season: Season,
) -> Result<(Vec<i32>, Vec<f64>), AnalysisError> {
    let groups = season_groups(times, values.len(), season)?;
    let mut years = Vec::with_capacity(groups.len());
    let mut means = Vec::with_capacity(groups.len());
    for (year, indices) in groups {
        years.push(year);
        means.push(nan_mean(indices.iter().map(|&i| values[i])));
    }
    Ok((years, means))
}

/// Relative deviation between the final years of two yearly series:
/// `(mean_tail(a) - mean_tail(b)) / mean_tail(b)`.
pub fn deviation_rate(a: &[f64], b: &[f64], tail_years: usize) -> f64 {
    let tail_a = &a[a.len().saturating_sub(tail_years)..];
    let tail_b = &b[b.len().saturating_sub(tail_years)..];
    let mean_a = nan_mean(tail_a.iter().copied());
    let mean_b = nan_mean(tail_b.iter().copied());
    (mean_a - mean_b) / mean_b
}

/// Per-cell annual means of a monthly `[Time, Lat, Lon]` field.
///
/// One time step per complete calendar year; a trailing partial year is
/// dropped. Returns the years alongside the averaged field.
pub fn annual_mean_field(
    field: &Field,
    times: &[YearMonth],
) -> Result<(Vec<i32>, Field), AnalysisError> {
    let groups = year_groups(times, monthly_len(field, times)?)?;
    grouped_mean_field(field, &groups)
}

/// Per-cell seasonal means of a monthly `[Time, Lat, Lon]` field, one
/// time step per season-year.
pub fn seasonal_mean_field(
    field: &Field,
    times: &[YearMonth],
    season: Season,
) -> Result<(Vec<i32>, Field), AnalysisError> {
    let groups = season_groups(times, monthly_len(field, times)?, season)?;
    grouped_mean_field(field, &groups)
}

fn monthly_len(field: &Field, times: &[YearMonth]) -> Result<usize, AnalysisError> {
    if field.dims() != [DimKind::Time, DimKind::Lat, DimKind::Lon] {
        return Err(AnalysisError::Mismatch(format!(
            "'{}' is not a monthly [time, lat, lon] field",
            field.name
        )));
    }
    if field.shape()[0] != times.len() {
        return Err(AnalysisError::Mismatch(format!(
            "'{}' has {} time steps, axis has {}",
            field.name,
            field.shape()[0],
            times.len()
        )));
    }
    Ok(times.len())
}

fn grouped_mean_field(
    field: &Field,
    groups: &[(i32, Vec<usize>)],
) -> Result<(Vec<i32>, Field), AnalysisError> {
    let slab_len = field.horizontal_len();
    let slabs: Vec<&[f64]> = field.horizontal_slabs().collect();

    let mut data = Vec::with_capacity(groups.len() * slab_len);
    for (_, indices) in groups {
        for cell in 0..slab_len {
            data.push(nan_mean(indices.iter().map(|&t| slabs[t][cell])));
        }
    }

    let years: Vec<i32> = groups.iter().map(|&(year, _)| year).collect();
    let shape = vec![groups.len(), field.shape()[1], field.shape()[2]];
    let mut out = Field::new(
        &field.name,
        &field.units,
        vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
        shape,
        data,
    )
    .map_err(AnalysisError::Grid)?;
    out.long_name = field.long_name.clone();
    Ok((years, out))
}

fn year_groups(
    times: &[YearMonth],
    n_values: usize,
) -> Result<Vec<(i32, Vec<usize>)>, AnalysisError> {
    check_lengths(times, n_values)?;
    let mut groups: Vec<(i32, Vec<usize>)> = Vec::new();
    for (i, ym) in times.iter().enumerate() {
        match groups.last_mut() {
            Some((year, indices)) if *year == ym.year => indices.push(i),
            _ => groups.push((ym.year, vec![i])),
        }
    }
    if let Some((_, indices)) = groups.last() {
        if indices.len() < 12 {
            groups.pop();
        }
    }
    Ok(groups)
}

fn season_groups(
    times: &[YearMonth],
    n_values: usize,
    season: Season,
) -> Result<Vec<(i32, Vec<usize>)>, AnalysisError> {
    check_lengths(times, n_values)?;
    let mut groups: Vec<(i32, Vec<usize>)> = Vec::new();
    for (i, ym) in times.iter().enumerate() {
        if ym.season() != season {
            continue;
        }
        let year = ym.season_year();
        match groups.last_mut() {
            Some((group_year, indices)) if *group_year == year => indices.push(i),
            _ => groups.push((year, vec![i])),
        }
    }
    Ok(groups)
}

fn check_lengths(times: &[YearMonth], n_values: usize) -> Result<(), AnalysisError> {
    if times.len() != n_values {
        return Err(AnalysisError::Mismatch(format!(
            "{} time stamps for {} values",
            times.len(),
            n_values
        )));
    }
    Ok(())
}

fn nan_mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count > 0 { sum / count as f64 } else { f64::NAN }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn monthly_axis(start_year: i32, n_months: usize) -> Vec<YearMonth> {
        let mut times = Vec::with_capacity(n_months);
        let mut ym = YearMonth::new(start_year, 1);
        for _ in 0..n_months {
            times.push(ym);
            ym = ym.next();
        }
        times
    }

    #[test]
    fn test_yearly_means_drop_partial_tail() {
        // Two full years plus three months of a third.
        let times = monthly_axis(2037, 27);
        let values: Vec<f64> = (0..27).map(|i| i as f64).collect();

        let (years, means) = yearly_means(&times, &values).unwrap();
        assert_eq!(years, vec![2037, 2038]);
        assert!((means[0] - 5.5).abs() < TOL);
        assert!((means[1] - 17.5).abs() < TOL);
    }

    #[test]
    fn test_yearly_means_omit_nan() {
        let times = monthly_axis(2037, 12);
        let mut values = vec![2.0; 12];
        values[3] = f64::NAN;
        let (_, means) = yearly_means(&times, &values).unwrap();
        assert!((means[0] - 2.0).abs() < TOL);
    }

    #[test]
    fn test_winter_crosses_the_year_boundary() {
        let times = monthly_axis(2037, 24);
        let values: Vec<f64> = (0..24).map(|i| i as f64).collect();

        let (years, means) = seasonal_means(&times, &values, Season::Djf).unwrap();
        // Jan/Feb 2037 form a partial winter, then Dec 2037 + Jan/Feb
        // 2038, then the lone Dec 2038.
        assert_eq!(years, vec![2037, 2038, 2039]);
        assert!((means[0] - 0.5).abs() < TOL);
        assert!((means[1] - (11.0 + 12.0 + 13.0) / 3.0).abs() < TOL);
        assert!((means[2] - 23.0).abs() < TOL);
    }

    #[test]
    fn test_summer_means() {
        let times = monthly_axis(2037, 12);
        let values: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let (years, means) = seasonal_means(&times, &values, Season::Jja).unwrap();
        assert_eq!(years, vec![2037]);
        assert!((means[0] - 6.0).abs() < TOL);
    }

    #[test]
    fn test_deviation_rate() {
        let a = vec![0.0, 0.0, 12.0, 12.0, 12.0, 12.0, 12.0];
        let b = vec![0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 10.0];
        assert!((deviation_rate(&a, &b, 5) - 0.2).abs() < TOL);
    }

    #[test]
    fn test_annual_mean_field() {
        let times = monthly_axis(2037, 13);
        let mut data = Vec::new();
        for t in 0..13 {
            data.extend_from_slice(&[t as f64, 100.0 + t as f64]);
        }
        let field = Field::new(
            "v",
            "1",
            vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
            vec![13, 1, 2],
            data,
        )
        .unwrap();

        let (years, mean) = annual_mean_field(&field, &times).unwrap();
        assert_eq!(years, vec![2037]);
        assert_eq!(mean.shape(), &[1, 1, 2]);
        assert!((mean.values()[0] - 5.5).abs() < TOL);
        assert!((mean.values()[1] - 105.5).abs() < TOL);
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let times = monthly_axis(2037, 12);
        let values = vec![1.0; 10];
        assert!(matches!(
            yearly_means(&times, &values),
            Err(AnalysisError::Mismatch(_))
        ));
    }
}
