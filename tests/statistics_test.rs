//! Integration tests for the statistics stages.
//!
//! Covers field means over a dataset, yearly and seasonal grouping,
//! the Welch significance maps, tail-ratio comparisons, and the CSV
//! round trip between the stages.

use clpost_rs::analysis::{
    DEFAULT_TAIL_MONTHS, FieldMean, deviation_rate, fldmean, fldmean_dataset,
    seasonal_mean_field, significance_mask, tail_ratio_summary, welch_p_field, yearly_means,
};
use clpost_rs::grid::{Dataset, DimKind, Field, LatLonGrid};
use clpost_rs::io::TimeTable;
use clpost_rs::types::{Season, YearMonth};
use tempfile::TempDir;

const TOL: f64 = 1e-9;

fn monthly_axis(start_year: i32, n_months: usize) -> Vec<YearMonth> {
    let mut times = Vec::with_capacity(n_months);
    let mut ym = YearMonth::new(start_year, 1);
    for _ in 0..n_months {
        times.push(ym);
        ym = ym.next();
    }
    times
}

/// A two-variable dataset whose values grow linearly with the month.
fn trending_dataset(n_months: usize) -> Dataset {
    let grid = LatLonGrid::uniform(100.5, 2, 1.0, 30.5, 2, 1.0);
    let mut ds = Dataset::new(grid).with_time(monthly_axis(2017, n_months));
    for (name, offset) in [("CLY", 0.0), ("HCL", 10.0)] {
        let mut data = Vec::with_capacity(n_months * 4);
        for t in 0..n_months {
            data.extend(std::iter::repeat(offset + t as f64).take(4));
        }
        ds.push_field(
            Field::new(
                name,
                "mol/mol",
                vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
                vec![n_months, 2, 2],
                data,
            )
            .unwrap(),
        )
        .unwrap();
    }
    ds
}

#[test]
fn test_fldmean_through_csv_and_back() {
    let dir = TempDir::new().unwrap();
    let ds = trending_dataset(25);

    let tables = fldmean_dataset(&ds, None).unwrap();
    let path = dir.path().join("fldmean.csv");
    tables.combined.write_csv(&path).unwrap();

    let back = TimeTable::read_csv(&path).unwrap();
    assert_eq!(back.n_rows(), 25);
    assert_eq!(back.column_names(), tables.combined.column_names());
    let series = back.column("CLY").unwrap();
    assert!((series[3] - 3.0).abs() < TOL);
    assert_eq!(back.times()[0], YearMonth::new(2017, 1));
}

#[test]
fn test_yearly_grouping_after_fldmean() {
    // 25 months: two full years plus a January that must be dropped.
    let ds = trending_dataset(25);
    let FieldMean::TimeSeries(series) = fldmean(ds.field("CLY").unwrap(), &ds.grid, None).unwrap()
    else {
        panic!("expected a time series");
    };

    let (years, means) = yearly_means(&ds.time, &series).unwrap();
    assert_eq!(years, vec![2017, 2018]);
    assert!((means[0] - 5.5).abs() < TOL);
    assert!((means[1] - 17.5).abs() < TOL);

    let rate = deviation_rate(&means, &[5.0, 17.5], 1);
    assert!(rate.abs() < TOL);
}

#[test]
fn test_seasonal_samples_feed_welch() {
    let n_months = 60;
    let grid = LatLonGrid::uniform(100.5, 2, 1.0, 30.5, 1, 1.0);
    let times = monthly_axis(2017, n_months);

    // Cell 0 differs by a constant offset between the cases, cell 1 is
    // identical; a mild trend keeps the variances nonzero.
    let build = |offset: f64| {
        let mut data = Vec::with_capacity(n_months * 2);
        for t in 0..n_months {
            let trend = t as f64 * 0.01;
            data.push(offset + trend);
            data.push(1.0 + trend);
        }
        Field::new(
            "CLY",
            "mol/mol",
            vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
            vec![n_months, 1, 2],
            data,
        )
        .unwrap()
    };
    let a = build(50.0);
    let b = build(1.0);

    let (years_a, samples_a) = seasonal_mean_field(&a, &times, Season::Jja).unwrap();
    let (years_b, samples_b) = seasonal_mean_field(&b, &times, Season::Jja).unwrap();
    assert_eq!(years_a, years_b);
    assert_eq!(samples_a.shape()[0], 5);

    let p = welch_p_field(&samples_a, &samples_b).unwrap();
    let flags = significance_mask(&p, 0.05);
    assert_eq!(flags, vec![true, false]);
}

#[test]
fn test_tail_ratio_between_cases() {
    let times = monthly_axis(2038, DEFAULT_TAIL_MONTHS);
    let mut s1 = TimeTable::new(times.clone());
    let mut ssp = TimeTable::new(times);
    s1.push_column("CLY", vec![3.0; DEFAULT_TAIL_MONTHS]).unwrap();
    ssp.push_column("CLY", vec![2.0; DEFAULT_TAIL_MONTHS]).unwrap();

    let summaries = tail_ratio_summary(&s1, &ssp, DEFAULT_TAIL_MONTHS).unwrap();
    assert_eq!(summaries.len(), 1);
    assert!((summaries[0].mean - 1.5).abs() < TOL);
    assert!((summaries[0].max - summaries[0].min).abs() < TOL);
}

#[test]
fn test_masked_and_cropped_means_agree() {
    use clpost_rs::regions::RegionMask;
    use clpost_rs::types::GeoBounds;

    let n_months = 3;
    let grid = LatLonGrid::uniform(100.5, 4, 1.0, 30.5, 4, 1.0);
    let mut ds = Dataset::new(grid.clone()).with_time(monthly_axis(2017, n_months));
    let mut data = Vec::new();
    for t in 0..n_months {
        for cell in 0..16 {
            data.push(t as f64 * 100.0 + cell as f64);
        }
    }
    ds.push_field(
        Field::new(
            "v",
            "1",
            vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
            vec![n_months, 4, 4],
            data,
        )
        .unwrap(),
    )
    .unwrap();

    // A mask of the lower-left 2x2 corner and the matching crop window.
    let flags: Vec<bool> = (0..16).map(|c| c % 4 < 2 && c / 4 < 2).collect();
    let mask = RegionMask::from_flags(grid, flags);
    let masked = fldmean_dataset(&ds, Some(&mask)).unwrap();

    let window = GeoBounds::new(100.0, 102.0, 30.0, 32.0);
    let cropped_ds = ds.crop(&window).unwrap();
    let cropped = fldmean_dataset(&cropped_ds, None).unwrap();

    let a = masked.combined.column("v").unwrap();
    let b = cropped.combined.column("v").unwrap();
    for (&x, &y) in a.iter().zip(b) {
        assert!((x - y).abs() < TOL, "masked {} != cropped {}", x, y);
    }
}
