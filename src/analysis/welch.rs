//! Welch's unequal-variance two-sample t-test.

use crate::analysis::AnalysisError;
use crate::grid::{DimKind, Field};

/// Two-sided p-value of Welch's t-test between two samples.
///
/// NaN values are dropped from both samples. The degrees of freedom
/// follow Welch-Satterthwaite; the p-value comes from the regularized
/// incomplete beta function. Returns NaN when either sample has fewer
/// than two valid values or when both variances are zero.
pub fn welch_p_value(a: &[f64], b: &[f64]) -> f64 {
    let a: Vec<f64> = a.iter().copied().filter(|v| !v.is_nan()).collect();
    let b: Vec<f64> = b.iter().copied().filter(|v| !v.is_nan()).collect();
    if a.len() < 2 || b.len() < 2 {
        return f64::NAN;
    }

    let (mean_a, var_a) = mean_and_variance(&a);
    let (mean_b, var_b) = mean_and_variance(&b);
    if var_a == 0.0 && var_b == 0.0 {
        return f64::NAN;
    }

    let sa = var_a / a.len() as f64;
    let sb = var_b / b.len() as f64;
    let t = (mean_a - mean_b) / (sa + sb).sqrt();
    let df = (sa + sb).powi(2)
        / (sa.powi(2) / (a.len() - 1) as f64 + sb.powi(2) / (b.len() - 1) as f64);

    incomplete_beta(df / 2.0, 0.5, df / (df + t * t))
}

/// Per-cell Welch p-values between two `[Time, Lat, Lon]` sample
/// fields.
///
/// The time axes are the samples (for example one annual mean per
/// year); they may differ in length between the two fields. The result
/// is a `[Lat, Lon]` field of p-values.
pub fn welch_p_field(a: &Field, b: &Field) -> Result<Field, AnalysisError> {
    for field in [a, b] {
        if field.dims() != [DimKind::Time, DimKind::Lat, DimKind::Lon] {
            return Err(AnalysisError::Mismatch(format!(
                "'{}' is not a [time, lat, lon] sample field",
                field.name
            )));
        }
    }
    if a.horizontal_len() != b.horizontal_len() {
        return Err(AnalysisError::Grid(crate::grid::GridError::FieldMismatch {
            left: a.name.clone(),
            right: b.name.clone(),
        }));
    }

    let cells = a.horizontal_len();
    let n_a = a.shape()[0];
    let n_b = b.shape()[0];
    let mut data = Vec::with_capacity(cells);
    let mut sample_a = Vec::with_capacity(n_a);
    let mut sample_b = Vec::with_capacity(n_b);
    for cell in 0..cells {
        sample_a.clear();
        sample_b.clear();
        sample_a.extend((0..n_a).map(|t| a.values()[t * cells + cell]));
        sample_b.extend((0..n_b).map(|t| b.values()[t * cells + cell]));
        data.push(welch_p_value(&sample_a, &sample_b));
    }

    let mut out = Field::new(
        &format!("{}_p", a.name),
        "1",
        vec![DimKind::Lat, DimKind::Lon],
        vec![a.shape()[1], a.shape()[2]],
        data,
    )
    .map_err(AnalysisError::Grid)?;
    out.long_name = Some(format!("Welch p-value for {}", a.name));
    Ok(out)
}

/// Cells where the p-value falls below `alpha`. NaN never passes.
pub fn significance_mask(p_values: &Field, alpha: f64) -> Vec<bool> {
    p_values.values().iter().map(|&p| p < alpha).collect()
}

fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var)
}

/// Regularized incomplete beta function `I_x(a, b)`.
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b)
        + a * x.ln()
        + b * (1.0 - x).ln())
    .exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Continued-fraction expansion of the incomplete beta (Lentz's
/// method).
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 3.0e-14;
    const TINY: f64 = 1.0e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let numerator = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + numerator * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + numerator / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let numerator = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + numerator * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + numerator / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Lanczos approximation of `ln Γ(x)` for positive `x`.
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];
    let mut denom = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut series = 1.000_000_000_190_015;
    for c in COEFFS {
        denom += 1.0;
        series += c / denom;
    }
    -tmp + (2.506_628_274_631_000_5 * series / x).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    #[test]
    fn test_small_symmetric_samples() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 3.0, 4.0, 5.0];
        assert!((welch_p_value(&a, &b) - 0.315_333_596_2).abs() < TOL);
    }

    #[test]
    fn test_clearly_separated_samples() {
        let a = [2.1, 2.5, 2.3, 2.9, 2.7];
        let b = [3.2, 3.0, 3.4, 2.8, 3.3];
        assert!((welch_p_value(&a, &b) - 0.007_825_020_0).abs() < TOL);
    }

    #[test]
    fn test_unequal_sample_sizes() {
        let a = [
            27.5, 21.0, 19.0, 23.6, 17.0, 17.9, 16.9, 20.1, 21.9, 22.6, 23.1, 19.6, 19.0,
            21.7, 21.4,
        ];
        let b = [
            27.1, 22.0, 20.8, 23.4, 23.4, 23.5, 25.8, 22.0, 24.8, 20.2, 21.9, 22.1, 22.9,
            30.5, 24.3, 23.9, 13.3, 24.8,
        ];
        assert!((welch_p_value(&a, &b) - 0.039_973_036_8).abs() < TOL);
    }

    #[test]
    fn test_identical_samples_give_one() {
        let a = [1.0, 2.0, 3.0];
        assert!((welch_p_value(&a, &a) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_degenerate_samples_give_nan() {
        assert!(welch_p_value(&[1.0], &[1.0, 2.0]).is_nan());
        assert!(welch_p_value(&[2.0, 2.0], &[3.0, 3.0]).is_nan());
        assert!(welch_p_value(&[f64::NAN, 1.0], &[1.0, 2.0]).is_nan());
    }

    #[test]
    fn test_nan_values_dropped() {
        let a = [1.0, 2.0, 3.0, 4.0, f64::NAN];
        let b = [2.0, f64::NAN, 3.0, 4.0, 5.0];
        assert!((welch_p_value(&a, &b) - 0.315_333_596_2).abs() < TOL);
    }

    #[test]
    fn test_p_field_and_mask() {
        // Cell 0 differs strongly between the samples, cell 1 is
        // identical noise.
        let mut data_a = Vec::new();
        let mut data_b = Vec::new();
        for t in 0..5 {
            let noise = (t as f64) * 0.1;
            data_a.extend_from_slice(&[2.0 + noise, 1.0 + noise]);
            data_b.extend_from_slice(&[10.0 + noise, 1.0 + noise]);
        }
        let a = Field::new(
            "CLY",
            "mol/mol",
            vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
            vec![5, 1, 2],
            data_a,
        )
        .unwrap();
        let b = Field::new(
            "CLY",
            "mol/mol",
            vec![DimKind::Time, DimKind::Lat, DimKind::Lon],
            vec![5, 1, 2],
            data_b,
        )
        .unwrap();

        let p = welch_p_field(&a, &b).unwrap();
        assert_eq!(p.dims(), &[DimKind::Lat, DimKind::Lon]);
        assert!(p.values()[0] < 1e-6);
        assert!((p.values()[1] - 1.0).abs() < 1e-9);

        let mask = significance_mask(&p, 0.05);
        assert_eq!(mask, vec![true, false]);
    }

    #[test]
    fn test_p_field_rejects_maps() {
        let map = Field::new(
            "v",
            "1",
            vec![DimKind::Lat, DimKind::Lon],
            vec![1, 2],
            vec![0.0, 1.0],
        )
        .unwrap();
        assert!(matches!(
            welch_p_field(&map, &map),
            Err(AnalysisError::Mismatch(_))
        ));
    }
}
