//! Simplex projection and convergent cross mapping.
//!
//! Time-delay embedding with `tau = 1`: the state at time `t` is the
//! vector `[s_t, s_{t-1}, ..., s_{t-E+1}]`. Simplex projection predicts
//! one step ahead from the `E + 1` nearest neighbours on the
//! reconstructed attractor; cross mapping estimates one series from the
//! attractor of the other and measures how the estimate converges as
//! the library grows.

use std::ops::RangeInclusive;

use crate::analysis::AnalysisError;

/// Nearest neighbours used for a prediction, one more than the
/// embedding dimension.
fn n_neighbours(e: usize) -> usize {
    e + 1
}

/// Library sizes keep this margin from both ends of the series.
const LIBRARY_MARGIN: usize = 26;

/// Result of scanning embedding dimensions with simplex projection.
#[derive(Clone, Debug)]
pub struct EmbeddingScan {
    /// Dimension with the smallest prediction error.
    pub best_e: usize,
    /// Mean absolute error per scanned dimension.
    pub errors: Vec<(usize, f64)>,
}

/// Cross-map skill at one library size.
#[derive(Clone, Copy, Debug)]
pub struct CcmResult {
    /// Library size (number of attractor points used).
    pub lib_size: usize,
    /// Correlation of the estimate of `y` from the attractor of `x`.
    pub x_xmap_y: f64,
    /// Correlation of the estimate of `x` from the attractor of `y`.
    pub y_xmap_x: f64,
}

/// One-step-ahead simplex prediction error at embedding dimension `e`.
///
/// Leave-one-out: each point is predicted from its `e + 1` nearest
/// neighbours among the other points. Returns None when the series is
/// too short (or too NaN-ridden) to form enough embedding vectors.
pub fn simplex_mae(series: &[f64], e: usize) -> Option<f64> {
    let n = series.len();
    if e == 0 || n < e + 2 {
        return None;
    }

    // Embedding points that can both be formed and predicted from.
    let points: Vec<usize> = (e - 1..n - 1)
        .filter(|&t| embedding_valid(series, t, e) && !series[t + 1].is_nan())
        .collect();
    if points.len() < n_neighbours(e) + 1 {
        return None;
    }

    let mut total_error = 0.0;
    let mut count = 0usize;
    for &t in &points {
        let neighbours: Vec<usize> = points.iter().copied().filter(|&p| p != t).collect();
        let estimate = weighted_estimate(series, series, t, &neighbours, e, 1);
        if estimate.is_nan() {
            continue;
        }
        total_error += (estimate - series[t + 1]).abs();
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(total_error / count as f64)
    }
}

/// Scan embedding dimensions and pick the one with the smallest simplex
/// prediction error.
pub fn best_embedding(
    series: &[f64],
    dimensions: RangeInclusive<usize>,
) -> Result<EmbeddingScan, AnalysisError> {
    let mut errors = Vec::new();
    for e in dimensions {
        if let Some(mae) = simplex_mae(series, e) {
            errors.push((e, mae));
        }
    }
    let best_e = errors
        .iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|&(e, _)| e)
        .ok_or_else(|| {
            AnalysisError::Mismatch("series too short for any embedding dimension".to_string())
        })?;
    Ok(EmbeddingScan { best_e, errors })
}

/// Convergent cross mapping between two series at embedding dimension
/// `e`.
///
/// Library sizes run from 26 through `n - 26`, each library the
/// contiguous prefix of the series. For each size the cross-map skill
/// is the Pearson correlation between estimates and observations, in
/// both directions.
pub fn ccm_pair(x: &[f64], y: &[f64], e: usize) -> Result<Vec<CcmResult>, AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::Mismatch(format!(
            "series lengths differ: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 * LIBRARY_MARGIN || e == 0 || n < e + 2 {
        return Err(AnalysisError::Mismatch(format!(
            "{} points are too few for cross mapping",
            n
        )));
    }

    let mut results = Vec::with_capacity(n - 2 * LIBRARY_MARGIN + 1);
    for lib_size in LIBRARY_MARGIN..=n - LIBRARY_MARGIN {
        results.push(CcmResult {
            lib_size,
            x_xmap_y: cross_map(x, y, e, lib_size),
            y_xmap_x: cross_map(y, x, e, lib_size),
        });
    }
    Ok(results)
}

/// Estimate `target` from the attractor of `source` using the first
/// `lib_size` points as the library, and correlate the estimates with
/// the observations.
fn cross_map(source: &[f64], target: &[f64], e: usize, lib_size: usize) -> f64 {
    let n = source.len();
    let library: Vec<usize> = (e - 1..lib_size.min(n))
        .filter(|&t| embedding_valid(source, t, e) && !target[t].is_nan())
        .collect();
    if library.len() <= n_neighbours(e) {
        return f64::NAN;
    }

    let mut estimates = Vec::new();
    let mut observed = Vec::new();
    for t in e - 1..n {
        if !embedding_valid(source, t, e) || target[t].is_nan() {
            continue;
        }
        let neighbours: Vec<usize> = library.iter().copied().filter(|&p| p != t).collect();
        let estimate = weighted_estimate(source, target, t, &neighbours, e, 0);
        if estimate.is_nan() {
            continue;
        }
        estimates.push(estimate);
        observed.push(target[t]);
    }
    pearson(&estimates, &observed)
}

/// Exponentially weighted neighbour estimate of `target` at `t + tp`.
fn weighted_estimate(
    source: &[f64],
    target: &[f64],
    t: usize,
    candidates: &[usize],
    e: usize,
    tp: usize,
) -> f64 {
    let mut distances: Vec<(usize, f64)> = candidates
        .iter()
        .filter(|&&p| p + tp < target.len() && !target[p + tp].is_nan())
        .map(|&p| (p, embedding_distance(source, t, p, e)))
        .collect();
    if distances.len() < n_neighbours(e) {
        return f64::NAN;
    }
    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    distances.truncate(n_neighbours(e));

    let d_min = distances[0].1;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for &(p, d) in &distances {
        let w = if d_min > 0.0 {
            (-d / d_min).exp()
        } else if d == 0.0 {
            1.0
        } else {
            0.0
        };
        numerator += w * target[p + tp];
        denominator += w;
    }
    numerator / denominator
}

fn embedding_valid(series: &[f64], t: usize, e: usize) -> bool {
    (0..e).all(|lag| !series[t - lag].is_nan())
}

fn embedding_distance(series: &[f64], a: usize, b: usize, e: usize) -> f64 {
    (0..e)
        .map(|lag| {
            let d = series[a - lag] - series[b - lag];
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Pearson correlation between two equally long samples.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&va, &vb) in a.iter().zip(b) {
        cov += (va - mean_a) * (vb - mean_b);
        var_a += (va - mean_a).powi(2);
        var_b += (vb - mean_b).powi(2);
    }
    cov / (var_a * var_b).sqrt()
}
