//! Tabular scenario differences over field-mean tables.

use log::warn;

use crate::analysis::AnalysisError;
use crate::io::TimeTable;

/// Months compared at the end of the two series (the final model year
/// plus one month of spin-up overlap).
pub const DEFAULT_TAIL_MONTHS: usize = 13;

/// Ratio statistics for one variable over the compared tail.
#[derive(Clone, Debug)]
pub struct RatioSummary {
    /// Variable name.
    pub variable: String,
    /// Mean of the per-month ratios.
    pub mean: f64,
    /// Largest per-month ratio.
    pub max: f64,
    /// Smallest per-month ratio.
    pub min: f64,
}

/// Compare two field-mean tables over their final months.
///
/// For every variable present in both tables, the per-month ratio
/// `numerator / denominator` over the last `tail_months` rows is
/// summarized as mean, max and min. NaN rows are skipped; variables
/// missing from the denominator table are logged and skipped.
pub fn tail_ratio_summary(
    numerator: &TimeTable,
    denominator: &TimeTable,
    tail_months: usize,
) -> Result<Vec<RatioSummary>, AnalysisError> {
    if numerator.n_rows() < tail_months || denominator.n_rows() < tail_months {
        return Err(AnalysisError::Mismatch(format!(
            "tables have {} and {} rows, need at least {}",
            numerator.n_rows(),
            denominator.n_rows(),
            tail_months
        )));
    }
    let top = numerator.tail(tail_months);
    let bottom = denominator.tail(tail_months);

    let mut summaries = Vec::new();
    for name in top.column_names() {
        let Some(denom_column) = bottom.column(name) else {
            warn!("variable '{}' missing from the comparison table, skipped", name);
            continue;
        };
        let num_column = top.expect_column(name)?;

        let mut sum = 0.0;
        let mut count = 0usize;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        for (&n, &d) in num_column.iter().zip(denom_column) {
            let ratio = n / d;
            if ratio.is_nan() {
                continue;
            }
            sum += ratio;
            count += 1;
            max = max.max(ratio);
            min = min.min(ratio);
        }
        if count == 0 {
            summaries.push(RatioSummary {
                variable: name.to_string(),
                mean: f64::NAN,
                max: f64::NAN,
                min: f64::NAN,
            });
        } else {
            summaries.push(RatioSummary {
                variable: name.to_string(),
                mean: sum / count as f64,
                max,
                min,
            });
        }
    }
    Ok(summaries)
}
