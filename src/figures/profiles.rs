//! Vertical profile figures.

use std::path::Path;

use plotters::prelude::*;
use plotters_svg::SVGBackend;

use crate::figures::{FigureError, display_name};
use crate::types::Scenario;

/// Draw a species' vertical profile in both scenarios.
///
/// The y-axis is pressure in hPa and runs downwards, so the surface
/// sits at the bottom of the figure.
pub fn plot_profiles(
    path: &Path,
    variable: &str,
    units: &str,
    lev: &[f64],
    s1: &[f64],
    ssp370: &[f64],
) -> Result<(), FigureError> {
    if lev.len() < 2 || s1.len() != lev.len() || ssp370.len() != lev.len() {
        return Err(FigureError::Empty(format!(
            "profile series for '{}' do not match the level axis",
            variable
        )));
    }

    let (v_min, v_max) = s1
        .iter()
        .chain(ssp370)
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        });
    if !v_min.is_finite() {
        return Err(FigureError::Empty(format!(
            "profile for '{}' holds no valid values",
            variable
        )));
    }
    let pad = (v_max - v_min).abs().max(f64::MIN_POSITIVE) * 0.05;

    let (p_min, p_max) = lev
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &p| {
            (min.min(p), max.max(p))
        });

    let root = SVGBackend::new(path, (600, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(display_name(variable), ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(55)
        // Reversed pressure range inverts the y-axis.
        .build_cartesian_2d(v_min - pad..v_max + pad, p_max..p_min)?;

    chart
        .configure_mesh()
        .x_desc(units)
        .y_desc("Pressure (hPa)")
        .x_label_formatter(&|v| format!("{:.2e}", v))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            s1.iter().copied().zip(lev.iter().copied()),
            &RED,
        ))?
        .label(Scenario::S1.to_string())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], RED));

    chart
        .draw_series(LineSeries::new(
            ssp370.iter().copied().zip(lev.iter().copied()),
            &BLUE,
        ))?
        .label(Scenario::Ssp370.to_string())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], BLUE));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_profile_figure_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.svg");
        let lev: Vec<f64> = (1..=10).map(|k| k as f64 * 100.0).collect();
        let s1: Vec<f64> = lev.iter().map(|p| p * 1.0e-12).collect();
        let ssp370: Vec<f64> = lev.iter().map(|p| p * 1.5e-12).collect();

        plot_profiles(&path, "HCL", "mol/mol", &lev, &s1, &ssp370).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("HCl"));
    }

    #[test]
    fn test_mismatched_series_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.svg");
        assert!(plot_profiles(&path, "CL", "mol/mol", &[1.0, 2.0], &[1.0], &[1.0, 2.0]).is_err());
    }
}
