//! Yearly-trend comparison panels.

use std::path::Path;

use plotters::prelude::*;
use plotters_svg::SVGBackend;

use crate::figures::{FigureError, display_name};
use crate::types::Scenario;

/// One panel of the trend figure: a variable's yearly series in both
/// scenarios.
#[derive(Clone, Debug)]
pub struct TrendPanel {
    /// Model variable name.
    pub variable: String,
    /// Units, used as the y-axis label.
    pub units: String,
    /// Years shared by both series.
    pub years: Vec<i32>,
    /// Yearly means in the phase-out scenario.
    pub s1: Vec<f64>,
    /// Yearly means in the reference scenario.
    pub ssp370: Vec<f64>,
}

impl TrendPanel {
    /// The y-range covering both series, padded by 5 %.
    fn value_range(&self) -> (f64, f64) {
        let (min, max) = self
            .s1
            .iter()
            .chain(&self.ssp370)
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });
        let pad = (max - min).abs().max(f64::MIN_POSITIVE) * 0.05;
        (min - pad, max + pad)
    }
}

/// Draw a grid of yearly-trend panels, two rows by three columns.
///
/// Each panel shows the two scenarios' yearly series for one variable
/// with a y-range shared by both series.
pub fn plot_yearly_trends(path: &Path, panels: &[TrendPanel]) -> Result<(), FigureError> {
    if panels.is_empty() {
        return Err(FigureError::Empty("no trend panels".to_string()));
    }

    let root = SVGBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((2, 3));

    for (panel, area) in panels.iter().zip(&areas) {
        let (year_min, year_max) = match (panel.years.first(), panel.years.last()) {
            (Some(&first), Some(&last)) if first < last => (first, last),
            _ => {
                area.draw(&Text::new(
                    format!("{}: no data", display_name(&panel.variable)),
                    (40, 40),
                    ("sans-serif", 15).into_font().color(&BLACK),
                ))?;
                continue;
            }
        };
        let (y_min, y_max) = panel.value_range();

        let mut chart = ChartBuilder::on(area)
            .caption(display_name(&panel.variable), ("sans-serif", 18))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(55)
            .build_cartesian_2d(year_min..year_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc(panel.units.clone())
            .y_label_formatter(&|v| format!("{:.2e}", v))
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                panel.years.iter().copied().zip(panel.s1.iter().copied()),
                &RED,
            ))?
            .label(Scenario::S1.to_string())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], RED));

        chart
            .draw_series(LineSeries::new(
                panel.years.iter().copied().zip(panel.ssp370.iter().copied()),
                &BLUE,
            ))?
            .label(Scenario::Ssp370.to_string())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], BLUE));

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn panel(variable: &str) -> TrendPanel {
        TrendPanel {
            variable: variable.to_string(),
            units: "mol/mol".to_string(),
            years: (2017..=2038).collect(),
            s1: (0..22).map(|i| 1.0e-9 + i as f64 * 1.0e-11).collect(),
            ssp370: (0..22).map(|i| 1.2e-9 + i as f64 * 1.0e-11).collect(),
        }
    }

    #[test]
    fn test_trend_figure_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trends.svg");
        let panels: Vec<TrendPanel> =
            ["CL", "CLO", "CLY", "CLNO2", "HCL", "O3"].map(panel).to_vec();

        plot_yearly_trends(&path, &panels).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Cl_y"));
    }

    #[test]
    fn test_empty_panels_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trends.svg");
        assert!(matches!(
            plot_yearly_trends(&path, &[]),
            Err(FigureError::Empty(_))
        ));
    }

    #[test]
    fn test_shared_range_covers_both_series() {
        let p = panel("CLY");
        let (lo, hi) = p.value_range();
        assert!(lo < 1.0e-9);
        assert!(hi > 1.2e-9 + 21.0e-11);
    }
}
