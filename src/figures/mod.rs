//! Figure generation using plotters (SVG output).
//!
//! Uses the SVG backend to avoid system font dependencies.

mod maps;
mod profiles;
mod trends;

pub use maps::{diverging_color, plot_difference_map};
pub use profiles::plot_profiles;
pub use trends::{TrendPanel, plot_yearly_trends};

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Errors from figure rendering.
#[derive(Debug, Error)]
pub enum FigureError {
    #[error("drawing failed: {0}")]
    Plot(String),

    #[error("nothing to plot: {0}")]
    Empty(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for FigureError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        FigureError::Plot(e.to_string())
    }
}

/// Display name of a chlorine species for captions and legends.
pub fn display_name(variable: &str) -> &str {
    match variable {
        "CL" => "Cl",
        "CLO" => "ClO",
        "CLY" => "Cl_y",
        "CLNO2" => "ClNO2",
        "HCL" => "HCl",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(display_name("CLY"), "Cl_y");
        assert_eq!(display_name("HCL"), "HCl");
        assert_eq!(display_name("PRECT"), "PRECT");
    }
}
