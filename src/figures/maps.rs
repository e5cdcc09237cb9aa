//! Spatial difference maps with significance stippling.

use std::path::Path;

use plotters::prelude::*;
use plotters_svg::SVGBackend;

use crate::figures::FigureError;
use crate::grid::{DimKind, Field, LatLonGrid};

/// Diverging blue-white-red color for a value on a scale symmetric
/// around zero. NaN cells come out gray.
pub fn diverging_color(value: f64, max_abs: f64) -> RGBColor {
    if value.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let t = (value / max_abs).clamp(-1.0, 1.0);
    if t >= 0.0 {
        // White towards red.
        let fade = (255.0 * (1.0 - t)) as u8;
        RGBColor(255, fade, fade)
    } else {
        // White towards blue.
        let fade = (255.0 * (1.0 + t)) as u8;
        RGBColor(fade, fade, 255)
    }
}

/// Draw a cell-filled map of a `[Lat, Lon]` difference field.
///
/// Colors diverge around zero. When a significance mask is given,
/// cells flagged in it are stippled with a small dot at the cell
/// center.
pub fn plot_difference_map(
    path: &Path,
    diff: &Field,
    grid: &LatLonGrid,
    significant: Option<&[bool]>,
    title: &str,
) -> Result<(), FigureError> {
    if diff.dims() != [DimKind::Lat, DimKind::Lon] || diff.len() != grid.n_cells() {
        return Err(FigureError::Empty(format!(
            "'{}' is not a map on the given grid",
            diff.name
        )));
    }
    if let Some(flags) = significant {
        if flags.len() != grid.n_cells() {
            return Err(FigureError::Empty(
                "significance mask does not match the grid".to_string(),
            ));
        }
    }

    let lon_edges = axis_edges(grid.lon());
    let lat_edges = axis_edges(grid.lat());

    let root = SVGBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(
            lon_edges[0]..lon_edges[lon_edges.len() - 1],
            lat_edges[0]..lat_edges[lat_edges.len() - 1],
        )?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .draw()?;

    let max_abs = diff
        .values()
        .iter()
        .filter(|v| !v.is_nan())
        .fold(0.0f64, |acc, &v| acc.max(v.abs()))
        .max(f64::MIN_POSITIVE);

    for j in 0..grid.n_lat() {
        for i in 0..grid.n_lon() {
            let value = diff.values()[grid.cell_index(j, i)];
            let color = diverging_color(value, max_abs);
            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (lon_edges[i], lat_edges[j]),
                    (lon_edges[i + 1], lat_edges[j + 1]),
                ],
                color.filled(),
            )))?;
        }
    }

    if let Some(flags) = significant {
        chart.draw_series(
            (0..grid.n_lat())
                .flat_map(|j| (0..grid.n_lon()).map(move |i| (j, i)))
                .filter(|&(j, i)| flags[grid.cell_index(j, i)])
                .map(|(j, i)| {
                    Circle::new((grid.lon()[i], grid.lat()[j]), 1, BLACK.filled())
                }),
        )?;
    }

    root.present()?;
    Ok(())
}

/// Cell edges from ascending cell centers.
fn axis_edges(centers: &[f64]) -> Vec<f64> {
    let n = centers.len();
    let mut edges = Vec::with_capacity(n + 1);
    edges.push(centers[0] - (centers[1] - centers[0]) / 2.0);
    for w in centers.windows(2) {
        edges.push((w[0] + w[1]) / 2.0);
    }
    edges.push(centers[n - 1] + (centers[n - 1] - centers[n - 2]) / 2.0);
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_diverging_palette() {
        assert_eq!(diverging_color(1.0, 1.0), RGBColor(255, 0, 0));
        assert_eq!(diverging_color(-1.0, 1.0), RGBColor(0, 0, 255));
        assert_eq!(diverging_color(0.0, 1.0), RGBColor(255, 255, 255));
        assert_eq!(diverging_color(f64::NAN, 1.0), RGBColor(200, 200, 200));
    }

    #[test]
    fn test_axis_edges() {
        let edges = axis_edges(&[0.5, 1.5, 2.5]);
        assert_eq!(edges, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_map_figure_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("map.svg");
        let grid = LatLonGrid::uniform(100.5, 4, 1.0, 20.5, 3, 1.0);
        let diff = Field::new(
            "CLY",
            "mol/mol",
            vec![DimKind::Lat, DimKind::Lon],
            vec![3, 4],
            (0..12).map(|i| i as f64 - 6.0).collect(),
        )
        .unwrap();
        let mut flags = vec![false; 12];
        flags[0] = true;
        flags[7] = true;

        plot_difference_map(&path, &diff, &grid, Some(&flags), "CLY, S1 - SSP370").unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<svg"));
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("map.svg");
        let grid = LatLonGrid::uniform(100.5, 4, 1.0, 20.5, 3, 1.0);
        let series = Field::new(
            "v",
            "1",
            vec![DimKind::Time],
            vec![5],
            vec![0.0; 5],
        )
        .unwrap();
        assert!(plot_difference_map(&path, &series, &grid, None, "bad").is_err());
    }
}
