//! Seasonal and annual difference maps with Welch significance
//! stippling.
//!
//! For each chlorine species at a fixed model level, groups both
//! scenarios' monthly fields into seasonal (and annual) samples, tests
//! each grid cell with Welch's t-test, and draws the S1 - SSP370
//! difference map with stippling where p < 0.05.
//!
//! Run with: cargo run --bin seasonal_analysis --features netcdf [data root]

/// Model level index the maps are drawn at.
#[cfg(feature = "netcdf")]
const LEVEL_INDEX: usize = 50;

/// Species mapped per season.
#[cfg(feature = "netcdf")]
const MAP_VARS: [&str; 5] = ["CL", "CLO", "CLY", "CLNO2", "HCL"];

/// The variable's monthly series at the map level.
#[cfg(feature = "netcdf")]
fn level_series(
    ds: &clpost_rs::grid::Dataset,
    variable: &str,
) -> Result<clpost_rs::grid::Field, Box<dyn std::error::Error>> {
    use clpost_rs::grid::DimKind;

    let field = ds.expect_field(variable)?;
    match field.dim_len(DimKind::Lev) {
        Some(n_lev) => Ok(field.select_level(DimKind::Lev, LEVEL_INDEX.min(n_lev - 1))?),
        None => Ok(field.clone()),
    }
}

/// Difference map of two sample fields with significance stippling.
#[cfg(feature = "netcdf")]
fn difference_figure(
    path: &std::path::Path,
    label: &str,
    variable: &str,
    s1_samples: &clpost_rs::grid::Field,
    ssp_samples: &clpost_rs::grid::Field,
    grid: &clpost_rs::grid::LatLonGrid,
) -> Result<(), Box<dyn std::error::Error>> {
    use clpost_rs::analysis::{significance_mask, welch_p_field};
    use clpost_rs::figures::{display_name, plot_difference_map};
    use clpost_rs::grid::DimKind;

    let p_values = welch_p_field(s1_samples, ssp_samples)?;
    let flags = significance_mask(&p_values, 0.05);

    let mean_a = s1_samples.mean_along(DimKind::Time)?;
    let mean_b = ssp_samples.mean_along(DimKind::Time)?;
    let diff = mean_a.zip_with(&mean_b, &mean_a.name, &mean_a.units, |a, b| a - b)?;

    let title = format!("{}, {} (S1 - SSP370)", display_name(variable), label);
    plot_difference_map(path, &diff, grid, Some(&flags), &title)?;
    Ok(())
}

#[cfg(feature = "netcdf")]
fn main() {
    use clpost_rs::analysis::{annual_mean_field, seasonal_mean_field};
    use clpost_rs::batch::{output_exists, run_batch};
    use clpost_rs::config::ProjectConfig;
    use clpost_rs::figures::display_name;
    use clpost_rs::io;
    use clpost_rs::types::Season;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    println!("Seasonal difference maps");
    println!("========================");

    let scenarios = config.scenarios();
    let s1_path = config.output_path(&format!("{}_monthly.nc", scenarios[0]));
    let ssp_path = config.output_path(&format!("{}_monthly.nc", scenarios[1]));
    let (s1, ssp370) = match (
        io::read_dataset_vars(&s1_path, &MAP_VARS),
        io::read_dataset_vars(&ssp_path, &MAP_VARS),
    ) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("failed to read the merged histories: {}", e);
            std::process::exit(1);
        }
    };

    let report = run_batch(&MAP_VARS, |&variable| -> Result<(), Box<dyn std::error::Error>> {
        println!("\n{}:", display_name(variable));
        let surface_a = level_series(&s1, variable)?;
        let surface_b = level_series(&ssp370, variable)?;

        for season in Season::ALL {
            let path =
                config.output_path(&format!("{}_{}_diff.svg", variable, season.name()));
            if output_exists(&path) {
                continue;
            }
            let (_, samples_a) = seasonal_mean_field(&surface_a, &s1.time, season)?;
            let (_, samples_b) = seasonal_mean_field(&surface_b, &ssp370.time, season)?;
            difference_figure(&path, season.name(), variable, &samples_a, &samples_b, &s1.grid)?;
            println!("  wrote {}", path.display());
        }

        let path = config.output_path(&format!("{}_annual_diff.svg", variable));
        if !output_exists(&path) {
            let (_, samples_a) = annual_mean_field(&surface_a, &s1.time)?;
            let (_, samples_b) = annual_mean_field(&surface_b, &ssp370.time)?;
            difference_figure(&path, "annual", variable, &samples_a, &samples_b, &s1.grid)?;
            println!("  wrote {}", path.display());
        }
        Ok(())
    });

    println!("\nDone: {}", report);
    if report.all_failed() {
        std::process::exit(1);
    }
}

#[cfg(not(feature = "netcdf"))]
fn main() {
    eprintln!("This tool requires the 'netcdf' feature.");
    eprintln!("Run with: cargo run --bin seasonal_analysis --features netcdf");
}
