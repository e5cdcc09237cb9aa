//! Vertical profile figures of the chlorine species.
//!
//! Averages the final model year of each scenario, takes the
//! area-weighted mean per level, and draws the two profiles against
//! pressure.
//!
//! Run with: cargo run --bin profiles --features netcdf [data root]

/// Species drawn, one figure each.
#[cfg(feature = "netcdf")]
const PROFILE_VARS: [&str; 5] = ["CL", "CLO", "CLY", "CLNO2", "HCL"];

/// Months averaged at the end of the series.
#[cfg(feature = "netcdf")]
const PROFILE_MONTHS: usize = 12;

/// Per-level area-weighted mean over the final months of the series.
#[cfg(feature = "netcdf")]
fn level_profile(
    ds: &clpost_rs::grid::Dataset,
    variable: &str,
) -> Result<(Vec<f64>, String), Box<dyn std::error::Error>> {
    use clpost_rs::analysis::{FieldMean, fldmean};
    use clpost_rs::grid::DimKind;

    let field = ds.expect_field(variable)?;
    let n_time = field
        .dim_len(DimKind::Time)
        .ok_or_else(|| format!("'{}' has no time axis", variable))?;
    let tail: Vec<usize> = (n_time.saturating_sub(PROFILE_MONTHS)..n_time).collect();
    let mean = field
        .select_indices(DimKind::Time, &tail)?
        .mean_along(DimKind::Time)?;

    match fldmean(&mean, &ds.grid, None)? {
        FieldMean::Levels { values, .. } => Ok((values, field.units.clone())),
        _ => Err(format!("'{}' has no level dimension", variable).into()),
    }
}

#[cfg(feature = "netcdf")]
fn main() {
    use clpost_rs::batch::{output_exists, run_batch};
    use clpost_rs::config::ProjectConfig;
    use clpost_rs::figures::{display_name, plot_profiles};
    use clpost_rs::io;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    println!("Vertical profiles");
    println!("=================");

    let scenarios = config.scenarios();
    let s1_path = config.output_path(&format!("{}_monthly.nc", scenarios[0]));
    let ssp_path = config.output_path(&format!("{}_monthly.nc", scenarios[1]));
    let (s1, ssp370) = match (
        io::read_dataset_vars(&s1_path, &PROFILE_VARS),
        io::read_dataset_vars(&ssp_path, &PROFILE_VARS),
    ) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("failed to read the merged histories: {}", e);
            std::process::exit(1);
        }
    };

    let report = run_batch(&PROFILE_VARS, |&variable| -> Result<(), Box<dyn std::error::Error>> {
        let path = config.output_path(&format!("{}_profile.svg", variable));
        if output_exists(&path) {
            return Ok(());
        }

        let (profile_a, units) = level_profile(&s1, variable)?;
        let (profile_b, _) = level_profile(&ssp370, variable)?;

        plot_profiles(&path, variable, &units, &s1.lev, &profile_a, &profile_b)?;
        println!("{} -> {}", display_name(variable), path.display());
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
    eprintln!("Run with: cargo run --bin profiles --features netcdf");
}
