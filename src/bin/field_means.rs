//! Field-mean tables for each scenario: plain, country-masked, and per
//! analysis box.
//!
//! Run with: cargo run --bin field_means --features netcdf [data root]

#[cfg(feature = "netcdf")]
fn main() {
    use clpost_rs::analysis::fldmean_dataset;
    use clpost_rs::batch::{output_exists, run_batch};
    use clpost_rs::config::ProjectConfig;
    use clpost_rs::io::{self, BoundarySet, write_csv_records};
    use clpost_rs::regions::{RegionMask, boxes};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    println!("Field means");
    println!("===========");

    let shapefile = config.emissions_root().join("china_provinces.shp");
    let boundaries = match BoundarySet::load(&shapefile) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("failed to load {}: {}", shapefile.display(), e);
            std::process::exit(1);
        }
    };

    let scenarios = config.scenarios();
    let report = run_batch(&scenarios, |&scenario| -> Result<(), Box<dyn std::error::Error>> {
        let monthly_path = config.output_path(&format!("{}_monthly.nc", scenario));
        println!("\n{}:", scenario);
        println!("  reading {}", monthly_path.display());
        let ds = io::read_dataset(&monthly_path)?;

        // Units of every variable, carried to the CSV consumers.
        let units_path = config.output_path(&format!("{}_units.csv", scenario));
        if !output_exists(&units_path) {
            let rows: Vec<Vec<String>> = ds
                .fields()
                .iter()
                .map(|f| vec![f.name.clone(), f.units.clone()])
                .collect();
            write_csv_records(&units_path, &["variable", "units"], &rows)?;
            println!("  wrote {}", units_path.display());
        }

        // Plain global means plus the per-level tables.
        let combined_path = config.output_path(&format!("{}_fldmean.csv", scenario));
        if !output_exists(&combined_path) {
            let tables = fldmean_dataset(&ds, None)?;
            tables.combined.write_csv(&combined_path)?;
            println!("  wrote {}", combined_path.display());
            for (variable, levels) in &tables.levels {
                let path = config
                    .output_path(&format!("{}_{}_levels.csv", scenario, variable));
                if !output_exists(&path) {
                    levels.write_csv(&path)?;
                    println!("  wrote {}", path.display());
                }
            }
        }

        // Country-masked means on the model grid.
        let masked_path = config.output_path(&format!("{}_fldmean_china.csv", scenario));
        if !output_exists(&masked_path) {
            let mask = RegionMask::cached(
                config.output_path("mask_model_grid.nc"),
                &ds.grid,
                || boundaries.union(),
            )?;
            let tables = fldmean_dataset(&ds, Some(&mask))?;
            tables.combined.write_csv(&masked_path)?;
            println!("  wrote {}", masked_path.display());
        }

        // Box-selected means.
        for (name, bounds) in boxes::NAMED {
            let slug = name.to_lowercase().replace(' ', "_");
            let path = config.output_path(&format!("{}_fldmean_{}.csv", scenario, slug));
            if output_exists(&path) {
                continue;
            }
            let cropped = ds.crop(&bounds)?;
            let tables = fldmean_dataset(&cropped, None)?;
            tables.combined.write_csv(&path)?;
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
    eprintln!("Run with: cargo run --bin field_means --features netcdf");
}
