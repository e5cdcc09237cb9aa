//! Provincial emission tables from the masked inventory.
//!
//! Integrates the masked flux over every province month by month,
//! excluding the waste-open sector over the final year, and writes the
//! monthly and mean tables.
//!
//! Run with: cargo run --bin province_emissions --features netcdf [data root]

#[cfg(feature = "netcdf")]
fn main() {
    use clpost_rs::batch::run_batch;
    use clpost_rs::config::ProjectConfig;
    use clpost_rs::inventory::{self, Species};
    use clpost_rs::io::{self, BoundarySet, write_csv_records};
    use clpost_rs::regions::province_masks;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    println!("Provincial emission totals");
    println!("==========================");
    println!(
        "long-term inventory years: {:?}",
        inventory::long_term_years()
    );

    let shapefile = config.emissions_root().join("china_provinces.shp");
    let boundaries = match BoundarySet::load(&shapefile) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("failed to load {}: {}", shapefile.display(), e);
            std::process::exit(1);
        }
    };

    let report = run_batch(&Species::BOTH, |&species| -> Result<(), Box<dyn std::error::Error>> {
        let path = config.output_path(&format!("{}_flux_masked.nc", species.prefix()));
        println!("\n{}:", species);
        println!("  reading {}", path.display());
        let ds = io::read_dataset(&path)?;

        let total = ds.expect_field(&species.total_name())?;
        let wstop = ds.field(&species.wstop_name());
        let masks = province_masks(&boundaries, &ds.grid);

        let totals =
            inventory::province_monthly_totals(total, wstop, &ds.time, &masks, &ds.grid)?;

        let mut monthly_header: Vec<String> =
            vec!["province".to_string(), "area_km2".to_string()];
        monthly_header.extend(ds.time.iter().map(|ym| ym.to_string()));
        let header: Vec<&str> = monthly_header.iter().map(String::as_str).collect();
        let monthly_rows: Vec<Vec<String>> = totals
            .iter()
            .map(|p| {
                let mut row = vec![p.name.clone(), format!("{:.1}", p.area_km2)];
                row.extend(p.monthly_kg.iter().map(|kg| format!("{}", kg)));
                row
            })
            .collect();
        let monthly_path =
            config.output_path(&format!("{}_province_monthly.csv", species.prefix()));
        write_csv_records(&monthly_path, &header, &monthly_rows)?;
        println!("  wrote {}", monthly_path.display());

        let mean_rows: Vec<Vec<String>> = totals
            .iter()
            .map(|p| {
                vec![
                    p.name.clone(),
                    format!("{:.1}", p.area_km2),
                    format!("{}", p.mean_kg()),
                ]
            })
            .collect();
        let mean_path =
            config.output_path(&format!("{}_province_mean.csv", species.prefix()));
        write_csv_records(&mean_path, &["province", "area_km2", "mean_kg"], &mean_rows)?;
        println!("  wrote {}", mean_path.display());

        if let Some(largest) = totals
            .iter()
            .max_by(|a, b| a.mean_kg().total_cmp(&b.mean_kg()))
        {
            println!(
                "  largest mean emitter: {} ({:.3e} kg/month)",
                largest.name,
                largest.mean_kg()
            );
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
    eprintln!("Run with: cargo run --bin province_emissions --features netcdf");
}
