//! Prepare the chlorine emission inventory: merge sectors, convert to
//! flux units, build the monthly climatology, and report annual totals.
//!
//! Run with: cargo run --bin prep_inventory --features netcdf [data root]

#[cfg(feature = "netcdf")]
fn main() {
    use clpost_rs::batch::run_batch;
    use clpost_rs::config::ProjectConfig;
    use clpost_rs::grid::Dataset;
    use clpost_rs::inventory::{self, Species};
    use clpost_rs::io::{self, NetCDFWriterConfig, write_csv_records};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    println!("Chlorine inventory preparation");
    println!("==============================");

    let report = run_batch(&Species::BOTH, |&species| -> Result<(), Box<dyn std::error::Error>> {
        let raw_path = config
            .emissions_root()
            .join(format!("ACEIC_{}.nc", species.prefix()));
        println!("\n{}:", species);
        println!("  reading {}", raw_path.display());
        let raw = io::read_dataset(&raw_path)?;

        let total = inventory::merge_sectors(&raw, species)?;
        let flux = inventory::mg_per_cell_to_flux(&total, &raw.grid, &raw.time)?;

        let mut out = Dataset::new(raw.grid.clone()).with_time(raw.time.clone());
        // The waste-open sector stays separate for the phase-out tables.
        if let Some(wstop) = raw.field(&species.wstop_name()) {
            out.push_field(inventory::mg_per_cell_to_flux(wstop, &raw.grid, &raw.time)?)?;
        }
        out.push_field(flux.clone())?;

        let flux_path = config.output_path(&format!("{}_flux.nc", species.prefix()));
        let writer = NetCDFWriterConfig::new(flux_path.to_string_lossy())
            .with_title(format!("{} emission flux", species));
        io::write_dataset(&writer, &out)?;
        println!("  wrote {}", flux_path.display());

        let climatology = inventory::monthly_climatology(&flux, &raw.time)?;
        let mut clim_ds =
            Dataset::new(raw.grid.clone()).with_time(inventory::climatology_time_axis());
        clim_ds.push_field(climatology)?;
        let clim_path = config.output_path(&format!("{}_climatology.nc", species.prefix()));
        let writer = NetCDFWriterConfig::new(clim_path.to_string_lossy())
            .with_title(format!("{} monthly climatology", species));
        io::write_dataset(&writer, &clim_ds)?;
        println!("  wrote {}", clim_path.display());

        let totals = inventory::annual_totals_tg(&flux, &raw.time, &raw.grid)?;
        println!("  annual totals (Tg):");
        for &(year, tg) in &totals {
            println!("    {}: {:.4}", year, tg);
        }
        let rows: Vec<Vec<String>> = totals
            .iter()
            .map(|&(year, tg)| vec![year.to_string(), format!("{}", tg)])
            .collect();
        let totals_path =
            config.output_path(&format!("{}_annual_totals.csv", species.prefix()));
        write_csv_records(&totals_path, &["year", "total_tg"], &rows)?;
        println!("  wrote {}", totals_path.display());
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
    eprintln!("Run with: cargo run --bin prep_inventory --features netcdf");
}
