//! Column-integrate the merged model output of each scenario.
//!
//! Sums the aerosol groupings and wet acid deposition into derived
//! variables first, then integrates every 4-D mixing-ratio field into a
//! column burden.
//!
//! Run with: cargo run --bin column_concentration --features netcdf [data root]

#[cfg(feature = "netcdf")]
fn main() {
    use clpost_rs::batch::{output_exists, run_batch};
    use clpost_rs::config::ProjectConfig;
    use clpost_rs::io::{self, NetCDFWriterConfig};
    use clpost_rs::model::{ACID_DEPOSITION, AEROSOL_GROUPS, ModelError, add_derived,
        column_dataset};
    use log::warn;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    println!("Column integration");
    println!("==================");

    let scenarios = config.scenarios();
    let report = run_batch(&scenarios, |&scenario| -> Result<(), Box<dyn std::error::Error>> {
        let out_path = config.output_path(&format!("{}_columns.nc", scenario));
        println!("\n{}:", scenario);
        if output_exists(&out_path) {
            return Ok(());
        }

        let monthly_path = config.output_path(&format!("{}_monthly.nc", scenario));
        println!("  reading {}", monthly_path.display());
        let mut ds = io::read_dataset(&monthly_path)?;

        for group in AEROSOL_GROUPS.iter().chain(std::iter::once(&ACID_DEPOSITION)) {
            match add_derived(&mut ds, group) {
                Ok(()) => {}
                Err(ModelError::NoComponents(name)) => {
                    warn!("no components of '{}' in {}", name, scenario);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let columns = column_dataset(&ds)?;
        println!("  integrated {} variables", columns.fields().len());

        let writer = NetCDFWriterConfig::new(out_path.to_string_lossy())
            .with_title(format!("{} column burdens", scenario));
        io::write_dataset(&writer, &columns)?;
        println!("  wrote {}", out_path.display());
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
    eprintln!("Run with: cargo run --bin column_concentration --features netcdf");
}
