//! Merge the per-period model history files of each scenario into one
//! monthly file.
//!
//! Run with: cargo run --bin merge_history --features netcdf [data root]

#[cfg(feature = "netcdf")]
fn main() {
    use clpost_rs::batch::{output_exists, run_batch};
    use clpost_rs::config::ProjectConfig;
    use clpost_rs::io::{self, NetCDFWriterConfig};
    use clpost_rs::model::merge_history_files;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    println!("History merge");
    println!("=============");

    let scenarios = config.scenarios();
    let report = run_batch(&scenarios, |&scenario| -> Result<(), Box<dyn std::error::Error>> {
        let out_path = config.output_path(&format!("{}_monthly.nc", scenario));
        println!("\n{}:", scenario);
        if output_exists(&out_path) {
            return Ok(());
        }

        let case_dir = config.case_root(scenario);
        let mut paths: Vec<_> = std::fs::read_dir(&case_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|e| e == "nc").unwrap_or(false))
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(format!("no history files under {}", case_dir.display()).into());
        }
        println!("  merging {} files from {}", paths.len(), case_dir.display());

        let merged = merge_history_files(&paths, None)?;
        let writer = NetCDFWriterConfig::new(out_path.to_string_lossy())
            .with_title(format!("{} monthly history, merged", scenario));
        io::write_dataset(&writer, &merged)?;
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
    eprintln!("Run with: cargo run --bin merge_history --features netcdf");
}
