//! Tail-ratio comparison of the two scenarios' field-mean tables.
//!
//! Run with: cargo run --bin scenario_difference [data root]

use clpost_rs::analysis::{DEFAULT_TAIL_MONTHS, tail_ratio_summary};
use clpost_rs::config::ProjectConfig;
use clpost_rs::io::{TimeTable, write_csv_records};
use clpost_rs::types::Scenario;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    if let Err(e) = run(&config) {
        eprintln!("scenario comparison failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &ProjectConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Scenario comparison (last {} months)", DEFAULT_TAIL_MONTHS);
    println!("====================================");

    let s1_path = config.output_path(&format!("{}_fldmean.csv", Scenario::S1));
    let ssp_path = config.output_path(&format!("{}_fldmean.csv", Scenario::Ssp370));
    let s1 = TimeTable::read_csv(&s1_path)?;
    let ssp370 = TimeTable::read_csv(&ssp_path)?;
    println!("{}: {} rows", s1_path.display(), s1.n_rows());
    println!("{}: {} rows", ssp_path.display(), ssp370.n_rows());

    let summaries = tail_ratio_summary(&s1, &ssp370, DEFAULT_TAIL_MONTHS)?;

    println!("\n{:<16} {:>10} {:>10} {:>10}", "variable", "mean", "max", "min");
    for summary in &summaries {
        println!(
            "{:<16} {:>10.4} {:>10.4} {:>10.4}",
            summary.variable, summary.mean, summary.max, summary.min
        );
    }

    let rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| {
            vec![
                s.variable.clone(),
                format!("{}", s.mean),
                format!("{}", s.max),
                format!("{}", s.min),
            ]
        })
        .collect();
    let out_path = config.output_path("scenario_ratio.csv");
    write_csv_records(&out_path, &["variable", "mean", "max", "min"], &rows)?;
    println!("\nwrote {}", out_path.display());
    Ok(())
}
