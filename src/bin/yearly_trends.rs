//! Yearly trends and deviation rates of the chlorine species, with the
//! comparison figure.
//!
//! Run with: cargo run --bin yearly_trends [data root]

use std::collections::HashMap;
use std::path::Path;

use log::warn;

use clpost_rs::analysis::{deviation_rate, yearly_means};
use clpost_rs::config::ProjectConfig;
use clpost_rs::figures::{TrendPanel, display_name, plot_yearly_trends};
use clpost_rs::io::{TimeTable, write_csv_records};
use clpost_rs::types::Scenario;

/// Variables of the trend figure, one panel each.
const TREND_VARS: [&str; 6] = ["CL", "CLO", "CLY", "CLNO2", "HCL", "O3"];

/// Years averaged for the deviation rate.
const DEVIATION_TAIL_YEARS: usize = 5;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    if let Err(e) = run(&config) {
        eprintln!("trend analysis failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &ProjectConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Yearly trends");
    println!("=============");

    let s1 = TimeTable::read_csv(
        config.output_path(&format!("{}_fldmean.csv", Scenario::S1)),
    )?;
    let ssp370 = TimeTable::read_csv(
        config.output_path(&format!("{}_fldmean.csv", Scenario::Ssp370)),
    )?;
    let units = read_units(&config.output_path(&format!("{}_units.csv", Scenario::S1)));

    let mut panels = Vec::new();
    let mut deviation_rows = Vec::new();
    println!(
        "\ndeviation rate over the last {} full years:",
        DEVIATION_TAIL_YEARS
    );
    for variable in TREND_VARS {
        let (Some(series_a), Some(series_b)) = (s1.column(variable), ssp370.column(variable))
        else {
            warn!("variable '{}' missing from a field-mean table, skipped", variable);
            continue;
        };
        let (years_a, means_a) = yearly_means(s1.times(), series_a)?;
        let (years_b, means_b) = yearly_means(ssp370.times(), series_b)?;
        if years_a != years_b {
            warn!("'{}' covers different years in the two cases, skipped", variable);
            continue;
        }

        let deviation = deviation_rate(&means_a, &means_b, DEVIATION_TAIL_YEARS);
        println!("  {:<8} {:+.2}%", display_name(variable), deviation * 100.0);
        deviation_rows.push(vec![variable.to_string(), format!("{}", deviation)]);

        panels.push(TrendPanel {
            variable: variable.to_string(),
            units: units.get(variable).cloned().unwrap_or_default(),
            years: years_a,
            s1: means_a,
            ssp370: means_b,
        });
    }
    if panels.is_empty() {
        return Err("no variable had usable yearly series".into());
    }

    let deviation_path = config.output_path("deviation_rates.csv");
    write_csv_records(&deviation_path, &["variable", "deviation_rate"], &deviation_rows)?;
    println!("\nwrote {}", deviation_path.display());

    let figure_path = config.output_path("yearly_trends.svg");
    plot_yearly_trends(&figure_path, &panels)?;
    println!("wrote {}", figure_path.display());
    Ok(())
}

/// Variable units written by the field-mean stage; an empty map when
/// the file is absent.
fn read_units(path: &Path) -> HashMap<String, String> {
    let mut units = HashMap::new();
    let Ok(mut reader) = csv::Reader::from_path(path) else {
        warn!("no units table at {}, y-axes stay unlabelled", path.display());
        return units;
    };
    for record in reader.records().flatten() {
        if let (Some(variable), Some(unit)) = (record.get(0), record.get(1)) {
            units.insert(variable.to_string(), unit.to_string());
        }
    }
    units
}
