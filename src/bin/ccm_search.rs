//! Embedding search and convergent cross mapping over the field-mean
//! series.
//!
//! Finds the best embedding dimension of every variable by simplex
//! projection, then cross-maps every variable pair at increasing
//! library sizes. Both outputs are cached: existing files are left
//! untouched.
//!
//! Run with: cargo run --bin ccm_search [data root]

use log::warn;

use clpost_rs::analysis::{CcmResult, best_embedding, ccm_pair};
use clpost_rs::batch::output_exists;
use clpost_rs::config::ProjectConfig;
use clpost_rs::io::{TimeTable, write_csv_records};
use clpost_rs::types::Scenario;

/// Embedding dimensions scanned by the simplex search.
const E_MIN: usize = 2;
const E_MAX: usize = 24;

/// Workers of the parallel pair fan-out.
#[cfg(feature = "parallel")]
const CCM_WORKERS: usize = 6;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(root) => ProjectConfig::under(root),
        None => ProjectConfig::new(),
    };

    if let Err(e) = run(&config) {
        eprintln!("CCM search failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &ProjectConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Embedding search and CCM");
    println!("========================");

    let table_path = config.output_path(&format!("{}_fldmean_china.csv", Scenario::S1));
    let table = TimeTable::read_csv(&table_path)?;
    println!("{}: {} series, {} rows", table_path.display(), table.column_names().len(), table.n_rows());

    // Best embedding dimension per variable.
    let mut best: Vec<(String, usize, f64)> = Vec::new();
    for (name, values) in table.iter_columns() {
        match best_embedding(values, E_MIN..=E_MAX) {
            Ok(scan) => {
                let mae = scan
                    .errors
                    .iter()
                    .find(|&&(e, _)| e == scan.best_e)
                    .map(|&(_, mae)| mae)
                    .unwrap_or(f64::NAN);
                println!("  {:<16} E = {:>2} (MAE {:.4e})", name, scan.best_e, mae);
                best.push((name.to_string(), scan.best_e, mae));
            }
            Err(e) => warn!("embedding search for '{}' failed: {}", name, e),
        }
    }
    if best.is_empty() {
        return Err("no series admitted an embedding".into());
    }

    let best_path = config.output_path("bestEDim.csv");
    if !output_exists(&best_path) {
        let rows: Vec<Vec<String>> = best
            .iter()
            .map(|(name, e, mae)| vec![name.clone(), e.to_string(), format!("{}", mae)])
            .collect();
        write_csv_records(&best_path, &["variable", "best_e", "mae"], &rows)?;
        println!("wrote {}", best_path.display());
    }

    // Cross-map every pair at the larger of the two best dimensions.
    let ccm_path = config.output_path("all_ccm_values.csv");
    if output_exists(&ccm_path) {
        return Ok(());
    }
    let pairs: Vec<(usize, usize)> = (0..best.len())
        .flat_map(|i| (i + 1..best.len()).map(move |j| (i, j)))
        .collect();
    println!("cross mapping {} pairs", pairs.len());

    let outcomes = map_pairs(&pairs, &|&(i, j)| {
        let (source, source_e, _) = &best[i];
        let (target, target_e, _) = &best[j];
        let x = table
            .column(source)
            .ok_or_else(|| format!("column '{}' vanished", source))?;
        let y = table
            .column(target)
            .ok_or_else(|| format!("column '{}' vanished", target))?;
        let results = ccm_pair(x, y, *source_e.max(target_e)).map_err(|e| e.to_string())?;
        Ok((source.clone(), target.clone(), results))
    });

    let mut rows: Vec<Vec<String>> = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok((source, target, results)) => {
                for CcmResult { lib_size, x_xmap_y, y_xmap_x } in results {
                    rows.push(vec![
                        source.clone(),
                        target.clone(),
                        lib_size.to_string(),
                        format!("{}", x_xmap_y),
                        format!("{}", y_xmap_x),
                    ]);
                }
            }
            Err(message) => warn!("pair failed: {}", message),
        }
    }
    if rows.is_empty() {
        return Err("every pair failed".into());
    }

    write_csv_records(
        &ccm_path,
        &["source", "target", "lib_size", "source_xmap_target", "target_xmap_source"],
        &rows,
    )?;
    println!("wrote {}", ccm_path.display());
    Ok(())
}

type PairOutcome = Result<(String, String, Vec<CcmResult>), String>;

#[cfg(feature = "parallel")]
fn map_pairs(
    pairs: &[(usize, usize)],
    op: &(dyn Fn(&(usize, usize)) -> PairOutcome + Sync),
) -> Vec<PairOutcome> {
    use rayon::prelude::*;

    match rayon::ThreadPoolBuilder::new().num_threads(CCM_WORKERS).build() {
        Ok(pool) => pool.install(|| pairs.par_iter().map(op).collect()),
        Err(e) => {
            warn!("thread pool unavailable ({}), running serially", e);
            pairs.iter().map(op).collect()
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn map_pairs(
    pairs: &[(usize, usize)],
    op: &(dyn Fn(&(usize, usize)) -> PairOutcome + Sync),
) -> Vec<PairOutcome> {
    pairs.iter().map(op).collect()
}
