//! Merging per-period history files along time.

use std::path::Path;

use log::info;

use crate::grid::Dataset;
use crate::io::{NetCDFError, read_dataset, read_dataset_vars};

/// Read a list of per-period history files and concatenate them along
/// time, keeping only `vars` when given.
///
/// Files must be passed in chronological order; the concatenation
/// rejects overlapping or unordered time axes.
pub fn merge_history_files<P: AsRef<Path>>(
    paths: &[P],
    vars: Option<&[&str]>,
) -> Result<Dataset, NetCDFError> {
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let ds = match vars {
            Some(names) => read_dataset_vars(path, names)?,
            None => read_dataset(path)?,
        };
        info!("read {}: {}", path.display(), ds.summary());
        parts.push(ds);
    }
    let merged = Dataset::concat_time(parts)?;
    info!("merged {} files: {}", paths.len(), merged.summary());
    Ok(merged)
}
