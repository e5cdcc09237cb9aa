//! Catch-log-continue batch runner.
//!
//! Pipeline stages fan out over independent items (files, variables,
//! provinces, series pairs). A failed item is logged and skipped, never
//! retried; the batch always runs to the end.

use std::fmt::Display;
use std::path::Path;

use log::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-item outcomes of a batch.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// Items whose operation succeeded, in completion order.
    pub succeeded: Vec<String>,
    /// Items whose operation failed, with the logged error.
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    /// True when not a single item succeeded.
    pub fn all_failed(&self) -> bool {
        self.succeeded.is_empty() && !self.failed.is_empty()
    }

    fn from_outcomes(outcomes: Vec<(String, Result<(), String>)>) -> Self {
        let mut report = BatchReport::default();
        for (item, outcome) in outcomes {
            match outcome {
                Ok(()) => report.succeeded.push(item),
                Err(message) => {
                    warn!("'{}' failed: {}", item, message);
                    report.failed.push((item, message));
                }
            }
        }
        report
    }
}

impl Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed",
            self.succeeded.len(),
            self.failed.len()
        )
    }
}

/// Apply a fallible operation to each item in turn.
pub fn run_batch<T, E, F>(items: &[T], mut op: F) -> BatchReport
where
    T: Display,
    E: Display,
    F: FnMut(&T) -> Result<(), E>,
{
    let outcomes = items
        .iter()
        .map(|item| (item.to_string(), op(item).map_err(|e| e.to_string())))
        .collect();
    BatchReport::from_outcomes(outcomes)
}

/// Apply a fallible operation to the items on a rayon pool of the
/// given size. Falls back to the serial runner when the pool cannot be
/// built.
#[cfg(feature = "parallel")]
pub fn run_batch_parallel<T, E, F>(items: &[T], workers: usize, op: F) -> BatchReport
where
    T: Display + Sync,
    E: Display,
    F: Fn(&T) -> Result<(), E> + Sync,
{
    let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool,
        Err(e) => {
            warn!("thread pool unavailable ({}), running serially", e);
            return run_batch(items, op);
        }
    };
    let outcomes = pool.install(|| {
        items
            .par_iter()
            .map(|item| (item.to_string(), op(item).map_err(|e| e.to_string())))
            .collect()
    });
    BatchReport::from_outcomes(outcomes)
}

/// True when the output for an item already exists; the item should
/// then be skipped.
pub fn output_exists(path: &Path) -> bool {
    if path.exists() {
        info!("{} already exists, skipped", path.display());
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let items = vec!["a", "b", "c"];
        let report = run_batch(&items, |&item| {
            if item == "b" {
                Err("broken".to_string())
            } else {
                Ok(())
            }
        });
        assert_eq!(report.succeeded, vec!["a", "c"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "b");
        assert!(!report.all_failed());
    }

    #[test]
    fn test_all_failed() {
        let report = run_batch(&[1, 2], |_| Err::<(), _>("no"));
        assert!(report.all_failed());
        assert_eq!(report.to_string(), "0 succeeded, 2 failed");
    }

    #[test]
    fn test_output_exists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        assert!(!output_exists(&path));
        std::fs::write(&path, "x").unwrap();
        assert!(output_exists(&path));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial() {
        let items: Vec<i32> = (0..20).collect();
        let report = run_batch_parallel(&items, 4, |&i| {
            if i % 5 == 0 {
                Err(format!("item {}", i))
            } else {
                Ok(())
            }
        });
        assert_eq!(report.succeeded.len(), 16);
        assert_eq!(report.failed.len(), 4);
    }
}
