//! CSV tables for time series and summary outputs.
//!
//! The field-mean pipelines exchange data as CSV with a `time` column in
//! `YYYY-MM` form plus one numeric column per variable (or per level).
//! NaN values are written as empty cells and read back as NaN.

use std::path::Path;

use thiserror::Error;

use crate::types::YearMonth;

/// Error type for table I/O.
#[derive(Debug, Error)]
pub enum TableError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV layer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cell failed to parse
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// File had no rows
    #[error("Table is empty")]
    Empty,

    /// Column length does not match the time axis
    #[error("Column '{name}' has {got} values, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Column added twice
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    /// Column looked up but absent
    #[error("Table has no column '{0}'")]
    MissingColumn(String),
}

/// A monthly time series table: one time axis, named numeric columns.
///
/// # Example
///
/// ```
/// use clpost_rs::io::TimeTable;
/// use clpost_rs::types::YearMonth;
///
/// let times: Vec<YearMonth> = (1..=3).map(|m| YearMonth::new(2038, m)).collect();
/// let mut table = TimeTable::new(times);
/// table.push_column("TS", vec![285.1, 285.4, 286.0]).unwrap();
///
/// assert_eq!(table.n_rows(), 3);
/// assert_eq!(table.column("TS").unwrap()[2], 286.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTable {
    times: Vec<YearMonth>,
    columns: Vec<(String, Vec<f64>)>,
}

impl TimeTable {
    /// Create an empty table over a time axis.
    pub fn new(times: Vec<YearMonth>) -> Self {
        Self {
            times,
            columns: Vec::new(),
        }
    }

    /// The time axis.
    pub fn times(&self) -> &[YearMonth] {
        &self.times
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.times.len()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Iterate over `(name, values)` pairs.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Add a column.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if values.len() != self.times.len() {
            return Err(TableError::LengthMismatch {
                name,
                expected: self.times.len(),
                got: values.len(),
            });
        }
        if self.columns.iter().any(|(n, _)| *n == name) {
            return Err(TableError::DuplicateColumn(name));
        }
        self.columns.push((name, values));
        Ok(())
    }

    /// Values of a column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Values of a column by name, erroring when absent.
    pub fn expect_column(&self, name: &str) -> Result<&[f64], TableError> {
        self.column(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// The last `n` rows as a new table (fewer when the table is shorter).
    pub fn tail(&self, n: usize) -> TimeTable {
        let start = self.times.len().saturating_sub(n);
        TimeTable {
            times: self.times[start..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), values[start..].to_vec()))
                .collect(),
        }
    }

    /// Write the table as CSV with a leading `time` column.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec!["time".to_string()];
        header.extend(self.columns.iter().map(|(name, _)| name.clone()));
        writer.write_record(&header)?;

        for (row, time) in self.times.iter().enumerate() {
            let mut record = vec![time.to_string()];
            for (_, values) in &self.columns {
                record.push(format_cell(values[row]));
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a table written by [`TimeTable::write_csv`].
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(TableError::Empty);
        }

        let names: Vec<String> = headers.iter().skip(1).map(|s| s.to_string()).collect();
        let mut times = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let line = row + 2; // header is line 1
            let time_cell = record.get(0).ok_or(TableError::Parse {
                line,
                message: "missing time cell".to_string(),
            })?;
            let time: YearMonth = time_cell.parse().map_err(|e| TableError::Parse {
                line,
                message: format!("{}", e),
            })?;
            times.push(time);

            for (col, values) in columns.iter_mut().enumerate() {
                let cell = record.get(col + 1).unwrap_or("");
                values.push(parse_cell(cell, line)?);
            }
        }

        if times.is_empty() {
            return Err(TableError::Empty);
        }
        Ok(Self {
            times,
            columns: names.into_iter().zip(columns).collect(),
        })
    }
}

/// Write plain string records with a header (for non-time-series tables).
pub fn write_csv_records<P: AsRef<Path>>(
    path: P,
    header: &[&str],
    rows: &[Vec<String>],
) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{}", value)
    }
}

fn parse_cell(cell: &str, line: usize) -> Result<f64, TableError> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse().map_err(|_| TableError::Parse {
        line,
        message: format!("invalid number '{}'", cell),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_table() -> TimeTable {
        let times: Vec<YearMonth> = (1..=3).map(|m| YearMonth::new(2038, m)).collect();
        let mut table = TimeTable::new(times);
        table
            .push_column("TS", vec![285.0, f64::NAN, 286.5])
            .unwrap();
        table.push_column("PRECT", vec![1.0, 2.0, 3.0]).unwrap();
        table
    }

    #[test]
    fn test_push_column_validates_length() {
        let mut table = TimeTable::new(vec![YearMonth::new(2038, 1)]);
        assert!(matches!(
            table.push_column("x", vec![1.0, 2.0]),
            Err(TableError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut table = TimeTable::new(vec![YearMonth::new(2038, 1)]);
        table.push_column("x", vec![1.0]).unwrap();
        assert!(matches!(
            table.push_column("x", vec![2.0]),
            Err(TableError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_tail() {
        let table = sample_table();
        let tail = table.tail(2);
        assert_eq!(tail.n_rows(), 2);
        assert_eq!(tail.times()[0], YearMonth::new(2038, 2));
        assert_eq!(tail.column("PRECT").unwrap(), &[2.0, 3.0]);
    }

    #[test]
    fn test_csv_roundtrip_preserves_nan() {
        let table = sample_table();
        let file = NamedTempFile::new().unwrap();
        table.write_csv(file.path()).unwrap();
        let back = TimeTable::read_csv(file.path()).unwrap();

        assert_eq!(back.times(), table.times());
        assert_eq!(back.column_names(), table.column_names());
        let ts = back.column("TS").unwrap();
        assert_eq!(ts[0], 285.0);
        assert!(ts[1].is_nan());
        assert_eq!(ts[2], 286.5);
    }

    #[test]
    fn test_read_rejects_bad_time() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "time,x\nnot-a-time,1.0\n").unwrap();
        assert!(matches!(
            TimeTable::read_csv(file.path()),
            Err(TableError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_read_empty_is_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "time,x\n").unwrap();
        assert!(matches!(
            TimeTable::read_csv(file.path()),
            Err(TableError::Empty)
        ));
    }
}
