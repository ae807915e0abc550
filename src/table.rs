//! # Benchmark Table Loader
//!
//! Reads the per-method `benchmark_results.csv` produced by the simulation
//! engines and turns it into a validated, immutable [`BenchmarkTable`].
//!
//! ## Wire Contract
//!
//! The header must contain `Points`, `Threads` and `Time_Seconds`; any other
//! columns are ignored. Validation is strict: a row that fails to parse or
//! breaks a column constraint aborts the load with
//! [`ReportError::MalformedRow`] instead of being skipped, because a dropped
//! row would silently move a group's baseline.
//!
//! ```text
//! Points,Threads,Time_Seconds
//! 1024,1,10.0
//! 1024,2,6.0
//! ```

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Column holding the problem size
pub const POINTS_COLUMN: &str = "Points";
/// Column holding the worker count
pub const THREADS_COLUMN: &str = "Threads";
/// Column holding the elapsed wall-clock time
pub const TIME_COLUMN: &str = "Time_Seconds";

/// One timing trial for a problem size and worker count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    pub method: String,
    pub points: u64,
    pub threads: u32,
    pub time_seconds: f64,
}

/// All rows of a single method, in source order
///
/// Construction goes through [`BenchmarkTable::from_rows`] or one of the
/// loaders, which enforce the column constraints and the single-method
/// invariant. The table is read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkTable {
    method: String,
    rows: Vec<BenchmarkRow>,
}

impl BenchmarkTable {
    /// Build a table from in-memory rows, applying the loader's validation
    pub fn from_rows(method: &str, rows: Vec<BenchmarkRow>) -> Result<Self, ReportError> {
        let mut seen: HashMap<(u64, u32), usize> = HashMap::new();

        for (i, row) in rows.iter().enumerate() {
            let row_number = i + 1;
            if row.method != method {
                return Err(malformed(
                    method,
                    row_number,
                    format!("row belongs to method '{}'", row.method),
                ));
            }
            validate_values(method, row_number, row.points, row.threads, row.time_seconds)?;
            check_duplicate(&mut seen, method, row_number, row.points, row.threads)?;
        }

        Ok(Self {
            method: method.to_string(),
            rows,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn rows(&self) -> &[BenchmarkRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load the benchmark table for `method` from a CSV file
///
/// ## Errors
/// - [`ReportError::DataSource`] when the file cannot be opened
/// - [`ReportError::Schema`] when a required column is missing
/// - [`ReportError::MalformedRow`] for the first bad row
pub fn load_table(method: &str, path: &Path) -> Result<BenchmarkTable, ReportError> {
    debug!("Loading benchmark table for {} from {:?}", method, path);

    let file = File::open(path).map_err(|source| ReportError::DataSource {
        method: method.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    let table = read_table(method, file)?;
    debug!("Loaded {} rows for {}", table.len(), method);
    Ok(table)
}

/// Parse a benchmark table from any reader
pub fn read_table<R: Read>(method: &str, reader: R) -> Result<BenchmarkTable, ReportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| malformed(method, 0, format!("unreadable header: {}", e)))?
        .clone();

    let column = |name: &str| -> Result<usize, ReportError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReportError::Schema {
                method: method.to_string(),
                column: name.to_string(),
            })
    };
    let points_idx = column(POINTS_COLUMN)?;
    let threads_idx = column(THREADS_COLUMN)?;
    let time_idx = column(TIME_COLUMN)?;

    let mut rows = Vec::new();
    let mut seen: HashMap<(u64, u32), usize> = HashMap::new();

    for (i, record) in csv_reader.records().enumerate() {
        let row_number = i + 1;
        let record = record.map_err(|e| malformed(method, row_number, e.to_string()))?;

        let points_raw = field(&record, points_idx, POINTS_COLUMN, method, row_number)?;
        let points: u64 = points_raw.parse().map_err(|_| {
            malformed(
                method,
                row_number,
                format!("{} '{}' is not a positive integer", POINTS_COLUMN, points_raw),
            )
        })?;

        let threads_raw = field(&record, threads_idx, THREADS_COLUMN, method, row_number)?;
        let threads: u32 = threads_raw.parse().map_err(|_| {
            malformed(
                method,
                row_number,
                format!("{} '{}' is not a positive integer", THREADS_COLUMN, threads_raw),
            )
        })?;

        let time_raw = field(&record, time_idx, TIME_COLUMN, method, row_number)?;
        let time_seconds: f64 = time_raw.parse().map_err(|_| {
            malformed(
                method,
                row_number,
                format!("{} '{}' is not a number", TIME_COLUMN, time_raw),
            )
        })?;

        validate_values(method, row_number, points, threads, time_seconds)?;
        check_duplicate(&mut seen, method, row_number, points, threads)?;

        rows.push(BenchmarkRow {
            method: method.to_string(),
            points,
            threads,
            time_seconds,
        });
    }

    Ok(BenchmarkTable {
        method: method.to_string(),
        rows,
    })
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    method: &str,
    row: usize,
) -> Result<&'r str, ReportError> {
    record
        .get(idx)
        .ok_or_else(|| malformed(method, row, format!("{} is missing", name)))
}

fn validate_values(
    method: &str,
    row: usize,
    points: u64,
    threads: u32,
    time_seconds: f64,
) -> Result<(), ReportError> {
    if points == 0 {
        return Err(malformed(method, row, format!("{} must be > 0", POINTS_COLUMN)));
    }
    if threads == 0 {
        return Err(malformed(method, row, format!("{} must be >= 1", THREADS_COLUMN)));
    }
    if !time_seconds.is_finite() || time_seconds < 0.0 {
        return Err(malformed(
            method,
            row,
            format!("{} {} must be a finite value >= 0", TIME_COLUMN, time_seconds),
        ));
    }
    Ok(())
}

/// Duplicate thread counts inside one problem size are rejected, never merged
fn check_duplicate(
    seen: &mut HashMap<(u64, u32), usize>,
    method: &str,
    row: usize,
    points: u64,
    threads: u32,
) -> Result<(), ReportError> {
    if let Some(first) = seen.insert((points, threads), row) {
        return Err(malformed(
            method,
            row,
            format!(
                "duplicate {}={} for {}={} (first seen at row {})",
                THREADS_COLUMN, threads, POINTS_COLUMN, points, first
            ),
        ));
    }
    Ok(())
}

fn malformed(method: &str, row: usize, reason: String) -> ReportError {
    ReportError::MalformedRow {
        method: method.to_string(),
        row,
        reason,
    }
}
