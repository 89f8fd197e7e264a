//! Loading of benchmark result files.
//!
//! The expected input is the CSV export of a command-line timing tool such as
//! hyperfine (`--export-csv`). Only `command` and `mean` are required; the other
//! columns hyperfine writes are parsed when present and otherwise ignored.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::{RenderError, Result};

const REQUIRED_COLUMNS: [&str; 2] = ["command", "mean"];

/// One benchmarked command.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub command: String,
    /// Mean wall-clock time in seconds
    pub mean: f64,
    pub stddev: Option<f64>,
    pub median: Option<f64>,
    /// User-mode CPU time in seconds
    pub user: Option<f64>,
    /// Kernel-mode CPU time in seconds
    pub system: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ResultRow {
    pub fn new(command: impl Into<String>, mean: f64) -> Self {
        Self {
            command: command.into(),
            mean,
            stddev: None,
            median: None,
            user: None,
            system: None,
            min: None,
            max: None,
        }
    }

    /// Text drawn next to the bar: the mean with three decimals and a seconds suffix.
    pub fn label(&self) -> String {
        format_seconds(self.mean)
    }
}

/// Formats a duration in seconds as `"1.234s"`.
pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds:.3}s")
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    command: String,
    mean: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    stddev: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    median: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    user: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    system: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    min: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    max: Option<f64>,
}

/// Reads the result file at `path`, preserving row order.
///
/// # Errors
///
/// - [`RenderError::InputNotFound`] if `path` does not exist.
/// - [`RenderError::InputReadError`] if `path` exists but cannot be opened or read.
/// - [`RenderError::MalformedInput`] if a required column is missing, a `mean`
///   value is not a finite non-negative number, or the file holds no rows.
pub fn load_results(path: &Path) -> Result<Vec<ResultRow>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(RenderError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(RenderError::input(path, e)),
    };

    let rows = parse_results(file, path)?;

    tracing::debug!(
        target: "benchviz::results",
        "Loaded {} result rows from {}",
        rows.len(),
        path.display()
    );

    Ok(rows)
}

/// Parses CSV result data from any reader. `source` is only used in error messages.
pub fn parse_results<R: Read>(reader: R, source: &Path) -> Result<Vec<ResultRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| csv_error(source, e))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(RenderError::malformed(
                source,
                format!("missing required column `{column}`"),
            ));
        }
    }

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<CsvRow>().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        let record = record.map_err(|e| csv_error(source, e))?;
        let mean = parse_mean(&record.mean).ok_or_else(|| {
            RenderError::malformed(
                source,
                format!(
                    "line {line}: mean `{}` for `{}` is not a non-negative number",
                    record.mean, record.command
                ),
            )
        })?;

        rows.push(ResultRow {
            command: record.command,
            mean,
            stddev: record.stddev,
            median: record.median,
            user: record.user,
            system: record.system,
            min: record.min,
            max: record.max,
        });
    }

    if rows.is_empty() {
        return Err(RenderError::malformed(source, "no benchmark rows"));
    }

    Ok(rows)
}

/// Merges rows that share a `command` into one row per distinct command.
///
/// Commands keep the order of their first appearance and a merged row's mean is
/// the average of its rows' means. The secondary statistics of a merged row
/// cannot be combined and are dropped.
pub fn group_by_command(rows: &[ResultRow]) -> Vec<ResultRow> {
    let mut groups: Vec<(ResultRow, usize)> = Vec::with_capacity(rows.len());
    for row in rows {
        match groups.iter_mut().find(|(group, _)| group.command == row.command) {
            Some((group, count)) => {
                group.mean += row.mean;
                *count += 1;
            }
            None => groups.push((row.clone(), 1)),
        }
    }

    groups
        .into_iter()
        .map(|(group, count)| {
            if count == 1 {
                group
            } else {
                ResultRow::new(group.command, group.mean / count as f64)
            }
        })
        .collect()
}

/// I/O failures while reading keep their source, everything else is malformed data.
fn csv_error(source: &Path, e: csv::Error) -> RenderError {
    if !e.is_io_error() {
        return RenderError::malformed(source, e.to_string());
    }
    match e.into_kind() {
        csv::ErrorKind::Io(io) => RenderError::input(source, io),
        kind => RenderError::malformed(source, format!("{kind:?}")),
    }
}

fn parse_mean(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}
