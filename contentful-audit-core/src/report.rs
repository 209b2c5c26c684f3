//! CSV and JSON files written into the output directory.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "report I/O error: {e}"),
            ReportError::Csv(e) => write!(f, "report CSV error: {e}"),
            ReportError::Json(e) => write!(f, "report JSON error: {e}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        ReportError::Io(e)
    }
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        ReportError::Csv(e)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        ReportError::Json(e)
    }
}

pub fn ensure_dir(dir: &Path) -> Result<(), ReportError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            error!(error = ?e, path = %dir.display(), "Failed to create output directory");
            e
        })?;
        debug!(path = %dir.display(), "Created output directory");
    }
    Ok(())
}

/// Write `rows` under a fixed header. The header is written even when `rows` is empty.
pub fn write_csv<T: Serialize>(
    dir: &Path,
    file_name: &str,
    headers: &[&str],
    rows: &[T],
) -> Result<PathBuf, ReportError> {
    ensure_dir(dir)?;
    let path = dir.join(file_name);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "CSV report written");
    Ok(path)
}

/// Read a headed CSV file into records.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ReportError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to open CSV file");
        e
    })?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    info!(path = %path.display(), rows = rows.len(), "CSV file read");
    Ok(rows)
}

pub fn write_json<T: Serialize + ?Sized>(
    dir: &Path,
    file_name: &str,
    value: &T,
) -> Result<PathBuf, ReportError> {
    ensure_dir(dir)?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json)?;
    info!(path = %path.display(), "JSON snapshot written");
    Ok(path)
}
