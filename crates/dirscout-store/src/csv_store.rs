//! Row-level CSV persistence.
//!
//! Stores are append-only: a header is written when the file is first
//! created (or found empty) and every later call appends exactly one row.
//! Column order follows the row type's field declaration order.

use std::fs::OpenOptions;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Appends `row` to the CSV file at `path`, creating parent directories and
/// the header on first write.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the directory or file cannot be opened and
/// [`StoreError::Csv`] if the row cannot be serialized or flushed.
pub fn append_row<T: Serialize>(path: &Path, row: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let needs_header = file
        .metadata()
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len()
        == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer.serialize(row).map_err(|source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Reads every row of the CSV file at `path` in file order.
///
/// A missing file reads as empty. Rows that fail to deserialize are logged
/// and skipped.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if the file exists but cannot be opened or
/// its header cannot be read.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                // +2: one for the header, one for 1-based line numbers
                tracing::warn!(
                    path = %path.display(),
                    line = idx + 2,
                    error = %e,
                    "skipping malformed row"
                );
            }
        }
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "csv_store_test.rs"]
mod tests;
