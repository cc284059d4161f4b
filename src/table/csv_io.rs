//! CSV reader producing an [`InputTable`].

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{CellValue, InputTable, TableError};

#[derive(Debug, Error)]
pub enum TableReadError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Read a CSV file with a header row.
pub fn read_csv_path(path: &Path) -> Result<InputTable, TableReadError> {
    let file = File::open(path).map_err(|source| TableReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

/// Read CSV text with a header row.
///
/// Short records are padded with empty cells; long records are rejected.
pub fn read_csv<R: Read>(reader: R) -> Result<InputTable, TableReadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let width = headers.len();
    let mut table = InputTable::new(headers.iter().map(str::to_string))?;
    for record in reader.records() {
        let record = record?;
        let mut cells: Vec<CellValue> = record.iter().map(CellValue::parse).collect();
        if cells.len() < width {
            cells.resize(width, CellValue::Empty);
        }
        table.push_row(cells)?;
    }
    tracing::debug!(
        "Read table with {} columns and {} rows",
        table.columns().len(),
        table.len()
    );
    Ok(table)
}
