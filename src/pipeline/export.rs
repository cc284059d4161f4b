//! CSV export of a [`ResultTable`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::assemble::ResultTable;

/// File name offered when the caller does not supply one.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "hasil_prediksi.csv";
pub const EXPORT_MIME: &str = "text/csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to flush export: {0}")]
    Flush(std::io::Error),
    #[error("Failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Downloadable export payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Write the header and every row as UTF-8 CSV.
pub fn write_csv<W: Write>(result: &ResultTable, writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(result.columns())?;
    for row in result.rows() {
        csv.write_record(
            std::iter::once(row.label.as_str()).chain(row.cells.iter().map(|cell| cell.export_text())),
        )?;
    }
    csv.flush().map_err(ExportError::Flush)
}

pub fn to_csv_bytes(result: &ResultTable) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    write_csv(result, &mut bytes)?;
    Ok(bytes)
}

/// Render the export under `file_name`, or [`DEFAULT_EXPORT_FILE_NAME`].
pub fn export_artifact(
    result: &ResultTable,
    file_name: Option<&str>,
) -> Result<ExportArtifact, ExportError> {
    let file_name = file_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_EXPORT_FILE_NAME)
        .to_string();
    Ok(ExportArtifact {
        file_name,
        mime: EXPORT_MIME,
        bytes: to_csv_bytes(result)?,
    })
}

pub fn write_csv_file(result: &ResultTable, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(result, BufWriter::new(file))?;
    tracing::info!("Wrote {} result rows to {}", result.len(), path.display());
    Ok(())
}
