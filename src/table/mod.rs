//! In-memory tabular input with named columns.
//!
//! Rows keep every cell of the source file, including columns the predictor
//! never reads, so results can be exported next to the original data.

pub mod csv_io;

use std::collections::HashMap;

use thiserror::Error;

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Numeric cell. `raw` is the source text and is what gets exported.
    Number { value: f64, raw: String },
    /// Non-numeric text, kept verbatim.
    Text(String),
    /// Present but empty.
    Empty,
    /// Missing-value marker such as `NA` or `null`, kept verbatim for export.
    Missing(String),
}

/// Tokens read as missing values, as pandas does by default.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

impl CellValue {
    /// Build a numeric cell from a value with no source text.
    pub fn number(value: f64) -> Self {
        Self::Number {
            value,
            raw: value.to_string(),
        }
    }

    /// Classify source text. Numbers and markers keep the text unchanged.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if MISSING_MARKERS.contains(&trimmed) {
            return Self::Missing(text.to_string());
        }
        match trimmed.parse::<f64>() {
            Ok(value) => Self::Number {
                value,
                raw: text.to_string(),
            },
            Err(_) => Self::Text(text.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Empty cell or missing-value marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Empty | Self::Missing(_))
    }

    /// Text written to exports.
    pub fn export_text(&self) -> &str {
        match self {
            Self::Number { raw, .. } => raw,
            Self::Text(text) | Self::Missing(text) => text,
            Self::Empty => "",
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

/// Errors raised while building a table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The header names the same column twice.
    #[error("Duplicate column name {0:?}")]
    DuplicateColumn(String),
    /// A row has a different number of cells than the header.
    #[error("Row {row} has {found} cells but the header has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Ordered rows sharing one header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl InputTable {
    /// Create an empty table with the given header.
    pub fn new<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            columns,
            index,
            rows: Vec::new(),
        })
    }

    /// Create a table and append every row.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<CellValue>>) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, cells: Vec<CellValue>) -> Result<(), TableError> {
        if cells.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        self.rows.get(position).map(|cells| Row { table: self, cells })
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row { table: self, cells })
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a InputTable,
    cells: &'a [CellValue],
}

impl<'a> Row<'a> {
    /// Look up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        self.table
            .column_index(column)
            .and_then(|position| self.cells.get(position))
    }

    /// Cells in header order.
    pub fn cells(&self) -> &'a [CellValue] {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classifies_cells() {
        assert_eq!(CellValue::parse("  "), CellValue::Empty);
        assert_eq!(CellValue::parse("19").as_f64(), Some(19.0));
        assert_eq!(CellValue::parse("1.50").export_text(), "1.50");
        assert_eq!(
            CellValue::parse("Male"),
            CellValue::Text("Male".to_string())
        );
    }

    #[test]
    fn missing_markers_keep_their_text() {
        for marker in ["NA", "N/A", "null", "NULL", "None", "#N/A", "<NA>", "n/a", "nan"] {
            let cell = CellValue::parse(marker);
            assert!(cell.is_missing(), "{marker}");
            assert_eq!(cell.as_f64(), None);
            assert_eq!(cell.export_text(), marker);
        }
        assert_eq!(CellValue::parse("Na"), CellValue::Text("Na".to_string()));
    }

    #[test]
    fn numbers_export_untrimmed_source_text() {
        let cell = CellValue::parse(" 19 ");
        assert_eq!(cell.as_f64(), Some(19.0));
        assert_eq!(cell.export_text(), " 19 ");
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = InputTable::new(["GDP", "GDP"]).unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("GDP".to_string()));
    }

    #[test]
    fn rejects_ragged_rows() {
        let mut table = InputTable::new(["a", "b"]).unwrap();
        let err = table.push_row(vec![CellValue::number(1.0)]).unwrap_err();
        assert_eq!(
            err,
            TableError::RowWidth {
                row: 0,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn row_lookup_by_name() {
        let table = InputTable::from_rows(
            ["id", "GDP"],
            vec![vec!["s1".into(), 1.74.into()]],
        )
        .unwrap();
        let row = table.row(0).unwrap();
        assert_eq!(row.get("GDP").and_then(CellValue::as_f64), Some(1.74));
        assert!(row.get("missing").is_none());
    }
}
