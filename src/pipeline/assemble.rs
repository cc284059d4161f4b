//! Merge labels back onto the source rows and summarize them.

use serde::Serialize;
use thiserror::Error;

use crate::schema::FeatureSchema;
use crate::table::{CellValue, InputTable};

use super::label::StatusLabel;

/// Header of the prediction column, always exported first.
pub const LABEL_COLUMN: &str = "Hasil_Prediksi";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("got {labels} labels for {rows} rows")]
    LengthMismatch { rows: usize, labels: usize },
}

/// Aggregate counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_rows: usize,
    pub dropout_count: usize,
    pub enrolled_count: usize,
    pub graduate_count: usize,
    pub unknown_count: usize,
}

impl Summary {
    pub fn from_labels(labels: &[StatusLabel]) -> Self {
        let mut summary = Self {
            total_rows: labels.len(),
            ..Self::default()
        };
        for label in labels {
            match label {
                StatusLabel::Dropout => summary.dropout_count += 1,
                StatusLabel::Enrolled => summary.enrolled_count += 1,
                StatusLabel::Graduate => summary.graduate_count += 1,
                StatusLabel::Unknown => summary.unknown_count += 1,
            }
        }
        summary
    }

    pub fn count(&self, label: StatusLabel) -> usize {
        match label {
            StatusLabel::Dropout => self.dropout_count,
            StatusLabel::Enrolled => self.enrolled_count,
            StatusLabel::Graduate => self.graduate_count,
            StatusLabel::Unknown => self.unknown_count,
        }
    }
}

/// Source row plus its predicted label.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub label: StatusLabel,
    /// Source cells aligned with [`ResultTable::source_columns`].
    pub cells: Vec<CellValue>,
}

/// Labeled copy of the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    source_columns: Vec<String>,
    rows: Vec<ResultRow>,
    summary: Summary,
}

impl ResultTable {
    /// Export header: the label column followed by the source columns.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(LABEL_COLUMN)
            .chain(self.source_columns.iter().map(String::as_str))
            .collect()
    }

    pub fn source_columns(&self) -> &[String] {
        &self.source_columns
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn labels(&self) -> impl ExactSizeIterator<Item = StatusLabel> + '_ {
        self.rows.iter().map(|row| row.label)
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `limit` rows showing the label and the schema columns only.
    pub fn preview(&self, schema: &FeatureSchema, limit: usize) -> Preview {
        let positions: Vec<Option<usize>> = schema
            .columns()
            .iter()
            .map(|name| self.source_columns.iter().position(|column| column == name))
            .collect();
        let mut columns = Vec::with_capacity(schema.len() + 1);
        columns.push(LABEL_COLUMN.to_string());
        columns.extend(schema.columns().iter().map(|name| (*name).to_string()));
        let rows = self
            .rows
            .iter()
            .take(limit)
            .map(|row| {
                std::iter::once(row.label.as_str().to_string())
                    .chain(positions.iter().map(|position| {
                        position
                            .and_then(|idx| row.cells.get(idx))
                            .map(|cell| cell.export_text().to_string())
                            .unwrap_or_default()
                    }))
                    .collect()
            })
            .collect();
        Preview { columns, rows }
    }
}

/// Text rendering of the head of a [`ResultTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Attach `labels` to the rows of `table` and compute the summary.
///
/// A source column already named [`LABEL_COLUMN`] is replaced by the new
/// prediction.
pub fn assemble(table: &InputTable, labels: &[StatusLabel]) -> Result<ResultTable, AssembleError> {
    if labels.len() != table.len() {
        return Err(AssembleError::LengthMismatch {
            rows: table.len(),
            labels: labels.len(),
        });
    }
    let replaced = table.column_index(LABEL_COLUMN);
    let keep = |position: &usize| Some(*position) != replaced;
    let source_columns = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(position, _)| keep(position))
        .map(|(_, name)| name.clone())
        .collect();
    let rows = table
        .rows()
        .zip(labels)
        .map(|(row, &label)| ResultRow {
            label,
            cells: row
                .cells()
                .iter()
                .enumerate()
                .filter(|(position, _)| keep(position))
                .map(|(_, cell)| cell.clone())
                .collect(),
        })
        .collect();
    Ok(ResultTable {
        source_columns,
        rows,
        summary: Summary::from_labels(labels),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use StatusLabel::*;

    fn table() -> InputTable {
        InputTable::from_rows(
            ["Name", "GDP"],
            vec![
                vec!["Ani".into(), "1.740".into()],
                vec!["Budi".into(), CellValue::Empty],
                vec!["Citra".into(), "-0.92".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn label_column_comes_first() {
        let result = assemble(&table(), &[Dropout, Enrolled, Graduate]).unwrap();
        assert_eq!(result.columns(), ["Hasil_Prediksi", "Name", "GDP"]);
        assert_eq!(result.rows()[0].cells[1].export_text(), "1.740");
        assert_eq!(
            result.labels().collect::<Vec<_>>(),
            [Dropout, Enrolled, Graduate]
        );
    }

    #[test]
    fn summary_counts_dropouts() {
        let result = assemble(&table(), &[Dropout, Unknown, Dropout]).unwrap();
        let summary = result.summary();
        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.dropout_count, 2);
        assert_eq!(summary.unknown_count, 1);
        assert!(summary.dropout_count <= summary.total_rows);
    }

    #[test]
    fn summary_matches_label_counts_for_all_sequences() {
        // every length-3 sequence over the four labels
        for a in StatusLabel::ALL {
            for b in StatusLabel::ALL {
                for c in StatusLabel::ALL {
                    let labels = [a, b, c];
                    let summary = Summary::from_labels(&labels);
                    for label in StatusLabel::ALL {
                        let expected = labels.iter().filter(|l| **l == label).count();
                        assert_eq!(summary.count(label), expected);
                    }
                    assert!(summary.dropout_count <= summary.total_rows);
                }
            }
        }
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = assemble(&table(), &[Dropout]).unwrap_err();
        assert_eq!(err, AssembleError::LengthMismatch { rows: 3, labels: 1 });
    }

    #[test]
    fn is_deterministic() {
        let labels = [Graduate, Dropout, Enrolled];
        let first = assemble(&table(), &labels).unwrap();
        let second = assemble(&table(), &labels).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn existing_label_column_is_replaced() {
        let source = InputTable::from_rows(
            ["Hasil_Prediksi", "GDP"],
            vec![vec!["Graduate".into(), 1.0.into()]],
        )
        .unwrap();
        let result = assemble(&source, &[Dropout]).unwrap();
        assert_eq!(result.columns(), ["Hasil_Prediksi", "GDP"]);
        assert_eq!(result.rows()[0].cells.len(), 1);
    }

    #[test]
    fn preview_limits_rows_and_columns() {
        const SCHEMA: FeatureSchema = FeatureSchema::new(&["GDP"]);
        let result = assemble(&table(), &[Dropout, Enrolled, Graduate]).unwrap();
        let preview = result.preview(&SCHEMA, 2);
        assert_eq!(preview.columns, ["Hasil_Prediksi", "GDP"]);
        assert_eq!(
            preview.rows,
            vec![
                vec!["Dropout".to_string(), "1.740".to_string()],
                vec!["Enrolled".to_string(), String::new()],
            ]
        );
    }
}
