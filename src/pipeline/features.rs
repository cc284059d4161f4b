//! Feature vector extraction in schema order.

use ndarray::Array2;

use crate::schema::{FeatureSchema, SchemaError};
use crate::table::{CellValue, InputTable, Row};

use super::adapters::{FeatureMatrix, TransformError};

/// One row restricted to the schema columns, in schema order, with missing
/// cells replaced by `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Extraction counters for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Substitutions {
    /// Empty, `NaN` or marker feature cells replaced with zero.
    pub filled_cells: usize,
}

/// Neutral value used for missing feature cells.
pub const MISSING_FEATURE_DEFAULT: f64 = 0.0;

fn feature_value(
    cell: Option<&CellValue>,
    row: usize,
    column: &str,
) -> Result<Option<f64>, TransformError> {
    match cell {
        None | Some(CellValue::Empty | CellValue::Missing(_)) => Ok(None),
        Some(CellValue::Number { value, .. }) if value.is_nan() => Ok(None),
        Some(CellValue::Number { value, .. }) => Ok(Some(*value)),
        Some(CellValue::Text(text)) => Err(TransformError::NonNumericCell {
            row,
            column: column.to_string(),
            value: text.clone(),
        }),
    }
}

fn extract_row(
    row: Row<'_>,
    row_idx: usize,
    schema: &FeatureSchema,
    substitutions: &mut Substitutions,
) -> Result<FeatureVector, TransformError> {
    let mut values = Vec::with_capacity(schema.len());
    for column in schema.columns() {
        let value = match feature_value(row.get(column), row_idx, column)? {
            Some(value) => value,
            None => {
                substitutions.filled_cells += 1;
                MISSING_FEATURE_DEFAULT
            }
        };
        values.push(value);
    }
    Ok(FeatureVector { values })
}

/// Build one [`FeatureVector`] per row.
///
/// The table must already have passed schema validation; a missing column is
/// reported again rather than silently zero-filled.
pub fn extract_feature_vectors(
    table: &InputTable,
    schema: &FeatureSchema,
) -> Result<(Vec<FeatureVector>, Substitutions), ExtractError> {
    schema.validate(table)?;
    let mut substitutions = Substitutions::default();
    let vectors = table
        .rows()
        .enumerate()
        .map(|(row_idx, row)| extract_row(row, row_idx, schema, &mut substitutions))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((vectors, substitutions))
}

/// Stack feature vectors into a `rows x width` batch.
pub fn to_matrix(vectors: &[FeatureVector], width: usize) -> Result<FeatureMatrix, TransformError> {
    let mut flat = Vec::with_capacity(vectors.len() * width);
    for vector in vectors {
        if vector.len() != width {
            return Err(TransformError::ShapeMismatch {
                expected: width,
                found: vector.len(),
            });
        }
        flat.extend_from_slice(vector.values());
    }
    Array2::from_shape_vec((vectors.len(), width), flat)
        .map_err(|err| TransformError::Internal(err.to_string()))
}

/// Failure while extracting features.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ExtractError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}
