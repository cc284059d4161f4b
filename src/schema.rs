//! Required feature columns for inference.

use thiserror::Error;

use crate::table::InputTable;

/// Ordered feature columns the fitted scaler and classifier were trained on.
pub const STUDENT_FEATURES: FeatureSchema = FeatureSchema::new(&[
    "Tuition_fees_up_to_date",
    "Scholarship_holder",
    "Age_at_enrollment",
    "Curricular_units_1st_sem_approved",
    "Curricular_units_2nd_sem_approved",
    "Curricular_units_2nd_sem_grade",
    "Debtor",
    "Gender",
    "Academic_Trend",
    "GDP",
]);

/// Input table does not satisfy the feature schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Required columns are absent. Names are listed in schema order.
    #[error("feature set mismatch: missing {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}

/// Fixed, ordered set of column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: &'static [&'static str],
}

impl FeatureSchema {
    pub const fn new(columns: &'static [&'static str]) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Schema columns absent from `table`, in schema order.
    pub fn missing_columns(&self, table: &InputTable) -> Vec<String> {
        self.columns
            .iter()
            .filter(|name| !table.has_column(name))
            .map(|name| (*name).to_string())
            .collect()
    }

    /// Accept `table` iff every schema column is present (exact, case-sensitive).
    pub fn validate(&self, table: &InputTable) -> Result<(), SchemaError> {
        let missing = self.missing_columns(table);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::MissingColumns { missing })
        }
    }
}

/// Check `table` against `schema`.
pub fn validate(table: &InputTable, schema: &FeatureSchema) -> Result<(), SchemaError> {
    schema.validate(table)
}
