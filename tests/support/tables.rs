use dropout_predictor::schema::STUDENT_FEATURES;
use dropout_predictor::table::{CellValue, InputTable};

/// Header with a leading name column followed by every schema feature.
pub fn student_columns() -> Vec<String> {
    std::iter::once("Student_Name".to_string())
        .chain(STUDENT_FEATURES.columns().iter().map(|name| name.to_string()))
        .collect()
}

/// A plausible student record with distinct per-column values.
pub fn student_row(name: &str, seed: f64) -> Vec<CellValue> {
    std::iter::once(CellValue::Text(name.to_string()))
        .chain((0..STUDENT_FEATURES.len()).map(|col| CellValue::number(seed + col as f64)))
        .collect()
}

pub fn student_table(rows: usize) -> InputTable {
    InputTable::from_rows(
        student_columns(),
        (0..rows)
            .map(|idx| student_row(&format!("student_{idx}"), idx as f64 * 10.0))
            .collect(),
    )
    .expect("valid student table")
}

/// Student table with one schema column removed.
pub fn student_table_without(column: &str, rows: usize) -> InputTable {
    let full = student_table(rows);
    let keep: Vec<usize> = full
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| name.as_str() != column)
        .map(|(idx, _)| idx)
        .collect();
    InputTable::from_rows(
        keep.iter().map(|&idx| full.columns()[idx].clone()),
        full.rows()
            .map(|row| keep.iter().map(|&idx| row.cells()[idx].clone()).collect())
            .collect(),
    )
    .expect("valid reduced table")
}
