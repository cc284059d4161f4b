mod support;

use std::sync::Arc;
use std::thread;

use support::mock_artifacts::{
    BrokenClassifier, NarrowScaler, RecordingScaler, ScriptedClassifier,
};
use support::tables::{student_columns, student_row, student_table, student_table_without};

use dropout_predictor::artifacts::FittedArtifacts;
use dropout_predictor::ml::scaler::StandardScalerModel;
use dropout_predictor::pipeline::adapters::{AdapterError, InferenceError, TransformError};
use dropout_predictor::pipeline::export::to_csv_bytes;
use dropout_predictor::pipeline::label::StatusLabel;
use dropout_predictor::pipeline::{Pipeline, PipelineError, PipelineState};
use dropout_predictor::schema::{STUDENT_FEATURES, SchemaError};
use dropout_predictor::table::{CellValue, InputTable};

fn pipeline_with(
    scaler: Arc<RecordingScaler>,
    classifier: Arc<ScriptedClassifier>,
) -> Pipeline {
    Pipeline::new(Arc::new(FittedArtifacts::new(scaler, classifier)))
}

#[test]
fn three_rows_map_to_each_status() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![0, 1, 2]));
    let pipeline = pipeline_with(Arc::default(), Arc::clone(&classifier));

    let run = pipeline.execute(&student_table(3));
    assert_eq!(run.final_state(), PipelineState::Done);
    let result = run.into_result().expect("pipeline succeeds");

    assert_eq!(
        result.labels().collect::<Vec<_>>(),
        [
            StatusLabel::Dropout,
            StatusLabel::Enrolled,
            StatusLabel::Graduate
        ]
    );
    let summary = result.summary();
    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.dropout_count, 1);
    assert_eq!(classifier.call_count(), 1);
}

#[test]
fn missing_gdp_halts_at_validation() {
    let scaler = Arc::new(RecordingScaler::default());
    let classifier = Arc::new(ScriptedClassifier::new(vec![0, 0]));
    let pipeline = pipeline_with(Arc::clone(&scaler), Arc::clone(&classifier));

    let run = pipeline.execute(&student_table_without("GDP", 2));
    assert_eq!(
        run.states(),
        [
            PipelineState::Idle,
            PipelineState::Validating,
            PipelineState::Rejected
        ]
    );
    let err = run.into_result().unwrap_err();
    assert_eq!(
        err,
        PipelineError::Rejected(SchemaError::MissingColumns {
            missing: vec!["GDP".to_string()]
        })
    );
    assert!(scaler.last_batch().is_none());
    assert_eq!(classifier.call_count(), 0);
}

#[test]
fn empty_age_cell_is_zero_before_scaling() {
    let mut row = student_row("Ani", 5.0);
    let columns = student_columns();
    let age = columns
        .iter()
        .position(|name| name == "Age_at_enrollment")
        .unwrap();
    row[age] = CellValue::Empty;
    let table = InputTable::from_rows(columns, vec![row]).unwrap();

    let scaler = Arc::new(RecordingScaler::default());
    let classifier = Arc::new(ScriptedClassifier::new(vec![1]));
    let result = pipeline_with(Arc::clone(&scaler), Arc::clone(&classifier))
        .run(&table)
        .expect("prediction proceeds");

    let batch = scaler.last_batch().expect("scaler was called");
    let age_feature = STUDENT_FEATURES
        .columns()
        .iter()
        .position(|name| *name == "Age_at_enrollment")
        .unwrap();
    assert_eq!(batch.dim(), (1, STUDENT_FEATURES.len()));
    assert_eq!(batch[[0, age_feature]], 0.0);
    assert!(batch.iter().all(|value| value.is_finite()));
    assert_eq!(result.labels().next(), Some(StatusLabel::Enrolled));
    // the exported row keeps the cell empty rather than the substituted zero
    assert_eq!(result.rows()[0].cells[age].export_text(), "");
}

#[test]
fn features_reach_scaler_in_schema_order() {
    // reversed header with an extra column in the middle
    let mut columns: Vec<String> = STUDENT_FEATURES
        .columns()
        .iter()
        .rev()
        .map(|name| name.to_string())
        .collect();
    columns.insert(4, "Marital_status".to_string());
    let row: Vec<CellValue> = columns
        .iter()
        .map(|name| match STUDENT_FEATURES.columns().iter().position(|c| c == name) {
            Some(idx) => CellValue::number(idx as f64),
            None => CellValue::number(-1.0),
        })
        .collect();
    let table = InputTable::from_rows(columns, vec![row]).unwrap();

    let scaler = Arc::new(RecordingScaler::default());
    pipeline_with(Arc::clone(&scaler), Arc::new(ScriptedClassifier::new(vec![2])))
        .run(&table)
        .unwrap();
    let batch = scaler.last_batch().unwrap();
    let expected: Vec<f64> = (0..STUDENT_FEATURES.len()).map(|idx| idx as f64).collect();
    assert_eq!(batch.row(0).to_vec(), expected);
}

#[test]
fn unknown_codes_surface_as_unknown_label() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![-1, 3, 99, 0]));
    let result = pipeline_with(Arc::default(), classifier)
        .run(&student_table(4))
        .unwrap();
    let summary = result.summary();
    assert_eq!(summary.unknown_count, 3);
    assert_eq!(summary.dropout_count, 1);
    let csv = String::from_utf8(to_csv_bytes(&result).unwrap()).unwrap();
    assert_eq!(csv.matches("\nUnknown,").count(), 3);
}

#[test]
fn adapter_failures_are_deployment_errors() {
    let broken = Pipeline::new(Arc::new(FittedArtifacts::new(
        StandardScalerModel::identity(STUDENT_FEATURES.len()),
        BrokenClassifier,
    )));
    let err = broken.run(&student_table(2)).unwrap_err();
    assert!(err.is_deployment_error());
    assert!(matches!(
        err,
        PipelineError::Failed(AdapterError::Inference(InferenceError::Internal(_)))
    ));

    let narrow = Pipeline::new(Arc::new(FittedArtifacts::new(
        NarrowScaler,
        ScriptedClassifier::new(vec![0, 0]),
    )));
    let run = narrow.execute(&student_table(2));
    assert_eq!(run.final_state(), PipelineState::Failed);
    assert_eq!(
        run.into_result().unwrap_err(),
        PipelineError::Failed(AdapterError::Transform(TransformError::ShapeMismatch {
            expected: 9,
            found: STUDENT_FEATURES.len()
        }))
    );
}

#[test]
fn non_numeric_feature_fails_the_batch() {
    let mut row = student_row("Budi", 1.0);
    row[8] = CellValue::Text("Female".to_string());
    let table = InputTable::from_rows(student_columns(), vec![row]).unwrap();
    let classifier = Arc::new(ScriptedClassifier::new(vec![0]));
    let err = pipeline_with(Arc::default(), Arc::clone(&classifier))
        .run(&table)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidData(TransformError::NonNumericCell { .. })
    ));
    assert!(err.is_input_error());
    assert!(!err.is_deployment_error());
    assert_eq!(err.terminal_state(), PipelineState::Failed);
    assert_eq!(classifier.call_count(), 0);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let pipeline = pipeline_with(
        Arc::default(),
        Arc::new(ScriptedClassifier::new(vec![2, 0, 1, 0])),
    );
    let table = student_table(4);
    let first = pipeline.run(&table).unwrap();
    let second = pipeline.run(&table).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.summary(), second.summary());
    assert_eq!(to_csv_bytes(&first).unwrap(), to_csv_bytes(&second).unwrap());
}

#[test]
fn concurrent_batches_share_artifacts() {
    let pipeline = Pipeline::new(Arc::new(FittedArtifacts::new(
        StandardScalerModel::identity(STUDENT_FEATURES.len()),
        ScriptedClassifier::new(vec![0, 1, 2, 0, 1]),
    )));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            thread::spawn(move || pipeline.run(&student_table(5)).map(|r| r.summary()))
        })
        .collect();
    for handle in handles {
        let summary = handle.join().unwrap().unwrap();
        assert_eq!(summary.total_rows, 5);
        assert_eq!(summary.dropout_count, 2);
    }
}
