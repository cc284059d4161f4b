//! Seams between the pipeline and the fitted artifacts.
//!
//! Both traits take `&self`: artifacts are shared read-only across concurrent
//! batches and must not mutate internal state while serving a call.

use std::sync::Arc;

use ndarray::Array2;
use thiserror::Error;

use crate::ml::ClassifierModel;
use crate::ml::scaler::{ScalerError, StandardScalerModel};

/// Row-major batch of feature rows.
pub type FeatureMatrix = Array2<f64>;

/// Raw classifier output before labeling.
pub type ClassCode = i64;

/// The preprocessor rejected the batch or could not produce a valid result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    #[error("preprocessor expects {expected} feature columns, got {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("row {row} column {column} is not numeric: {value:?}")]
    NonNumericCell {
        row: usize,
        column: String,
        value: String,
    },
    #[error("preprocessor returned a {found_rows}x{found_cols} batch for a {expected_rows}x{expected_cols} input")]
    OutputShape {
        expected_rows: usize,
        expected_cols: usize,
        found_rows: usize,
        found_cols: usize,
    },
    #[error("preprocessor failed: {0}")]
    Internal(String),
}

/// The classifier rejected the batch or failed internally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InferenceError {
    #[error("classifier expects {expected} feature columns, got {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("classifier returned {found} predictions for {expected} rows")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("classifier failed: {0}")]
    Internal(String),
}

/// Any failure raised by a fitted artifact.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdapterError {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl AdapterError {
    /// Pipeline step that raised the error, for log lines.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Transform(_) => "Preprocessing",
            Self::Inference(_) => "Classification",
        }
    }
}

/// Fitted scaling transform.
pub trait Preprocessor: Send + Sync {
    fn transform(&self, batch: &FeatureMatrix) -> Result<FeatureMatrix, TransformError>;
}

/// Fitted multi-class classifier.
pub trait Classifier: Send + Sync {
    fn predict(&self, batch: &FeatureMatrix) -> Result<Vec<ClassCode>, InferenceError>;
}

impl<T: Preprocessor + ?Sized> Preprocessor for Arc<T> {
    fn transform(&self, batch: &FeatureMatrix) -> Result<FeatureMatrix, TransformError> {
        (**self).transform(batch)
    }
}

impl<T: Classifier + ?Sized> Classifier for Arc<T> {
    fn predict(&self, batch: &FeatureMatrix) -> Result<Vec<ClassCode>, InferenceError> {
        (**self).predict(batch)
    }
}

impl Preprocessor for StandardScalerModel {
    fn transform(&self, batch: &FeatureMatrix) -> Result<FeatureMatrix, TransformError> {
        StandardScalerModel::transform(self, batch).map_err(|err| match err {
            ScalerError::ShapeMismatch { expected, found } => {
                TransformError::ShapeMismatch { expected, found }
            }
            other => TransformError::Internal(other.to_string()),
        })
    }
}

impl Classifier for ClassifierModel {
    fn predict(&self, batch: &FeatureMatrix) -> Result<Vec<ClassCode>, InferenceError> {
        if batch.ncols() != self.n_features() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.n_features(),
                found: batch.ncols(),
            });
        }
        batch
            .rows()
            .into_iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let features = row.to_vec();
                self.predict_class_code(&features).ok_or_else(|| {
                    InferenceError::Internal(format!("no class code for row {row_idx}"))
                })
            })
            .collect()
    }
}

/// Run the preprocessor and require a same-shaped result.
pub fn transform_checked(
    preprocessor: &dyn Preprocessor,
    batch: &FeatureMatrix,
) -> Result<FeatureMatrix, TransformError> {
    let scaled = preprocessor.transform(batch)?;
    if scaled.dim() != batch.dim() {
        return Err(TransformError::OutputShape {
            expected_rows: batch.nrows(),
            expected_cols: batch.ncols(),
            found_rows: scaled.nrows(),
            found_cols: scaled.ncols(),
        });
    }
    Ok(scaled)
}

/// Run the classifier and require one code per input row.
pub fn predict_checked(
    classifier: &dyn Classifier,
    batch: &FeatureMatrix,
) -> Result<Vec<ClassCode>, InferenceError> {
    let codes = classifier.predict(batch)?;
    if codes.len() != batch.nrows() {
        return Err(InferenceError::RowCountMismatch {
            expected: batch.nrows(),
            found: codes.len(),
        });
    }
    Ok(codes)
}
