use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use dropout_predictor::pipeline::adapters::{InferenceError, TransformError};
use dropout_predictor::pipeline::{ClassCode, Classifier, FeatureMatrix, Preprocessor};

/// Records every batch it sees and returns it unchanged.
#[derive(Default)]
pub struct RecordingScaler {
    pub seen: Mutex<Vec<FeatureMatrix>>,
}

impl RecordingScaler {
    pub fn last_batch(&self) -> Option<FeatureMatrix> {
        self.seen
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .last()
            .cloned()
    }
}

impl Preprocessor for RecordingScaler {
    fn transform(&self, batch: &FeatureMatrix) -> Result<FeatureMatrix, TransformError> {
        self.seen
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push(batch.clone());
        Ok(batch.clone())
    }
}

/// Returns a fixed code sequence and counts calls.
pub struct ScriptedClassifier {
    codes: Vec<ClassCode>,
    pub calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(codes: Vec<ClassCode>) -> Self {
        Self {
            codes,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for ScriptedClassifier {
    fn predict(&self, _batch: &FeatureMatrix) -> Result<Vec<ClassCode>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.codes.clone())
    }
}

/// Classifier that always fails.
pub struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn predict(&self, _batch: &FeatureMatrix) -> Result<Vec<ClassCode>, InferenceError> {
        Err(InferenceError::Internal("model file truncated".to_string()))
    }
}

/// Preprocessor fitted on a different number of columns.
pub struct NarrowScaler;

impl Preprocessor for NarrowScaler {
    fn transform(&self, batch: &FeatureMatrix) -> Result<FeatureMatrix, TransformError> {
        Err(TransformError::ShapeMismatch {
            expected: 9,
            found: batch.ncols(),
        })
    }
}
