//! Fitted artifact loading.
//!
//! Artifacts are loaded once and shared read-only. Loading either succeeds with
//! a usable scaler and classifier or returns an [`ArtifactError`]; there is no
//! "no model" state for the pipeline to trip over later.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::ml::ClassifierModel;
use crate::ml::scaler::StandardScalerModel;
use crate::pipeline::{Classifier, Preprocessor};
use crate::schema::{FeatureSchema, STUDENT_FEATURES};

/// Default classifier file name inside the models directory.
pub const MODEL_FILE_NAME: &str = "best_model_student_dropout.json";
/// Default scaler file name inside the models directory.
pub const SCALER_FILE_NAME: &str = "scaler_model.json";

static SHARED: OnceLock<Arc<FittedArtifacts>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Scaler,
    Classifier,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scaler => f.write_str("scaler"),
            Self::Classifier => f.write_str("classifier"),
        }
    }
}

/// Errors raised while loading fitted artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("{kind} artifact not found at {path}")]
    Missing { kind: ArtifactKind, path: PathBuf },
    #[error("Invalid {kind} artifact at {path}: {message}")]
    Invalid {
        kind: ArtifactKind,
        path: PathBuf,
        message: String,
    },
    #[error("{kind} expects {found} features but the schema has {expected}")]
    FeatureCount {
        kind: ArtifactKind,
        expected: usize,
        found: usize,
    },
    #[error("Scaler was fitted on column {found:?} at position {position}, expected {expected:?}")]
    FeatureOrder {
        position: usize,
        expected: String,
        found: String,
    },
}

/// Where the fitted artifacts live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(MODEL_FILE_NAME),
            scaler: dir.join(SCALER_FILE_NAME),
        }
    }
}

/// Loaded scaler and classifier behind the adapter traits.
pub struct FittedArtifacts {
    preprocessor: Box<dyn Preprocessor>,
    classifier: Box<dyn Classifier>,
}

impl FittedArtifacts {
    pub fn new(
        preprocessor: impl Preprocessor + 'static,
        classifier: impl Classifier + 'static,
    ) -> Self {
        Self {
            preprocessor: Box::new(preprocessor),
            classifier: Box::new(classifier),
        }
    }

    pub fn preprocessor(&self) -> &dyn Preprocessor {
        self.preprocessor.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

impl fmt::Debug for FittedArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FittedArtifacts").finish_non_exhaustive()
    }
}

/// Load both artifacts and check them against the student feature schema.
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<FittedArtifacts, ArtifactError> {
    load_artifacts_for(paths, &STUDENT_FEATURES)
}

pub fn load_artifacts_for(
    paths: &ArtifactPaths,
    schema: &FeatureSchema,
) -> Result<FittedArtifacts, ArtifactError> {
    let scaler = load_scaler(&paths.scaler)?;
    check_scaler(&scaler, schema)?;
    let classifier = load_classifier(&paths.model)?;
    if classifier.n_features() != schema.len() {
        return Err(ArtifactError::FeatureCount {
            kind: ArtifactKind::Classifier,
            expected: schema.len(),
            found: classifier.n_features(),
        });
    }
    tracing::info!(
        "Loaded classifier {} and scaler {}",
        paths.model.display(),
        paths.scaler.display()
    );
    Ok(FittedArtifacts::new(scaler, classifier))
}

/// Process-wide handle, loaded on first use.
///
/// Later calls return the same artifacts regardless of `paths`.
pub fn shared(paths: &ArtifactPaths) -> Result<Arc<FittedArtifacts>, ArtifactError> {
    if let Some(existing) = SHARED.get() {
        return Ok(Arc::clone(existing));
    }
    let loaded = Arc::new(load_artifacts(paths)?);
    Ok(Arc::clone(SHARED.get_or_init(|| loaded)))
}

fn load_scaler(path: &Path) -> Result<StandardScalerModel, ArtifactError> {
    ensure_exists(ArtifactKind::Scaler, path)?;
    StandardScalerModel::load_json(path).map_err(|message| ArtifactError::Invalid {
        kind: ArtifactKind::Scaler,
        path: path.to_path_buf(),
        message,
    })
}

fn load_classifier(path: &Path) -> Result<ClassifierModel, ArtifactError> {
    ensure_exists(ArtifactKind::Classifier, path)?;
    ClassifierModel::load_json(path).map_err(|message| ArtifactError::Invalid {
        kind: ArtifactKind::Classifier,
        path: path.to_path_buf(),
        message,
    })
}

fn ensure_exists(kind: ArtifactKind, path: &Path) -> Result<(), ArtifactError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ArtifactError::Missing {
            kind,
            path: path.to_path_buf(),
        })
    }
}

fn check_scaler(scaler: &StandardScalerModel, schema: &FeatureSchema) -> Result<(), ArtifactError> {
    if scaler.n_features() != schema.len() {
        return Err(ArtifactError::FeatureCount {
            kind: ArtifactKind::Scaler,
            expected: schema.len(),
            found: scaler.n_features(),
        });
    }
    let Some(names) = &scaler.feature_names else {
        return Ok(());
    };
    for (position, (found, expected)) in names.iter().zip(schema.columns()).enumerate() {
        if found != expected {
            return Err(ArtifactError::FeatureOrder {
                position,
                expected: (*expected).to_string(),
                found: found.clone(),
            });
        }
    }
    Ok(())
}
