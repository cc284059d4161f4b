//! Fitted models consumed by the inference pipeline.
//!
//! Models are trained elsewhere and shipped as versioned JSON. This module only
//! loads, validates and evaluates them; nothing here mutates a loaded model.

pub mod gbdt_stump;
pub mod logreg;
pub mod scaler;
pub mod scores;

use std::path::Path;

use serde::{Deserialize, Serialize};

use gbdt_stump::GbdtStumpModel;
use logreg::LogRegModel;

/// Any supported fitted classifier, tagged by `kind` in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    LogReg(LogRegModel),
    GbdtStump(GbdtStumpModel),
}

impl ClassifierModel {
    /// Load and validate a classifier from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
        let model: Self = serde_json::from_slice(&bytes).map_err(|err| err.to_string())?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::LogReg(model) => model.validate(),
            Self::GbdtStump(model) => model.validate(),
        }
    }

    /// Number of input features expected per row.
    pub fn n_features(&self) -> usize {
        match self {
            Self::LogReg(model) => model.n_features,
            Self::GbdtStump(model) => model.n_features,
        }
    }

    /// Raw class codes the model can emit.
    pub fn class_codes(&self) -> Vec<i64> {
        match self {
            Self::LogReg(model) => model.class_codes.clone(),
            Self::GbdtStump(model) => model.class_codes(),
        }
    }

    /// Predict the raw class code for one scaled feature row.
    ///
    /// Returns `None` when the row width does not match the model.
    pub fn predict_class_code(&self, features: &[f64]) -> Option<i64> {
        match self {
            Self::LogReg(model) => model.predict_class_code(features),
            Self::GbdtStump(model) => model.predict_class_code(features),
        }
    }
}
