//! Standardization transform fitted offline.

use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while applying the scaler to a batch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScalerError {
    #[error("scaler expects {expected} features, got {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("scaler produced a non-finite value at row {row}, column {column}")]
    NonFinite { row: usize, column: usize },
}

/// Per-feature `(x - mean) / scale` standardization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScalerModel {
    pub model_version: i64,
    /// Column order the scaler was fitted on, when recorded.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScalerModel {
    /// Scaler that leaves `n_features` columns unchanged.
    pub fn identity(n_features: usize) -> Self {
        Self {
            model_version: 1,
            feature_names: None,
            mean: vec![0.0; n_features],
            scale: vec![1.0; n_features],
        }
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.mean.is_empty() {
            return Err("Scaler has no features".to_string());
        }
        if self.scale.len() != self.mean.len() {
            return Err(format!(
                "scale length {} does not match mean length {}",
                self.scale.len(),
                self.mean.len()
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                return Err("feature_names length mismatch".to_string());
            }
        }
        if self.mean.iter().any(|value| !value.is_finite()) {
            return Err("mean must be finite".to_string());
        }
        Ok(())
    }

    /// Load and validate a scaler from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
        let model: Self = serde_json::from_slice(&bytes).map_err(|err| err.to_string())?;
        model.validate()?;
        Ok(model)
    }

    /// Standardize every row of `batch`.
    pub fn transform(&self, batch: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        if batch.ncols() != self.n_features() {
            return Err(ScalerError::ShapeMismatch {
                expected: self.n_features(),
                found: batch.ncols(),
            });
        }
        let mut out = batch.to_owned();
        for (row_idx, mut row) in out.rows_mut().into_iter().enumerate() {
            for (column, value) in row.iter_mut().enumerate() {
                *value = (*value - self.mean[column]) / effective_scale(self.scale[column]);
                if !value.is_finite() {
                    return Err(ScalerError::NonFinite {
                        row: row_idx,
                        column,
                    });
                }
            }
        }
        Ok(out)
    }
}

/// Constant features are fitted with a zero scale; treat those as unit scale.
fn effective_scale(scale: f64) -> f64 {
    if scale == 0.0 || !scale.is_finite() {
        1.0
    } else {
        scale
    }
}
