//! Multinomial logistic regression over scaled student features.

use serde::{Deserialize, Serialize};

use crate::ml::scores::{best_code, softmax};

/// Versioned logistic regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRegModel {
    #[serde(default)]
    pub model_id: Option<String>,
    pub model_version: i64,
    pub n_features: usize,
    /// Raw code emitted for each output index.
    pub class_codes: Vec<i64>,
    /// Row-major `[class][feature]`.
    pub weights: Vec<f64>,
    pub bias: Vec<f64>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_temperature() -> f64 {
    1.0
}

impl LogRegModel {
    /// Validate the model dimensions.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("n_features must be > 0".to_string());
        }
        let classes = self.class_codes.len();
        if classes == 0 {
            return Err("No classes defined".to_string());
        }
        if self.weights.len() != classes * self.n_features {
            return Err(format!(
                "weights length mismatch: {} (expected {})",
                self.weights.len(),
                classes * self.n_features
            ));
        }
        if self.bias.len() != classes {
            return Err("bias length mismatch".to_string());
        }
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err("temperature must be > 0".to_string());
        }
        Ok(())
    }

    fn logits(&self, features: &[f64]) -> Vec<f64> {
        let temp = self.temperature.max(1e-6);
        self.weights
            .chunks_exact(self.n_features)
            .zip(&self.bias)
            .map(|(row, bias)| {
                let sum: f64 = row.iter().zip(features).map(|(w, x)| w * x).sum();
                (sum + bias) / temp
            })
            .collect()
    }

    /// Compute class probabilities for a single feature row.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        if features.len() != self.n_features || self.class_codes.is_empty() {
            return Vec::new();
        }
        softmax(&self.logits(features))
    }

    /// Class code with the highest logit, or `None` for a row of the wrong width.
    pub fn predict_class_code(&self, features: &[f64]) -> Option<i64> {
        if features.len() != self.n_features {
            return None;
        }
        best_code(&self.logits(features), &self.class_codes)
    }
}
