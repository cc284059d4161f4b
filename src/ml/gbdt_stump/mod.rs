//! Gradient-boosted decision stumps.
//!
//! Each class code owns an additive ensemble of stumps. A row is scored by
//! every ensemble and the code with the highest score wins.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ml::scores::best_code;

/// Single split on one scaled feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stump {
    pub feature_index: usize,
    pub threshold: f64,
    /// Contribution when `feature <= threshold`.
    pub left_value: f64,
    pub right_value: f64,
}

impl Stump {
    fn contribution(&self, features: &[f64]) -> f64 {
        match features.get(self.feature_index) {
            Some(&value) if value > self.threshold => self.right_value,
            _ => self.left_value,
        }
    }
}

/// Boosted ensemble voting for one class code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEnsemble {
    pub code: i64,
    #[serde(default)]
    pub base_score: f64,
    pub stumps: Vec<Stump>,
}

impl ClassEnsemble {
    pub fn score(&self, features: &[f64], learning_rate: f64) -> f64 {
        self.stumps
            .iter()
            .fold(self.base_score, |acc, stump| {
                acc + learning_rate * stump.contribution(features)
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtStumpModel {
    pub model_version: i64,
    pub n_features: usize,
    pub learning_rate: f64,
    pub classes: Vec<ClassEnsemble>,
}

impl GbdtStumpModel {
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.len() < 2 {
            return Err("Model must contain at least 2 classes".to_string());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err("learning_rate must be > 0".to_string());
        }
        let mut seen = HashSet::with_capacity(self.classes.len());
        for class in &self.classes {
            if !seen.insert(class.code) {
                return Err(format!("Class code {} appears twice", class.code));
            }
            if let Some(stump) = class
                .stumps
                .iter()
                .find(|stump| stump.feature_index >= self.n_features)
            {
                return Err(format!(
                    "Class {} splits on feature {} but the model has {} features",
                    class.code, stump.feature_index, self.n_features
                ));
            }
        }
        Ok(())
    }

    pub fn class_codes(&self) -> Vec<i64> {
        self.classes.iter().map(|class| class.code).collect()
    }

    /// One score per class, in `classes` order.
    pub fn scores(&self, features: &[f64]) -> Vec<f64> {
        self.classes
            .iter()
            .map(|class| class.score(features, self.learning_rate))
            .collect()
    }

    /// Winning class code, or `None` for a row of the wrong width.
    pub fn predict_class_code(&self, features: &[f64]) -> Option<i64> {
        if features.len() != self.n_features {
            return None;
        }
        best_code(&self.scores(features), &self.class_codes())
    }
}
