use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::{FeatureRecord, FeatureValue, FEATURE_SCHEMA};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model artifact: {0}")]
    Artifact(String),

    #[error("feature schema mismatch at column {position}: model expects {expected:?}, got {actual:?}")]
    SchemaMismatch {
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("column {0} is text but the model weights it as numeric")]
    NonNumeric(String),

    #[error("model produced a non-finite score")]
    NonFinite,
}

/// Binary phishing classifier over the fixed feature schema. Implementations
/// are shared read-only across requests.
pub trait Classifier: Send + Sync {
    /// Probability of the phishing class.
    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64, ModelError>;

    /// Hard label, 1 for phishing.
    fn predict(&self, record: &FeatureRecord) -> Result<u8, ModelError> {
        Ok((self.predict_proba(record)? >= 0.5) as u8)
    }

    fn version(&self) -> &str {
        "unversioned"
    }
}

/// Logistic-regression weights exported by the training pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentModel {
    pub version: String,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub columns: Vec<String>,
    #[serde(default)]
    pub numeric_weights: HashMap<String, f64>,
    #[serde(default)]
    pub categorical_weights: HashMap<String, HashMap<String, f64>>,
}

fn default_threshold() -> f64 {
    0.5
}

impl StudentModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let model = Self::from_json(&content)?;
        info!(
            "Loaded student model from {}: version {}, {} columns",
            path.display(),
            model.version,
            model.columns.len()
        );
        Ok(model)
    }

    pub fn from_json(content: &str) -> Result<Self, ModelError> {
        let model: StudentModel =
            serde_json::from_str(content).map_err(|e| ModelError::Artifact(e.to_string()))?;
        model.validate()?;
        if !model.matches_builtin_schema() {
            warn!(
                "Model {} declares a column layout different from the extractor; every request will fail",
                model.version
            );
        }
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.columns.is_empty() {
            return Err(ModelError::Artifact("no input columns declared".into()));
        }
        if !self.intercept.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ModelError::Artifact("intercept or threshold out of range".into()));
        }
        if let Some(col) = self
            .numeric_weights
            .keys()
            .chain(self.categorical_weights.keys())
            .find(|col| !self.columns.contains(col))
        {
            return Err(ModelError::Artifact(format!("weight for undeclared column {col:?}")));
        }
        Ok(())
    }

    pub fn matches_builtin_schema(&self) -> bool {
        self.columns.len() == FEATURE_SCHEMA.len()
            && self.columns.iter().zip(FEATURE_SCHEMA.iter()).all(|(a, b)| a == b.name)
    }

    fn check_schema(&self, record: &FeatureRecord) -> Result<(), ModelError> {
        let mut actual = record.column_names();
        for (position, expected) in self.columns.iter().enumerate() {
            match actual.next() {
                Some(name) if name == expected => {}
                other => {
                    return Err(ModelError::SchemaMismatch {
                        position,
                        expected: expected.clone(),
                        actual: other.unwrap_or("<missing>").to_string(),
                    })
                }
            }
        }
        if let Some(extra) = actual.next() {
            return Err(ModelError::SchemaMismatch {
                position: self.columns.len(),
                expected: "<end>".into(),
                actual: extra.to_string(),
            });
        }
        Ok(())
    }

    fn contribution(&self, column: &str, value: &FeatureValue) -> Result<f64, ModelError> {
        match value {
            FeatureValue::Text(category) => {
                if self.numeric_weights.contains_key(column) {
                    return Err(ModelError::NonNumeric(column.to_string()));
                }
                Ok(self
                    .categorical_weights
                    .get(column)
                    .and_then(|levels| levels.get(category))
                    .copied()
                    .unwrap_or(0.0))
            }
            numeric => {
                let weight = self.numeric_weights.get(column).copied().unwrap_or(0.0);
                Ok(weight * numeric.as_f64().unwrap_or(0.0))
            }
        }
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }
}

impl Classifier for StudentModel {
    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64, ModelError> {
        self.check_schema(record)?;

        let mut z = self.intercept;
        for (column, value) in record.iter() {
            z += self.contribution(column, value)?;
        }

        let probability = Self::sigmoid(z);
        if !probability.is_finite() {
            return Err(ModelError::NonFinite);
        }
        debug!("Student model logit {:.4} -> {:.4}", z, probability);
        Ok(probability)
    }

    fn predict(&self, record: &FeatureRecord) -> Result<u8, ModelError> {
        Ok((self.predict_proba(record)? >= self.threshold) as u8)
    }

    fn version(&self) -> &str {
        &self.version
    }
}
