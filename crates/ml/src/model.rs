//! The model value type shared by every trainable family.

use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use quern_core::types::Timestamp;

use crate::error::ModelError;
use crate::linear::{self, LinearParams};
use crate::logistic::{self, LogisticParams};

/// Version stamped on newly created models.
pub const MODEL_VERSION: &str = "1.0";

/// Supported model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LinearRegression,
    BinaryClassifier,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinearRegression => "linear_regression",
            Self::BinaryClassifier => "binary_classifier",
        }
    }
}

impl FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear_regression" => Ok(Self::LinearRegression),
            "binary_classifier" => Ok(Self::BinaryClassifier),
            other => Err(ModelError::UnsupportedKind(other.to_string())),
        }
    }
}

/// Fitted numeric state, tagged by family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelParams {
    Linear(LinearParams),
    Logistic(LogisticParams),
}

/// A named trainable predictor.
///
/// Created untrained; a successful training call populates `params`,
/// `trained` and `accuracy` together. This struct is also the on-disk
/// persistence blob, serialized as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub kind: ModelKind,
    pub version: String,
    pub params: Option<ModelParams>,
    pub trained: bool,
    pub accuracy: Option<f64>,
    pub created_at: Timestamp,
}

impl Model {
    pub fn new(name: impl Into<String>, kind: ModelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            version: MODEL_VERSION.to_string(),
            params: None,
            trained: false,
            accuracy: None,
            created_at: Utc::now(),
        }
    }

    /// Train on `x`/`y` and atomically install the fitted state.
    ///
    /// Validation and fitting happen before any field is written, so a
    /// failed attempt leaves the model exactly as it was.
    pub fn train(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<f64, ModelError> {
        let (params, accuracy) = match self.kind {
            ModelKind::LinearRegression => {
                let (params, r_squared) = linear::fit(x, y)?;
                (ModelParams::Linear(params), r_squared)
            }
            ModelKind::BinaryClassifier => {
                let (params, accuracy) = logistic::fit(x, y)?;
                (ModelParams::Logistic(params), accuracy)
            }
        };

        self.params = Some(params);
        self.trained = true;
        self.accuracy = Some(accuracy);
        Ok(accuracy)
    }

    /// Predict one value per row; probabilities for classifiers.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        match self.trained_params()? {
            ModelParams::Linear(params) => Ok(linear::predict(params, rows)),
            ModelParams::Logistic(params) => logistic::predict_proba(params, rows),
        }
    }

    /// Hard 0/1 predictions; only meaningful for classifiers.
    pub fn predict_binary(&self, rows: &[Vec<f64>]) -> Result<Vec<i64>, ModelError> {
        match self.trained_params()? {
            ModelParams::Logistic(params) => logistic::predict_binary(params, rows),
            ModelParams::Linear(_) => Err(ModelError::UnsupportedKind(
                "binary predictions require a binary_classifier".to_string(),
            )),
        }
    }

    fn trained_params(&self) -> Result<&ModelParams, ModelError> {
        if !self.trained {
            return Err(ModelError::Untrained(self.name.clone()));
        }
        self.params
            .as_ref()
            .ok_or_else(|| ModelError::Untrained(self.name.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
