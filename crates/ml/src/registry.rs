//! The registry owning every named model instance.
//!
//! Lock discipline: the outer `RwLock` guards the name → model map and is
//! held only long enough to clone an `Arc` out; each model then has its own
//! `Mutex`, so training calls on the same name serialize while different
//! names train concurrently.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::error::ModelError;
use crate::model::{Model, ModelKind, ModelParams};

/// Summary of one registered model, as reported by `list`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub kind: ModelKind,
    pub version: String,
    pub trained: bool,
    pub accuracy: Option<f64>,
}

impl ModelInfo {
    fn from_model(model: &Model) -> Self {
        Self {
            name: model.name.clone(),
            kind: model.kind,
            version: model.version.clone(),
            trained: model.trained,
            accuracy: model.accuracy,
        }
    }
}

/// Result of a successful training call.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub model_name: String,
    pub accuracy: f64,
    pub parameters: ModelParams,
}

/// Result of a successful prediction call.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub model_name: String,
    pub model_kind: ModelKind,
    pub predictions: Vec<f64>,
    /// Thresholded 0/1 outputs, present for classifiers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_predictions: Option<Vec<i64>>,
    pub num_samples: usize,
}

/// Named model store; the sole writer of model parameters.
#[derive(Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<Mutex<Model>>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new untrained model. Rejects duplicate names and
    /// unsupported kind tags.
    pub async fn create(&self, name: &str, kind: &str) -> Result<ModelInfo, ModelError> {
        let kind: ModelKind = kind.parse()?;
        let mut models = self.models.write().await;
        if models.contains_key(name) {
            return Err(ModelError::AlreadyExists(name.to_string()));
        }
        let model = Model::new(name, kind);
        let info = ModelInfo::from_model(&model);
        models.insert(name.to_string(), Arc::new(Mutex::new(model)));
        tracing::info!(model = name, kind = kind.as_str(), "Created model");
        Ok(info)
    }

    /// Train a registered model; a failed attempt leaves it untouched.
    pub async fn train(
        &self,
        name: &str,
        x: &[Vec<f64>],
        y: &[f64],
    ) -> Result<TrainingReport, ModelError> {
        let entry = self.entry(name).await?;
        let mut model = entry.lock().await;
        let accuracy = model.train(x, y)?;
        tracing::info!(model = name, accuracy, "Trained model");
        Ok(TrainingReport {
            model_name: model.name.clone(),
            accuracy,
            parameters: model
                .params
                .clone()
                .ok_or_else(|| ModelError::Untrained(name.to_string()))?,
        })
    }

    /// Predict with a trained model.
    pub async fn predict(&self, name: &str, rows: &[Vec<f64>]) -> Result<Prediction, ModelError> {
        let entry = self.entry(name).await?;
        let model = entry.lock().await;
        let predictions = model.predict(rows)?;
        let binary_predictions = match model.kind {
            ModelKind::BinaryClassifier => Some(model.predict_binary(rows)?),
            ModelKind::LinearRegression => None,
        };
        tracing::debug!(
            model = name,
            samples = rows.len(),
            "Produced predictions",
        );
        Ok(Prediction {
            model_name: model.name.clone(),
            model_kind: model.kind,
            predictions,
            binary_predictions,
            num_samples: rows.len(),
        })
    }

    /// Summaries of all registered models.
    pub async fn list(&self) -> Vec<ModelInfo> {
        let models = self.models.read().await;
        let mut infos = Vec::with_capacity(models.len());
        for entry in models.values() {
            let model = entry.lock().await;
            infos.push(ModelInfo::from_model(&model));
        }
        infos
    }

    /// Serialize a model's full state to a JSON blob at `path`.
    pub async fn save(&self, name: &str, path: &Path) -> Result<(), ModelError> {
        let entry = self.entry(name).await?;
        let blob = {
            let model = entry.lock().await;
            serde_json::to_vec_pretty(&*model)?
        };
        tokio::fs::write(path, blob).await?;
        tracing::info!(model = name, path = %path.display(), "Saved model");
        Ok(())
    }

    /// Restore a model from a blob written by [`save`](Self::save).
    ///
    /// Fully overwrites any in-memory model carrying the same name.
    pub async fn load(&self, path: &Path) -> Result<ModelInfo, ModelError> {
        let blob = tokio::fs::read(path).await?;
        let model: Model = serde_json::from_slice(&blob)?;
        let info = ModelInfo::from_model(&model);
        let mut models = self.models.write().await;
        models.insert(model.name.clone(), Arc::new(Mutex::new(model)));
        tracing::info!(model = %info.name, path = %path.display(), "Loaded model");
        Ok(info)
    }

    async fn entry(&self, name: &str) -> Result<Arc<Mutex<Model>>, ModelError> {
        let models = self.models.read().await;
        models
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::NotFound(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn create_rejects_duplicates_and_unknown_kinds() {
        let registry = ModelRegistry::new();
        registry.create("m", "linear_regression").await.unwrap();
        assert_matches!(
            registry.create("m", "linear_regression").await,
            Err(ModelError::AlreadyExists(_))
        );
        assert_matches!(
            registry.create("other", "perceptron").await,
            Err(ModelError::UnsupportedKind(_))
        );
    }

    #[tokio::test]
    async fn train_and_predict_round_trip() {
        let registry = ModelRegistry::new();
        registry.create("line", "linear_regression").await.unwrap();

        let x = vec![vec![1.0], vec![2.0], vec![3.0]];
        let report = registry.train("line", &x, &[3.0, 5.0, 7.0]).await.unwrap();
        assert!((report.accuracy - 1.0).abs() < 1e-9);

        let prediction = registry.predict("line", &[vec![10.0]]).await.unwrap();
        assert!((prediction.predictions[0] - 21.0).abs() < 1e-6);
        assert!(prediction.binary_predictions.is_none());
        assert_eq!(prediction.num_samples, 1);
    }

    #[tokio::test]
    async fn classifier_prediction_includes_binary_outputs() {
        let registry = ModelRegistry::new();
        registry.create("clf", "binary_classifier").await.unwrap();
        let x = vec![vec![0.0], vec![0.5], vec![4.0], vec![4.5]];
        registry
            .train("clf", &x, &[0.0, 0.0, 1.0, 1.0])
            .await
            .unwrap();

        let prediction = registry.predict("clf", &x).await.unwrap();
        let binary = prediction.binary_predictions.unwrap();
        assert_eq!(binary.len(), x.len());
        assert!(binary.iter().all(|p| *p == 0 || *p == 1));
    }

    #[tokio::test]
    async fn unknown_names_are_not_found() {
        let registry = ModelRegistry::new();
        assert_matches!(
            registry.train("ghost", &[vec![1.0]], &[1.0]).await,
            Err(ModelError::NotFound(_))
        );
        assert_matches!(
            registry.predict("ghost", &[vec![1.0]]).await,
            Err(ModelError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn untrained_predict_fails_regardless_of_input_shape() {
        let registry = ModelRegistry::new();
        registry.create("fresh", "binary_classifier").await.unwrap();
        assert_matches!(
            registry.predict("fresh", &[vec![1.0, 2.0, 3.0]]).await,
            Err(ModelError::Untrained(_))
        );
        assert_matches!(
            registry.predict("fresh", &[]).await,
            Err(ModelError::Untrained(_))
        );
    }

    #[tokio::test]
    async fn list_reports_training_state() {
        let registry = ModelRegistry::new();
        registry.create("a", "linear_regression").await.unwrap();
        registry.create("b", "binary_classifier").await.unwrap();
        registry
            .train("a", &[vec![1.0], vec![2.0]], &[2.0, 4.0])
            .await
            .unwrap();

        let mut infos = registry.list().await;
        infos.sort_by(|l, r| l.name.cmp(&r.name));
        assert_eq!(infos.len(), 2);
        assert!(infos[0].trained);
        assert!(!infos[1].trained);
    }

    #[tokio::test]
    async fn save_and_load_overwrite_in_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("line.json");

        let registry = ModelRegistry::new();
        registry.create("line", "linear_regression").await.unwrap();
        registry
            .train("line", &[vec![1.0], vec![2.0], vec![3.0]], &[3.0, 5.0, 7.0])
            .await
            .unwrap();
        registry.save("line", &path).await.unwrap();

        // A second registry starts cold and restores the trained state.
        let restored = ModelRegistry::new();
        let info = restored.load(&path).await.unwrap();
        assert_eq!(info.name, "line");
        assert!(info.trained);

        let prediction = restored.predict("line", &[vec![4.0]]).await.unwrap();
        assert!((prediction.predictions[0] - 9.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn distinct_models_train_concurrently() {
        let registry = Arc::new(ModelRegistry::new());
        registry.create("left", "linear_regression").await.unwrap();
        registry.create("right", "linear_regression").await.unwrap();

        let a = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .train("left", &[vec![1.0], vec![2.0]], &[1.0, 2.0])
                    .await
            })
        };
        let b = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .train("right", &[vec![1.0], vec![2.0]], &[2.0, 4.0])
                    .await
            })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
        assert_eq!(registry.list().await.len(), 2);
    }
}
