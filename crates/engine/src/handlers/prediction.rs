//! ML prediction handler: delegates to the model registry.

use std::time::Duration;

use serde_json::Value;

use quern_ml::{ModelKind, ModelRegistry};

use crate::dispatch::HandlerError;

/// Fixed delay standing in for real inference latency.
const SIMULATED_INFERENCE_DELAY: Duration = Duration::from_millis(500);

/// Model type assumed when the input names none.
const DEFAULT_MODEL_TYPE: &str = "linear_regression";

pub async fn run(input: &Value, registry: &ModelRegistry) -> Result<Value, HandlerError> {
    let model_type = input
        .get("model_type")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_MODEL_TYPE);
    // The tag must name a supported family even when an explicit model
    // name is given.
    model_type
        .parse::<ModelKind>()
        .map_err(|_| HandlerError::Invalid(format!("Unknown model type: {model_type}")))?;

    // Jobs may target a specific registered model; by default they use
    // the model registered under the family name itself.
    let model_name = input
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or(model_type);

    let rows = feature_rows(input)?;

    tokio::time::sleep(SIMULATED_INFERENCE_DELAY).await;

    let prediction = registry.predict(model_name, &rows).await?;
    serde_json::to_value(prediction).map_err(|e| HandlerError::Internal(e.to_string()))
}

/// Parse `features` into rows: a flat numeric array becomes single-feature
/// rows, an array of arrays is taken row by row.
fn feature_rows(input: &Value) -> Result<Vec<Vec<f64>>, HandlerError> {
    let features = input
        .get("features")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| {
            HandlerError::Invalid("Input data must include 'features'".to_string())
        })?;

    features
        .iter()
        .map(|item| match item {
            Value::Array(row) => row
                .iter()
                .map(|x| {
                    x.as_f64().ok_or_else(|| {
                        HandlerError::Invalid("Features must be numeric".to_string())
                    })
                })
                .collect(),
            scalar => scalar
                .as_f64()
                .map(|x| vec![x])
                .ok_or_else(|| HandlerError::Invalid("Features must be numeric".to_string())),
        })
        .collect()
}
