//! Statistical analysis over a `data_points` sequence.

use serde_json::{json, Value};

use quern_core::stats;

use crate::dispatch::HandlerError;

pub fn run(input: &Value) -> Result<Value, HandlerError> {
    let points = input
        .get("data_points")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if points.is_empty() {
        return Err(HandlerError::Invalid("No data points provided".to_string()));
    }

    let numeric = stats::numeric_values(&points);
    if numeric.is_empty() {
        return Err(HandlerError::Invalid("No numeric data found".to_string()));
    }

    let summary = stats::summarize(&numeric)?;
    let payload =
        serde_json::to_value(summary).map_err(|e| HandlerError::Internal(e.to_string()))?;
    Ok(json!({ "analysis": payload }))
}
