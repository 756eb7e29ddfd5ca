//! Normalize / flatten / aggregate transforms, selected by the input's
//! `type` field.

use serde_json::{json, Value};

use quern_core::stats::numeric_values;
use quern_core::transform;

use crate::dispatch::HandlerError;

/// Transform applied when the input names none.
const DEFAULT_TRANSFORM: &str = "normalize";

pub fn run(input: &Value) -> Result<Value, HandlerError> {
    let transform_type = input
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TRANSFORM);
    let data = input.get("data").cloned().unwrap_or(Value::Array(Vec::new()));

    match transform_type {
        "normalize" => normalize(&data),
        "flatten" => Ok(json!({ "flattened_data": transform::flatten(&data) })),
        "aggregate" => aggregate(&data),
        other => Err(HandlerError::Invalid(format!(
            "Unknown transformation type: {other}"
        ))),
    }
}

fn normalize(data: &Value) -> Result<Value, HandlerError> {
    let values = data
        .as_array()
        .map(|items| numeric_values(items))
        .unwrap_or_default();
    let normalized = transform::normalize(&values)?;
    serde_json::to_value(normalized).map_err(|e| HandlerError::Internal(e.to_string()))
}

fn aggregate(data: &Value) -> Result<Value, HandlerError> {
    let records = data
        .as_array()
        .ok_or_else(|| HandlerError::Invalid("Invalid data for aggregation".to_string()))?;
    let groups = transform::aggregate(records)?;
    Ok(json!({ "aggregated_data": groups }))
}
