//! Payload transforms: min-max normalization, structure flattening, and
//! grouped aggregation.
//!
//! These are the pure halves of the `transform` job type; the engine layer
//! is responsible for pulling the right fields out of the job input.

use serde_json::{Map, Number, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Normalize
// ---------------------------------------------------------------------------

/// Midpoint value used when every input is identical and the min-max
/// range collapses to zero.
const DEGENERATE_MIDPOINT: f64 = 0.5;

/// Result of min-max scaling a numeric sequence into `[0, 1]`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Normalized {
    pub original_data: Vec<f64>,
    pub normalized_data: Vec<f64>,
    pub min_value: f64,
    pub max_value: f64,
    pub range: f64,
}

/// Min-max scale `values` into `[0, 1]`.
///
/// The element at the original minimum maps to 0 and the maximum to 1.
/// When every value is identical the range is zero and each output is
/// exactly 0.5.
pub fn normalize(values: &[f64]) -> Result<Normalized, CoreError> {
    if values.is_empty() {
        return Err(CoreError::Validation(
            "No numeric data to normalize".to_string(),
        ));
    }

    let min_value = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max_value - min_value;

    let normalized_data = if range == 0.0 {
        vec![DEGENERATE_MIDPOINT; values.len()]
    } else {
        values.iter().map(|x| (x - min_value) / range).collect()
    };

    Ok(Normalized {
        original_data: values.to_vec(),
        normalized_data,
        min_value,
        max_value,
        range,
    })
}

// ---------------------------------------------------------------------------
// Flatten
// ---------------------------------------------------------------------------

/// Collapse a nested JSON value into a single-level object.
///
/// - Objects flatten recursively; nested keys are joined with `_`.
/// - Array elements become `item_{index}`, or `item_{index}_{key}` for
///   object elements.
/// - Any other value becomes `{"value": v}`.
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    match value {
        Value::Object(fields) => flatten_object(fields, "", &mut out),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Object(fields) => {
                        for (key, v) in fields {
                            out.insert(format!("item_{i}_{key}"), v.clone());
                        }
                    }
                    other => {
                        out.insert(format!("item_{i}"), other.clone());
                    }
                }
            }
        }
        other => {
            out.insert("value".to_string(), other.clone());
        }
    }
    out
}

fn flatten_object(fields: &Map<String, Value>, prefix: &str, out: &mut Map<String, Value>) {
    for (key, value) in fields {
        let flat_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}_{key}")
        };
        match value {
            Value::Object(nested) => flatten_object(nested, &flat_key, out),
            other => {
                out.insert(flat_key, other.clone());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Group key used when a record carries no `category` field.
const DEFAULT_CATEGORY: &str = "default";

/// Group records by their `category` field and aggregate every numeric
/// field within each group.
///
/// Records without a `category` fall into the `"default"` group; a
/// non-string category is grouped under its JSON rendering. Non-object
/// records are skipped. Each numeric field produces `{field}_sum`,
/// `{field}_avg`, and `{field}_count` entries in its group.
pub fn aggregate(records: &[Value]) -> Result<Map<String, Value>, CoreError> {
    if records.is_empty() {
        return Err(CoreError::Validation(
            "Invalid data for aggregation".to_string(),
        ));
    }

    // category -> field -> collected values, in first-seen order
    let mut collected: Vec<(String, Vec<(String, Vec<f64>)>)> = Vec::new();

    for record in records {
        let Value::Object(fields) = record else {
            continue;
        };
        let category = match fields.get("category") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => DEFAULT_CATEGORY.to_string(),
        };

        let slot = match collected.iter().position(|(name, _)| *name == category) {
            Some(i) => i,
            None => {
                collected.push((category, Vec::new()));
                collected.len() - 1
            }
        };
        let group = &mut collected[slot].1;

        for (key, value) in fields {
            if let Some(x) = value.as_f64() {
                match group.iter_mut().find(|(field, _)| field == key) {
                    Some((_, values)) => values.push(x),
                    None => group.push((key.clone(), vec![x])),
                }
            }
        }
    }

    let mut groups = Map::new();
    for (category, fields) in collected {
        let mut group_stats = Map::new();
        for (field, values) in fields {
            let sum: f64 = values.iter().sum();
            group_stats.insert(format!("{field}_sum"), number(sum));
            group_stats.insert(format!("{field}_avg"), number(sum / values.len() as f64));
            group_stats.insert(format!("{field}_count"), Value::from(values.len()));
        }
        groups.insert(category, Value::Object(group_stats));
    }

    Ok(groups)
}

/// Lossy f64 -> JSON number conversion; non-finite values become null.
fn number(x: f64) -> Value {
    Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- normalize ------------------------------------------------------------

    #[test]
    fn normalize_maps_extremes_to_unit_interval() {
        let n = normalize(&[10.0, 20.0, 15.0]).unwrap();
        assert_eq!(n.normalized_data[0], 0.0);
        assert_eq!(n.normalized_data[1], 1.0);
        assert!(n.normalized_data.iter().all(|&x| (0.0..=1.0).contains(&x)));
        assert_eq!(n.min_value, 10.0);
        assert_eq!(n.max_value, 20.0);
        assert_eq!(n.range, 10.0);
    }

    #[test]
    fn normalize_constant_input_yields_midpoints() {
        let n = normalize(&[4.0, 4.0, 4.0, 4.0]).unwrap();
        assert_eq!(n.normalized_data, vec![0.5, 0.5, 0.5, 0.5]);
        assert_eq!(n.range, 0.0);
    }

    #[test]
    fn normalize_empty_input_is_rejected() {
        assert!(normalize(&[]).is_err());
    }

    // -- flatten --------------------------------------------------------------

    #[test]
    fn flatten_nested_object_joins_keys() {
        let value = json!({"a": {"b": {"c": 1}, "d": 2}, "e": 3});
        let flat = flatten(&value);
        assert_eq!(flat.get("a_b_c"), Some(&json!(1)));
        assert_eq!(flat.get("a_d"), Some(&json!(2)));
        assert_eq!(flat.get("e"), Some(&json!(3)));
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn flatten_array_uses_item_keys() {
        let value = json!([7, {"name": "x", "size": 2}, "tail"]);
        let flat = flatten(&value);
        assert_eq!(flat.get("item_0"), Some(&json!(7)));
        assert_eq!(flat.get("item_1_name"), Some(&json!("x")));
        assert_eq!(flat.get("item_1_size"), Some(&json!(2)));
        assert_eq!(flat.get("item_2"), Some(&json!("tail")));
    }

    #[test]
    fn flatten_scalar_becomes_value_entry() {
        let flat = flatten(&json!(42));
        assert_eq!(flat.get("value"), Some(&json!(42)));
        assert_eq!(flat.len(), 1);
    }

    // -- aggregate ------------------------------------------------------------

    #[test]
    fn aggregate_groups_by_category_with_default() {
        let records = vec![
            json!({"category": "a", "amount": 10.0}),
            json!({"category": "a", "amount": 30.0}),
            json!({"amount": 5.0}),
        ];
        let groups = aggregate(&records).unwrap();

        let a = groups.get("a").unwrap();
        assert_eq!(a.get("amount_sum"), Some(&json!(40.0)));
        assert_eq!(a.get("amount_avg"), Some(&json!(20.0)));
        assert_eq!(a.get("amount_count"), Some(&json!(2)));

        let default = groups.get("default").unwrap();
        assert_eq!(default.get("amount_count"), Some(&json!(1)));
    }

    #[test]
    fn aggregate_field_counts_sum_to_total_presence() {
        let records = vec![
            json!({"category": "x", "v": 1.0, "w": 2.0}),
            json!({"category": "y", "v": 3.0}),
            json!({"category": "x", "v": 4.0}),
            json!({"category": "y", "other": "text"}),
        ];
        let groups = aggregate(&records).unwrap();

        let total_v: u64 = groups
            .values()
            .filter_map(|g| g.get("v_count").and_then(Value::as_u64))
            .sum();
        assert_eq!(total_v, 3);

        let total_w: u64 = groups
            .values()
            .filter_map(|g| g.get("w_count").and_then(Value::as_u64))
            .sum();
        assert_eq!(total_w, 1);
    }

    #[test]
    fn aggregate_skips_non_object_records() {
        let records = vec![json!(1), json!({"category": "k", "n": 2.0}), json!("noise")];
        let groups = aggregate(&records).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups.get("k").unwrap().get("n_count"), Some(&json!(1)));
    }

    #[test]
    fn aggregate_empty_input_is_rejected() {
        assert!(aggregate(&[]).is_err());
    }
}
