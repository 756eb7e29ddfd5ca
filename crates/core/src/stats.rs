//! Descriptive statistics over heterogeneous payload values.
//!
//! Analysis jobs receive arbitrary JSON sequences; non-numeric entries are
//! filtered out before summarizing. Variance is the population variance
//! (divisor = count, not count − 1).

use serde_json::Value;

use crate::error::CoreError;

/// How many values fall strictly below, strictly above, and exactly at
/// the mean.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SpreadCounts {
    pub below_average: usize,
    pub above_average: usize,
    pub at_average: usize,
}

/// Summary statistics for a numeric sequence.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Summary {
    pub count: usize,
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub variance: f64,
    pub std_deviation: f64,
    pub categories: SpreadCounts,
}

/// Extract the numeric entries of a JSON sequence, preserving order.
///
/// Booleans and numeric-looking strings are not numbers.
pub fn numeric_values(values: &[Value]) -> Vec<f64> {
    values.iter().filter_map(Value::as_f64).collect()
}

/// Summarize a non-empty numeric sequence.
pub fn summarize(values: &[f64]) -> Result<Summary, CoreError> {
    if values.is_empty() {
        return Err(CoreError::Validation("No numeric data found".to_string()));
    }

    let count = values.len();
    let sum: f64 = values.iter().sum();
    let average = sum / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let variance = values
        .iter()
        .map(|x| (x - average) * (x - average))
        .sum::<f64>()
        / count as f64;

    let categories = SpreadCounts {
        below_average: values.iter().filter(|&&x| x < average).count(),
        above_average: values.iter().filter(|&&x| x > average).count(),
        at_average: values.iter().filter(|&&x| x == average).count(),
    };

    Ok(Summary {
        count,
        sum,
        average,
        min,
        max,
        range: max - min,
        variance,
        std_deviation: variance.sqrt(),
        categories,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
