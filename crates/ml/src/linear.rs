//! Closed-form ordinary-least-squares fit for a single feature.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Predicted value substituted for a row whose feature count the model
/// cannot handle; the prediction call still succeeds overall.
pub const FALLBACK_PREDICTION: f64 = 0.0;

/// Fitted parameters of a single-feature linear regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub n_samples: usize,
}

/// Fit `y = slope * x + intercept` by ordinary least squares.
///
/// Only single-feature rows are supported. Returns the fitted parameters
/// and the R² score (`1 − SS_res/SS_tot`, defined as 0 when `SS_tot` is 0).
pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<(LinearParams, f64), ModelError> {
    if x.is_empty() || y.is_empty() || x.len() != y.len() {
        return Err(ModelError::InvalidTraining(
            "features and labels must be non-empty and the same length".to_string(),
        ));
    }
    if x.iter().any(|row| row.len() != 1) {
        return Err(ModelError::InvalidTraining(
            "multi-feature regression is not implemented".to_string(),
        ));
    }

    let n = x.len() as f64;
    let xs: Vec<f64> = x.iter().map(|row| row[0]).collect();

    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = xs.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = xs.iter().map(|a| a * a).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return Err(ModelError::InvalidTraining(
            "all feature values are identical".to_string(),
        ));
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    let y_mean = sum_y / n;
    let ss_res: f64 = xs
        .iter()
        .zip(y)
        .map(|(a, b)| {
            let predicted = slope * a + intercept;
            (b - predicted) * (b - predicted)
        })
        .sum();
    let ss_tot: f64 = y.iter().map(|b| (b - y_mean) * (b - y_mean)).sum();
    let r_squared = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

    let params = LinearParams {
        weights: vec![slope],
        bias: intercept,
        n_samples: x.len(),
    };
    Ok((params, r_squared))
}

/// Predict one value per input row.
///
/// Rows with an unsupported feature count yield [`FALLBACK_PREDICTION`]
/// instead of failing the whole call.
pub fn predict(params: &LinearParams, rows: &[Vec<f64>]) -> Vec<f64> {
    rows.iter()
        .map(|row| {
            if row.len() == 1 {
                params.weights[0] * row[0] + params.bias
            } else {
                FALLBACK_PREDICTION
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn recovers_exact_line() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![3.0, 5.0, 7.0];
        let (params, r2) = fit(&x, &y).unwrap();
        assert!((params.weights[0] - 2.0).abs() < 1e-9);
        assert!((params.bias - 1.0).abs() < 1e-9);
        assert!((r2 - 1.0).abs() < 1e-9);
        assert_eq!(params.n_samples, 3);
    }

    #[test]
    fn r_squared_is_zero_for_constant_labels() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![4.0, 4.0, 4.0];
        let (_, r2) = fit(&x, &y).unwrap();
        assert_eq!(r2, 0.0);
    }

    #[test]
    fn rejects_multi_feature_rows() {
        let x = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let y = vec![1.0, 2.0];
        assert_matches!(fit(&x, &y), Err(ModelError::InvalidTraining(_)));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![1.0];
        assert_matches!(fit(&x, &y), Err(ModelError::InvalidTraining(_)));
        assert_matches!(fit(&[], &[]), Err(ModelError::InvalidTraining(_)));
    }

    #[test]
    fn rejects_degenerate_identical_features() {
        let x = vec![vec![5.0], vec![5.0], vec![5.0]];
        let y = vec![1.0, 2.0, 3.0];
        assert_matches!(fit(&x, &y), Err(ModelError::InvalidTraining(_)));
    }

    #[test]
    fn predict_substitutes_fallback_for_bad_rows() {
        let params = LinearParams {
            weights: vec![2.0],
            bias: 1.0,
            n_samples: 3,
        };
        let predictions = predict(&params, &[vec![4.0], vec![1.0, 2.0], vec![]]);
        assert_eq!(predictions, vec![9.0, FALLBACK_PREDICTION, FALLBACK_PREDICTION]);
    }
}
