//! Logistic regression trained by batch gradient descent.
//!
//! The numeric guards follow the usual recipe: the logit is clamped before
//! exponentiation so `exp` cannot overflow, and predicted probabilities are
//! clipped away from exact 0/1 before the cross-entropy loss so `ln` never
//! sees zero.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Gradient step size.
pub const LEARNING_RATE: f64 = 0.01;

/// Fixed number of passes over the training set.
pub const EPOCHS: usize = 1000;

/// Probability cutoff for a positive classification.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Logit magnitude bound applied before exponentiation.
const LOGIT_CLAMP: f64 = 500.0;

/// Probabilities are clipped to `[PROB_EPSILON, 1 - PROB_EPSILON]`
/// before entering the loss.
const PROB_EPSILON: f64 = 1e-15;

/// Half-width of the uniform range used for initial weights.
const INIT_SCALE: f64 = 0.01;

/// Fitted parameters of a logistic binary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    pub weights: Vec<f64>,
    pub bias: f64,
    pub threshold: f64,
    pub learning_rate: f64,
    pub epochs: usize,
    pub final_loss: f64,
}

/// Numerically clamped sigmoid.
fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-LOGIT_CLAMP, LOGIT_CLAMP);
    1.0 / (1.0 + (-z).exp())
}

fn logit(params_weights: &[f64], bias: f64, row: &[f64]) -> f64 {
    bias + params_weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>()
}

/// Train on `x` (rows of features) against binary labels `y`.
///
/// Returns the fitted parameters and the training accuracy (fraction of
/// rows whose thresholded probability matches the label).
pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<(LogisticParams, f64), ModelError> {
    if x.is_empty() || y.is_empty() || x.len() != y.len() {
        return Err(ModelError::InvalidTraining(
            "features and labels must be non-empty and the same length".to_string(),
        ));
    }
    let n_features = x[0].len();
    if n_features == 0 {
        return Err(ModelError::InvalidTraining(
            "feature rows must not be empty".to_string(),
        ));
    }
    if let Some(row) = x.iter().find(|row| row.len() != n_features) {
        return Err(ModelError::DimensionMismatch {
            expected: n_features,
            got: row.len(),
        });
    }

    let n = x.len() as f64;
    let mut rng = rand::rng();
    let mut weights: Vec<f64> = (0..n_features)
        .map(|_| rng.random_range(-INIT_SCALE..INIT_SCALE))
        .collect();
    let mut bias: f64 = rng.random_range(-INIT_SCALE..INIT_SCALE);
    let mut loss = 0.0;

    for epoch in 0..EPOCHS {
        let probabilities: Vec<f64> = x
            .iter()
            .map(|row| sigmoid(logit(&weights, bias, row)))
            .collect();

        loss = -probabilities
            .iter()
            .zip(y)
            .map(|(p, label)| {
                let p = p.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON);
                label * p.ln() + (1.0 - label) * (1.0 - p).ln()
            })
            .sum::<f64>()
            / n;

        let mut weight_gradients = vec![0.0; n_features];
        let mut bias_gradient = 0.0;
        for (row, (p, label)) in x.iter().zip(probabilities.iter().zip(y)) {
            let residual = p - label;
            bias_gradient += residual;
            for (gradient, feature) in weight_gradients.iter_mut().zip(row) {
                *gradient += residual * feature;
            }
        }

        for (weight, gradient) in weights.iter_mut().zip(&weight_gradients) {
            *weight -= LEARNING_RATE * gradient / n;
        }
        bias -= LEARNING_RATE * bias_gradient / n;

        if epoch % 100 == 0 {
            tracing::trace!(epoch, loss, "gradient descent step");
        }
    }

    let params = LogisticParams {
        weights,
        bias,
        threshold: DECISION_THRESHOLD,
        learning_rate: LEARNING_RATE,
        epochs: EPOCHS,
        final_loss: loss,
    };

    let matches = x
        .iter()
        .zip(y)
        .filter(|&(row, &label)| {
            let predicted = if sigmoid(logit(&params.weights, params.bias, row)) > params.threshold
            {
                1.0
            } else {
                0.0
            };
            predicted == label
        })
        .count();
    let accuracy = matches as f64 / n;

    Ok((params, accuracy))
}

/// Probability of the positive class for each input row.
///
/// Every row must match the trained feature count.
pub fn predict_proba(params: &LogisticParams, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
    let expected = params.weights.len();
    if let Some(row) = rows.iter().find(|row| row.len() != expected) {
        return Err(ModelError::DimensionMismatch {
            expected,
            got: row.len(),
        });
    }
    Ok(rows
        .iter()
        .map(|row| sigmoid(logit(&params.weights, params.bias, row)))
        .collect())
}

/// Hard 0/1 classification at the trained threshold.
pub fn predict_binary(params: &LogisticParams, rows: &[Vec<f64>]) -> Result<Vec<i64>, ModelError> {
    Ok(predict_proba(params, rows)?
        .into_iter()
        .map(|p| i64::from(p > params.threshold))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn separable_clusters() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x = vec![
            vec![0.2],
            vec![0.5],
            vec![0.9],
            vec![1.1],
            vec![3.9],
            vec![4.2],
            vec![4.6],
            vec![5.0],
        ];
        let y = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn sigmoid_is_bounded_for_extreme_logits() {
        assert!(sigmoid(1e9) <= 1.0);
        assert!(sigmoid(1e9) > 0.99);
        assert!(sigmoid(-1e9) >= 0.0);
        assert!(sigmoid(-1e9) < 0.01);
    }

    #[test]
    fn converges_on_separable_clusters() {
        let (x, y) = separable_clusters();
        let (params, accuracy) = fit(&x, &y).unwrap();
        assert!(accuracy >= 0.9, "accuracy was {accuracy}");
        assert!(params.final_loss.is_finite());
        assert_eq!(params.epochs, EPOCHS);
    }

    #[test]
    fn binary_predictions_match_input_length_and_domain() {
        let (x, y) = separable_clusters();
        let (params, _) = fit(&x, &y).unwrap();
        let predictions = predict_binary(&params, &x).unwrap();
        assert_eq!(predictions.len(), x.len());
        assert!(predictions.iter().all(|p| *p == 0 || *p == 1));
    }

    #[test]
    fn probabilities_stay_in_unit_interval() {
        let (x, y) = separable_clusters();
        let (params, _) = fit(&x, &y).unwrap();
        let probabilities = predict_proba(&params, &[vec![-1000.0], vec![1000.0]]).unwrap();
        assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn rejects_mismatched_training_shapes() {
        assert_matches!(
            fit(&[vec![1.0]], &[1.0, 0.0]),
            Err(ModelError::InvalidTraining(_))
        );
        assert_matches!(
            fit(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 0.0]),
            Err(ModelError::DimensionMismatch { expected: 1, got: 2 })
        );
    }

    #[test]
    fn predict_rejects_wrong_feature_count() {
        let (x, y) = separable_clusters();
        let (params, _) = fit(&x, &y).unwrap();
        assert_matches!(
            predict_proba(&params, &[vec![1.0, 2.0]]),
            Err(ModelError::DimensionMismatch { expected: 1, got: 2 })
        );
    }
}
