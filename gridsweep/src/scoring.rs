// BSD 3-Clause License
//
// Copyright (c) 2025, BlackPortal ○
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this
//    list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived from
//    this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::collections::BTreeMap;

use ndarray::Array1;

use crate::errors::ScoreError;

/// Turns predictions and ground truth into a single score where higher is better.
///
/// Scorers must be shareable across worker threads.
pub trait Scorer: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<f64, ScoreError>;
}

fn check_inputs(predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<(), ScoreError> {
    if predictions.is_empty() || actuals.is_empty() {
        return Err(ScoreError::EmptyInput);
    }

    if predictions.len() != actuals.len() {
        return Err(ScoreError::DimensionMismatch {
            expected: predictions.len(),
            actual: actuals.len(),
        });
    }

    if predictions.iter().any(|&v| !v.is_finite()) || actuals.iter().any(|&v| !v.is_finite()) {
        return Err(ScoreError::InvalidNumericValue);
    }

    Ok(())
}

/// Fraction of predictions that exactly match the label.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl Scorer for Accuracy {
    fn name(&self) -> &str {
        "accuracy"
    }

    fn score(&self, predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<f64, ScoreError> {
        check_inputs(predictions, actuals)?;
        let correct =
            predictions.iter().zip(actuals.iter()).filter(|(&pred, &actual)| pred == actual).count();
        Ok(correct as f64 / actuals.len() as f64)
    }
}

/// Mean of per-class recall, so every class present in `actuals` weighs the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedAccuracy;

impl Scorer for BalancedAccuracy {
    fn name(&self) -> &str {
        "balanced_accuracy"
    }

    fn score(&self, predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<f64, ScoreError> {
        check_inputs(predictions, actuals)?;

        // keyed by bit pattern: labels are finite here, and f64 is not Ord
        let mut per_class: BTreeMap<u64, (usize, usize)> = BTreeMap::new();
        for (&pred, &actual) in predictions.iter().zip(actuals.iter()) {
            let entry = per_class.entry(actual.to_bits()).or_insert((0, 0));
            entry.1 += 1;
            if pred == actual {
                entry.0 += 1;
            }
        }

        let recall_sum: f64 =
            per_class.values().map(|&(hits, total)| hits as f64 / total as f64).sum();
        Ok(recall_sum / per_class.len() as f64)
    }
}

/// Negated mean squared error, for regressors swept alongside classifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NegMeanSquaredError;

impl Scorer for NegMeanSquaredError {
    fn name(&self) -> &str {
        "neg_mean_squared_error"
    }

    fn score(&self, predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<f64, ScoreError> {
        check_inputs(predictions, actuals)?;
        let diff = predictions - actuals;
        let mse = diff.mapv(|x| x * x).mean().ok_or(ScoreError::EmptyInput)?;
        Ok(-mse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, array};

    #[test]
    fn test_accuracy_empty_input() {
        let predictions: Array1<f64> = Array1::zeros(0);
        let actuals = array![1.0];
        let result = Accuracy.score(&predictions, &actuals);
        assert!(matches!(result, Err(ScoreError::EmptyInput)));
    }

    #[test]
    fn test_accuracy_dimension_mismatch() {
        let predictions = array![1.0, 2.0];
        let actuals = array![1.0, 2.0, 3.0];
        let result = Accuracy.score(&predictions, &actuals);
        assert!(matches!(result, Err(ScoreError::DimensionMismatch { expected: 2, actual: 3 })));
    }

    #[test]
    fn test_accuracy_invalid_numeric_value() {
        let predictions = array![1.0, f64::NAN];
        let actuals = array![1.0, 2.0];
        let result = Accuracy.score(&predictions, &actuals);
        assert!(matches!(result, Err(ScoreError::InvalidNumericValue)));
    }

    #[test]
    fn test_accuracy_valid_computation() {
        let predictions = array![0.0, 1.0, 1.0, 2.0];
        let actuals = array![0.0, 1.0, 2.0, 2.0];
        let accuracy = Accuracy.score(&predictions, &actuals).unwrap();
        assert!((accuracy - 0.75).abs() < 1e-12, "Accuracy should be 0.75, got: {}", accuracy);
    }

    #[test]
    fn test_balanced_accuracy_weighs_classes_equally() {
        // class 0: 3/3 correct, class 1: 0/1 correct
        let predictions = array![0.0, 0.0, 0.0, 0.0];
        let actuals = array![0.0, 0.0, 0.0, 1.0];
        let plain = Accuracy.score(&predictions, &actuals).unwrap();
        let balanced = BalancedAccuracy.score(&predictions, &actuals).unwrap();
        assert!((plain - 0.75).abs() < 1e-12);
        assert!((balanced - 0.5).abs() < 1e-12, "Balanced accuracy should be 0.5, got: {}", balanced);
    }

    #[test]
    fn test_neg_mse_valid_computation() {
        let predictions = array![1.0, 2.0, 3.0];
        let actuals = array![1.1, 2.1, 3.1];
        let score = NegMeanSquaredError.score(&predictions, &actuals).unwrap();
        assert!((score + 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_scorer_names() {
        assert_eq!(Accuracy.name(), "accuracy");
        assert_eq!(BalancedAccuracy.name(), "balanced_accuracy");
        assert_eq!(NegMeanSquaredError.name(), "neg_mean_squared_error");
    }
}
