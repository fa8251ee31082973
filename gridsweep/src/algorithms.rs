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
use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView1, Axis, Zip};

use crate::errors::ModelError;
use crate::scalers::StandardScaler;
use crate::sweep::{Combination, Model, ParamValue};

/// How the votes of the `k` nearest neighbors are weighted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Weights {
    /// Every neighbor casts one vote.
    Uniform,
    /// Neighbors vote with weight `1 / distance`. Exact matches outvote everything else.
    Distance,
}

impl FromStr for Weights {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(Weights::Uniform),
            "distance" => Ok(Weights::Distance),
            other => Err(ModelError::InvalidParameter {
                name: "weights".to_string(),
                reason: format!("unknown weighting '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weights::Uniform => write!(f, "uniform"),
            Weights::Distance => write!(f, "distance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Euclidean,
    Manhattan,
    Chebyshev,
    /// Minkowski distance of order `p >= 1`.
    Minkowski(f64),
}

impl Metric {
    /// Resolves a metric name. `p` is only read for `minkowski`.
    pub fn parse(name: &str, p: f64) -> Result<Self, ModelError> {
        match name {
            "euclidean" => Ok(Metric::Euclidean),
            "manhattan" => Ok(Metric::Manhattan),
            "chebyshev" => Ok(Metric::Chebyshev),
            "minkowski" => Ok(Metric::Minkowski(p)),
            other => Err(ModelError::InvalidParameter {
                name: "metric".to_string(),
                reason: format!("unknown metric '{}'", other),
            }),
        }
    }

    pub fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match *self {
            Metric::Euclidean => Zip::from(a)
                .and(b)
                .fold(0.0_f64, |acc, &a_i, &b_i| {
                    let diff = a_i - b_i;
                    acc + diff * diff
                })
                .sqrt(),
            Metric::Manhattan => {
                Zip::from(a).and(b).fold(0.0_f64, |acc, &a_i, &b_i| acc + (a_i - b_i).abs())
            }
            Metric::Chebyshev => {
                Zip::from(a).and(b).fold(0.0_f64, |acc, &a_i, &b_i| acc.max((a_i - b_i).abs()))
            }
            Metric::Minkowski(p) => Zip::from(a)
                .and(b)
                .fold(0.0_f64, |acc, &a_i, &b_i| acc + (a_i - b_i).abs().powf(p))
                .powf(1.0 / p),
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        match *self {
            Metric::Minkowski(p) if !(p >= 1.0 && p.is_finite()) => {
                Err(ModelError::InvalidParameter {
                    name: "p".to_string(),
                    reason: format!("Minkowski order must be a finite value >= 1, got {}", p),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Euclidean => write!(f, "euclidean"),
            Metric::Manhattan => write!(f, "manhattan"),
            Metric::Chebyshev => write!(f, "chebyshev"),
            Metric::Minkowski(p) => write!(f, "minkowski(p={})", p),
        }
    }
}

pub struct KNNBuilder {
    k: usize,
    weights: Weights,
    metric: Metric,
    normalize: bool,
    x_scaler: StandardScaler,
}

impl KNNBuilder {
    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn scaler(mut self, scaler: StandardScaler) -> Self {
        self.x_scaler = scaler;
        self
    }

    pub fn build(self) -> KNN {
        KNN {
            x_train: None,
            y_train: None,
            k: self.k,
            weights: self.weights,
            metric: self.metric,
            normalize: self.normalize,
            x_scaler: self.x_scaler,
        }
    }
}

/// K-nearest-neighbors classifier.
///
/// Ties are resolved deterministically:
/// - neighbors at equal distance are taken in training-row order;
/// - classes with equal vote weight resolve to the smallest class label.
pub struct KNN {
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
    k: usize,
    weights: Weights,
    metric: Metric,
    normalize: bool,
    x_scaler: StandardScaler,
}

impl KNN {
    /// Defaults: `k = 5`, uniform weights, Euclidean distance, no scaling.
    pub fn new() -> KNNBuilder {
        KNNBuilder {
            k: 5,
            weights: Weights::Uniform,
            metric: Metric::Euclidean,
            normalize: false,
            x_scaler: StandardScaler::new(),
        }
    }

    /// Builds an unfitted classifier from a sweep combination.
    ///
    /// Recognized parameters, all optional: `n_neighbors` (int), `weights`
    /// (`uniform` | `distance`), `metric` (`euclidean` | `manhattan` |
    /// `chebyshev` | `minkowski`), `p` (number, Minkowski order, default 2)
    /// and `normalize` (bool). Any other name, or a value of the wrong kind,
    /// is rejected.
    pub fn from_combination(combination: &Combination) -> Result<KNN, ModelError> {
        let mut builder = KNN::new();
        let mut metric_name: Option<String> = None;
        let mut p = 2.0;

        for (name, value) in combination.iter() {
            match name {
                "n_neighbors" => {
                    let k = value.as_int().ok_or_else(|| wrong_kind(name, value, "an integer"))?;
                    if k < 1 {
                        return Err(ModelError::InvalidParameter {
                            name: name.to_string(),
                            reason: format!("must be at least 1, got {}", k),
                        });
                    }
                    builder = builder.k(k as usize);
                }
                "weights" => {
                    let weights = value.as_str().ok_or_else(|| wrong_kind(name, value, "a string"))?;
                    builder = builder.weights(weights.parse()?);
                }
                "metric" => {
                    let metric = value.as_str().ok_or_else(|| wrong_kind(name, value, "a string"))?;
                    metric_name = Some(metric.to_string());
                }
                "p" => {
                    p = value.as_float().ok_or_else(|| wrong_kind(name, value, "a number"))?;
                }
                "normalize" => {
                    let normalize = value.as_bool().ok_or_else(|| wrong_kind(name, value, "a bool"))?;
                    builder = builder.normalize(normalize);
                }
                other => {
                    return Err(ModelError::InvalidParameter {
                        name: other.to_string(),
                        reason: "not a KNN hyperparameter".to_string(),
                    });
                }
            }
        }

        let metric = match metric_name {
            Some(name) => Metric::parse(&name, p)?,
            None if combination.get("p").is_some() => Metric::Minkowski(p),
            None => Metric::Euclidean,
        };
        metric.validate()?;

        Ok(builder.metric(metric).build())
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        if x.ncols() == 0 {
            return Err(ModelError::NoFeatures);
        }
        if x.is_empty() || y.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch { expected: x.nrows(), actual: y.len() });
        }
        if self.k == 0 || self.k > x.nrows() {
            return Err(ModelError::InvalidParameter {
                name: "n_neighbors".to_string(),
                reason: format!("must be between 1 and {} training samples, got {}", x.nrows(), self.k),
            });
        }
        self.metric.validate()?;
        check_finite(x)?;
        if let Some(&bad) = y.iter().find(|&&label| !(label >= 0.0 && label.fract() == 0.0)) {
            return Err(ModelError::InvalidLabel(bad));
        }

        let x_scaled = if self.normalize { self.x_scaler.fit_transform(x)? } else { x.clone() };

        self.x_train = Some(x_scaled);
        self.y_train = Some(y.clone());
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let x_train = self.x_train.as_ref().ok_or(ModelError::NotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(ModelError::NotFitted)?;

        if x.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        if x.ncols() != x_train.ncols() {
            return Err(ModelError::DimensionMismatch {
                expected: x_train.ncols(),
                actual: x.ncols(),
            });
        }
        check_finite(x)?;

        let x_scaled = if self.normalize { self.x_scaler.transform(x)? } else { x.clone() };

        let mut predictions = Array1::zeros(x_scaled.nrows());
        for (i, row) in x_scaled.axis_iter(Axis(0)).enumerate() {
            let mut neighbors: Vec<(usize, f64)> = x_train
                .axis_iter(Axis(0))
                .map(|v| self.metric.distance(v, row))
                .enumerate()
                .collect();
            // stable sort: equal distances keep training order
            neighbors.sort_by(|a, b| a.1.total_cmp(&b.1));
            neighbors.truncate(self.k);

            predictions[i] = self.vote(&neighbors, y_train);
        }
        Ok(predictions)
    }

    fn vote(&self, neighbors: &[(usize, f64)], y_train: &Array1<f64>) -> f64 {
        let exact_matches = neighbors.iter().any(|&(_, d)| d == 0.0);
        let mut class_weights: BTreeMap<u64, f64> = BTreeMap::new();
        for &(idx, distance) in neighbors {
            let weight = match self.weights {
                Weights::Uniform => 1.0,
                Weights::Distance if exact_matches => {
                    if distance == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                Weights::Distance => 1.0 / distance,
            };
            *class_weights.entry(y_train[idx] as u64).or_insert(0.0) += weight;
        }

        // BTreeMap iterates in ascending label order; strict `>` keeps the smallest label on ties
        let mut best: Option<(u64, f64)> = None;
        for (&label, &weight) in &class_weights {
            if best.map_or(true, |(_, w)| weight > w) {
                best = Some((label, weight));
            }
        }
        best.map_or(0.0, |(label, _)| label as f64)
    }

    pub fn calculate_accuracy(&self, predictions: &Array1<f64>, y_test: &Array1<f64>) -> f64 {
        let correct = predictions
            .iter()
            .zip(y_test.iter())
            .filter(|(&pred, &true_label)| pred == true_label)
            .count();
        correct as f64 / predictions.len() as f64
    }
}

fn check_finite(x: &Array2<f64>) -> Result<(), ModelError> {
    if x.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ModelError::InvalidNumericValue)
    }
}

fn wrong_kind(name: &str, value: &ParamValue, expected: &str) -> ModelError {
    ModelError::InvalidParameter {
        name: name.to_string(),
        reason: format!("expected {}, got '{}'", expected, value),
    }
}

impl Model for KNN {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        KNN::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        KNN::predict(self, x)
    }
}
