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

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use ndarray::{Array1, Array2};

use super::space::Combination;
use crate::data::Dataset;
use crate::errors::{ModelError, SplitError, SweepError};
use crate::scoring::Scorer;

/// A trainable model driven by the sweep.
pub trait Model: Send {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;
}

/// Builds a fresh, unfitted model for one combination.
///
/// Rejecting a combination here surfaces as [`SweepError::ModelConstruction`].
/// Any `Fn(&Combination) -> Result<M, ModelError>` is a factory.
pub trait ModelFactory: Send + Sync {
    type Model: Model;

    fn build(&self, combination: &Combination) -> Result<Self::Model, ModelError>;
}

impl<F, M> ModelFactory for F
where
    F: Fn(&Combination) -> Result<M, ModelError> + Send + Sync,
    M: Model,
{
    type Model = M;

    fn build(&self, combination: &Combination) -> Result<M, ModelError> {
        self(combination)
    }
}

/// Scores of one combination across every split it was evaluated on.
#[derive(Debug, Clone, PartialEq)]
pub struct Scores {
    /// Mean of `per_split`; this is the value results are ranked by.
    pub mean: f64,
    /// Population standard deviation of `per_split` (0 for a single split).
    pub std: f64,
    pub per_split: Vec<f64>,
    /// Mean time spent in `fit` per split, when timing is captured.
    pub fit_time: Option<Duration>,
    /// Mean time spent predicting and scoring per split, when timing is captured.
    pub score_time: Option<Duration>,
}

impl Scores {
    fn from_splits(per_split: Vec<f64>, fit_total: Option<Duration>, score_total: Option<Duration>) -> Self {
        let n = per_split.len() as f64;
        let mean = per_split.iter().sum::<f64>() / n;
        let variance = per_split.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
        let splits = per_split.len() as u32;
        Scores {
            mean,
            std: variance.sqrt(),
            per_split,
            fit_time: fit_total.map(|t| t / splits),
            score_time: score_total.map(|t| t / splits),
        }
    }
}

/// Outcome of evaluating one combination: its scores, or the error that stopped it.
#[derive(Debug)]
pub struct EvaluationResult {
    combination: Combination,
    outcome: Result<Scores, SweepError>,
}

impl EvaluationResult {
    pub fn succeeded(combination: Combination, scores: Scores) -> Self {
        EvaluationResult { combination, outcome: Ok(scores) }
    }

    pub fn failed(combination: Combination, error: SweepError) -> Self {
        EvaluationResult { combination, outcome: Err(error) }
    }

    pub fn combination(&self) -> &Combination {
        &self.combination
    }

    /// Enumeration index of the combination.
    pub fn index(&self) -> usize {
        self.combination.index()
    }

    /// Mean score, or `None` for a failed evaluation.
    pub fn score(&self) -> Option<f64> {
        self.outcome.as_ref().ok().map(|s| s.mean)
    }

    pub fn scores(&self) -> Option<&Scores> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&SweepError> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_outcome(self) -> (Combination, Result<Scores, SweepError>) {
        (self.combination, self.outcome)
    }
}

/// Fits and scores one combination at a time against a fixed set of splits.
///
/// Training and held-out data are shared read-only between evaluations; each
/// evaluation builds its own model per split.
///
/// A panicking model is recorded as [`SweepError::WorkerPanicked`] only when
/// the binary is built with `panic = "unwind"`; under `panic = "abort"` the
/// process terminates.
pub struct Evaluator<F> {
    factory: Arc<F>,
    scorer: Arc<dyn Scorer>,
    splits: Arc<Vec<(Dataset, Dataset)>>,
    timeout: Option<Duration>,
    capture_timing: bool,
}

impl<F> Clone for Evaluator<F> {
    fn clone(&self) -> Self {
        Evaluator {
            factory: Arc::clone(&self.factory),
            scorer: Arc::clone(&self.scorer),
            splits: Arc::clone(&self.splits),
            timeout: self.timeout,
            capture_timing: self.capture_timing,
        }
    }
}

impl<F> Evaluator<F>
where
    F: ModelFactory + 'static,
{
    /// Evaluates against every `(train, held_out)` pair; the score is their mean.
    pub fn new(factory: Arc<F>, scorer: Arc<dyn Scorer>, splits: Vec<(Dataset, Dataset)>) -> Self {
        Evaluator { factory, scorer, splits: Arc::new(splits), timeout: None, capture_timing: true }
    }

    /// Evaluates against a single train/held-out split.
    pub fn holdout(factory: Arc<F>, scorer: Arc<dyn Scorer>, train: Dataset, held_out: Dataset) -> Self {
        Self::new(factory, scorer, vec![(train, held_out)])
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_timing(mut self, capture_timing: bool) -> Self {
        self.capture_timing = capture_timing;
        self
    }

    pub fn n_splits(&self) -> usize {
        self.splits.len()
    }

    /// Evaluates one combination. Never fails as a whole: errors are recorded
    /// on the returned result.
    pub fn evaluate(&self, combination: Combination) -> EvaluationResult {
        let outcome = match self.timeout {
            None => self.run_guarded(&combination),
            Some(timeout) => self.run_with_timeout(&combination, timeout),
        };

        match &outcome {
            Ok(scores) => debug!("[{}] score={:.4} std={:.4}", combination, scores.mean, scores.std),
            Err(e) => warn!("[{}] evaluation failed: {}", combination, e),
        }
        EvaluationResult { combination, outcome }
    }

    fn run_guarded(&self, combination: &Combination) -> Result<Scores, SweepError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.run(combination))).unwrap_or_else(|_| {
            Err(SweepError::WorkerPanicked { combination: combination.to_string() })
        })
    }

    fn run_with_timeout(&self, combination: &Combination, timeout: Duration) -> Result<Scores, SweepError> {
        let (tx, rx) = mpsc::channel();
        let evaluator = self.clone();
        let job = combination.clone();
        let spawned = thread::Builder::new()
            .name(format!("gridsweep-eval-{}", combination.index()))
            .spawn(move || {
                // the receiver is gone once the evaluation has timed out
                let _ = tx.send(evaluator.run_guarded(&job));
            });

        if let Err(e) = spawned {
            warn!("Could not spawn evaluation thread ({}), evaluating inline", e);
            return self.run_guarded(combination);
        }

        match rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            // the evaluation thread is detached and left to finish on its own
            Err(RecvTimeoutError::Timeout) => {
                Err(SweepError::Timeout { combination: combination.to_string(), timeout })
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(SweepError::WorkerPanicked { combination: combination.to_string() })
            }
        }
    }

    fn run(&self, combination: &Combination) -> Result<Scores, SweepError> {
        if self.splits.is_empty() {
            return Err(SweepError::Split(SplitError::EmptyInput));
        }

        let label = || combination.to_string();
        let mut per_split = Vec::with_capacity(self.splits.len());
        let mut fit_total = Duration::ZERO;
        let mut score_total = Duration::ZERO;

        for (train, held_out) in self.splits.iter() {
            let mut model = self
                .factory
                .build(combination)
                .map_err(|source| SweepError::ModelConstruction { combination: label(), source })?;

            if train.is_empty() {
                return Err(SweepError::Fit { combination: label(), source: ModelError::EmptyInput });
            }

            let started = Instant::now();
            model
                .fit(train.features(), train.targets())
                .map_err(|source| SweepError::Fit { combination: label(), source })?;
            fit_total += started.elapsed();

            let started = Instant::now();
            let predictions = model
                .predict(held_out.features())
                .map_err(|source| SweepError::Prediction { combination: label(), source })?;
            let score = self
                .scorer
                .score(&predictions, held_out.targets())
                .map_err(|source| SweepError::Score { combination: label(), source })?;
            score_total += started.elapsed();

            per_split.push(score);
        }

        let (fit_time, score_time) = if self.capture_timing {
            (Some(fit_total), Some(score_total))
        } else {
            (None, None)
        };
        Ok(Scores::from_splits(per_split, fit_time, score_time))
    }
}
