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

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use log::{debug, info, warn};

use super::evaluator::{EvaluationResult, Evaluator, Model, ModelFactory};
use super::report::SweepReport;
use super::space::{Combination, HyperparameterSpace};
use crate::config::SweepConfig;
use crate::data::{Dataset, KFold};
use crate::errors::SweepError;
use crate::scoring::{Accuracy, Scorer};

pub struct GridSearchBuilder<F> {
    factory: F,
    space: HyperparameterSpace,
    scorer: Arc<dyn Scorer>,
    config: SweepConfig,
}

impl<F> GridSearchBuilder<F>
where
    F: ModelFactory + 'static,
{
    pub fn scorer(mut self, scorer: impl Scorer + 'static) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    pub fn config(mut self, config: SweepConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> GridSearch<F> {
        GridSearch {
            factory: Arc::new(self.factory),
            space: self.space,
            scorer: self.scorer,
            config: self.config,
        }
    }
}

/// Exhaustive search over a [`HyperparameterSpace`].
///
/// Every combination is built by the factory, fitted and scored; the result
/// is a [`SweepReport`]. Per-combination failures are recorded on the report
/// unless the config asks for fail-fast, in which case the failure with the
/// lowest enumeration index is returned instead.
pub struct GridSearch<F> {
    factory: Arc<F>,
    space: HyperparameterSpace,
    scorer: Arc<dyn Scorer>,
    config: SweepConfig,
}

impl<F> GridSearch<F>
where
    F: ModelFactory + 'static,
{
    /// Starts a builder; scoring defaults to [`Accuracy`] and settings to [`SweepConfig::default`].
    pub fn new(factory: F, space: HyperparameterSpace) -> GridSearchBuilder<F> {
        GridSearchBuilder { factory, space, scorer: Arc::new(Accuracy), config: SweepConfig::default() }
    }

    pub fn space(&self) -> &HyperparameterSpace {
        &self.space
    }

    pub fn sweep_config(&self) -> &SweepConfig {
        &self.config
    }

    /// Scores every combination on one held-out split.
    pub fn run_holdout(&self, train: &Dataset, held_out: &Dataset) -> Result<SweepReport, SweepError> {
        self.space.validate()?;
        let evaluator = self.evaluator(vec![(train.clone(), held_out.clone())]);
        self.run(&evaluator)
    }

    /// Scores every combination by k-fold cross-validation on `data`.
    pub fn run_cv(&self, data: &Dataset, folds: &KFold) -> Result<SweepReport, SweepError> {
        self.space.validate()?;
        let evaluator = self.evaluator(folds.split(data)?);
        self.run(&evaluator)
    }

    /// Cross-validates every combination, then refits the best one on all of
    /// `data` when the config asks for it.
    pub fn fit(&self, data: &Dataset, folds: &KFold) -> Result<SearchOutcome<F::Model>, SweepError> {
        let report = self.run_cv(data, folds)?;
        if !self.config.refit() {
            return Ok(SearchOutcome { report, best_model: None });
        }

        let best_combination = match report.best() {
            Ok(best) => best.combination().clone(),
            Err(e) => {
                warn!("Nothing to refit: {}", e);
                return Ok(SearchOutcome { report, best_model: None });
            }
        };

        info!("Refitting [{}] on {} samples", best_combination, data.n_samples());
        let best_model = self.refit(&best_combination, data)?;
        Ok(SearchOutcome { report, best_model: Some(best_model) })
    }

    fn refit(&self, combination: &Combination, data: &Dataset) -> Result<F::Model, SweepError> {
        let mut model = self.factory.build(combination).map_err(|source| {
            SweepError::ModelConstruction { combination: combination.to_string(), source }
        })?;
        model
            .fit(data.features(), data.targets())
            .map_err(|source| SweepError::Fit { combination: combination.to_string(), source })?;
        Ok(model)
    }

    fn evaluator(&self, splits: Vec<(Dataset, Dataset)>) -> Evaluator<F> {
        Evaluator::new(Arc::clone(&self.factory), Arc::clone(&self.scorer), splits)
            .with_timeout(self.config.timeout())
            .with_timing(self.config.capture_timing())
    }

    /// Runs the sweep with a prepared evaluator.
    pub fn run(&self, evaluator: &Evaluator<F>) -> Result<SweepReport, SweepError> {
        let total = self.space.validate()?;
        let workers = self.config.workers().min(total);
        info!(
            "Sweeping {} combinations over {} split(s) with {} worker(s), scored by {}",
            total,
            evaluator.n_splits(),
            workers,
            self.scorer.name()
        );

        let started = Instant::now();
        let report = if workers <= 1 {
            self.run_sequential(evaluator)?
        } else {
            self.run_parallel(evaluator, workers)?
        };

        info!(
            "Sweep finished in {:.2?}: {} succeeded, {} failed",
            started.elapsed(),
            report.successes().count(),
            report.failures().count()
        );
        Ok(report)
    }

    fn run_sequential(&self, evaluator: &Evaluator<F>) -> Result<SweepReport, SweepError> {
        let mut report = SweepReport::new();
        for combination in self.space.combinations()? {
            let result = evaluator.evaluate(combination);
            if self.config.fail_fast() && !result.is_success() {
                return Err(into_error(result));
            }
            report.push(result);
        }
        Ok(report)
    }

    fn run_parallel(&self, evaluator: &Evaluator<F>, workers: usize) -> Result<SweepReport, SweepError> {
        let fail_fast = self.config.fail_fast();
        let next = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel::<EvaluationResult>();

        thread::scope(|scope| {
            for worker in 0..workers {
                let tx = tx.clone();
                let (next, abort, space) = (&next, &abort, &self.space);
                scope.spawn(move || {
                    debug!("Worker {} started", worker);
                    while !abort.load(Ordering::Relaxed) {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(combination) = space.combination_at(index) else {
                            break;
                        };
                        let result = evaluator.evaluate(combination);
                        if fail_fast && !result.is_success() {
                            abort.store(true, Ordering::Relaxed);
                        }
                        if tx.send(result).is_err() {
                            break;
                        }
                    }
                    debug!("Worker {} finished", worker);
                });
            }
        });
        drop(tx);

        // merge by enumeration index, not completion order
        let mut results: Vec<EvaluationResult> = rx.into_iter().collect();
        results.sort_by_key(EvaluationResult::index);

        if fail_fast {
            if let Some(at) = results.iter().position(|r| !r.is_success()) {
                return Err(into_error(results.swap_remove(at)));
            }
        }
        Ok(SweepReport::from_results(results))
    }
}

fn into_error(result: EvaluationResult) -> SweepError {
    match result.into_outcome() {
        (_, Err(e)) => e,
        (combination, Ok(_)) => SweepError::WorkerPanicked { combination: combination.to_string() },
    }
}

/// Report of a cross-validated search plus, when refitting is enabled, the
/// best combination's model trained on the full data set.
pub struct SearchOutcome<M> {
    report: SweepReport,
    best_model: Option<M>,
}

impl<M> SearchOutcome<M> {
    pub fn report(&self) -> &SweepReport {
        &self.report
    }

    pub fn best(&self) -> Result<&EvaluationResult, SweepError> {
        self.report.best()
    }

    pub fn best_model(&self) -> Option<&M> {
        self.best_model.as_ref()
    }

    pub fn into_parts(self) -> (SweepReport, Option<M>) {
        (self.report, self.best_model)
    }
}
