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

use std::fmt;

use ndarray::Array2;

use super::evaluator::EvaluationResult;
use super::space::ParamValue;
use crate::errors::SweepError;

/// Every evaluation of one sweep, kept in enumeration order.
///
/// # Tie-break policy
/// When several combinations share the top score, [`best`](Self::best)
/// returns the one enumerated first, and [`ranked`](Self::ranked) keeps tied
/// entries in enumeration order. Results are ordered by enumeration index no
/// matter the order they were collected in, so parallel sweeps rank exactly
/// like sequential ones.
#[derive(Debug, Default)]
pub struct SweepReport {
    results: Vec<EvaluationResult>,
}

impl SweepReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_results(mut results: Vec<EvaluationResult>) -> Self {
        results.sort_by_key(EvaluationResult::index);
        SweepReport { results }
    }

    /// Adds a result, keeping the report sorted by enumeration index.
    pub fn push(&mut self, result: EvaluationResult) {
        let at = self.results.partition_point(|r| r.index() <= result.index());
        self.results.insert(at, result);
    }

    /// All results in enumeration order.
    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<EvaluationResult> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// Highest-scoring result; ties go to the earliest enumerated combination.
    ///
    /// Fails with [`SweepError::EmptySweep`] when the report holds no
    /// successful evaluation.
    pub fn best(&self) -> Result<&EvaluationResult, SweepError> {
        let mut best: Option<(&EvaluationResult, f64)> = None;
        for result in &self.results {
            if let Some(score) = result.score().filter(|s| !s.is_nan()) {
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((result, score));
                }
            }
        }
        best.map(|(result, _)| result).ok_or(SweepError::EmptySweep)
    }

    /// Successful results by descending score, then failed ones.
    ///
    /// The sort is stable, so equal scores keep enumeration order.
    pub fn ranked(&self) -> Vec<&EvaluationResult> {
        let mut ranked: Vec<&EvaluationResult> = self.successes().collect();
        ranked.sort_by(|a, b| rank_key(b).total_cmp(&rank_key(a)));
        ranked.extend(self.failures());
        ranked
    }

    pub fn top(&self, n: usize) -> Vec<&EvaluationResult> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    /// Ranked results rendered as a text table.
    pub fn table(&self) -> ResultsTable<'_> {
        ResultsTable { ranked: self.ranked(), limit: None }
    }

    /// Pivots the report over two parameters.
    ///
    /// Rows and columns follow the first-seen order of each parameter's
    /// values. When other parameters vary too, a cell holds the best score
    /// among the combinations that share its row and column values. Cells
    /// with no successful evaluation are `NaN`.
    pub fn score_grid(&self, row_param: &str, col_param: &str) -> Result<ScoreGrid, SweepError> {
        let first = self.results.first().ok_or(SweepError::EmptySweep)?;
        for name in [row_param, col_param] {
            if first.combination().get(name).is_none() {
                return Err(SweepError::InvalidSpace(format!(
                    "parameter '{}' is not part of the sweep",
                    name
                )));
            }
        }

        let mut rows: Vec<ParamValue> = Vec::new();
        let mut cols: Vec<ParamValue> = Vec::new();
        let mut cells: Vec<(usize, usize, Option<f64>)> = Vec::with_capacity(self.results.len());
        for result in &self.results {
            let combination = result.combination();
            let (Some(row), Some(col)) = (combination.get(row_param), combination.get(col_param))
            else {
                continue;
            };
            let r = position_or_insert(&mut rows, row);
            let c = position_or_insert(&mut cols, col);
            cells.push((r, c, result.score()));
        }

        let mut scores = Array2::from_elem((rows.len(), cols.len()), f64::NAN);
        for (r, c, score) in cells {
            if let Some(score) = score {
                let cell = &mut scores[[r, c]];
                if cell.is_nan() || score > *cell {
                    *cell = score;
                }
            }
        }

        Ok(ScoreGrid {
            row_param: row_param.to_string(),
            col_param: col_param.to_string(),
            rows,
            cols,
            scores,
        })
    }
}

// NaN sorts below every real score
fn rank_key(result: &EvaluationResult) -> f64 {
    result.score().filter(|s| !s.is_nan()).unwrap_or(f64::NEG_INFINITY)
}

fn position_or_insert(values: &mut Vec<ParamValue>, value: &ParamValue) -> usize {
    match values.iter().position(|v| v == value) {
        Some(i) => i,
        None => {
            values.push(value.clone());
            values.len() - 1
        }
    }
}

impl Extend<EvaluationResult> for SweepReport {
    fn extend<I: IntoIterator<Item = EvaluationResult>>(&mut self, iter: I) {
        for result in iter {
            self.push(result);
        }
    }
}

impl FromIterator<EvaluationResult> for SweepReport {
    fn from_iter<I: IntoIterator<Item = EvaluationResult>>(iter: I) -> Self {
        SweepReport::from_results(iter.into_iter().collect())
    }
}

/// Text rendering of a ranked report.
pub struct ResultsTable<'a> {
    ranked: Vec<&'a EvaluationResult>,
    limit: Option<usize>,
}

impl ResultsTable<'_> {
    /// Only render the first `n` rows.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

impl fmt::Display for ResultsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>4}  {:>10}  {:>8}  {:>9}  params", "rank", "mean", "std", "fit_ms")?;
        let shown = self.limit.unwrap_or(self.ranked.len());
        for (rank, result) in self.ranked.iter().take(shown).enumerate() {
            match result.scores() {
                Some(scores) => {
                    let fit_ms = scores
                        .fit_time
                        .map(|t| format!("{:.3}", t.as_secs_f64() * 1e3))
                        .unwrap_or_else(|| "-".to_string());
                    writeln!(
                        f,
                        "{:>4}  {:>10.6}  {:>8.4}  {:>9}  {}",
                        rank + 1,
                        scores.mean,
                        scores.std,
                        fit_ms,
                        result.combination()
                    )?;
                }
                None => {
                    let reason = result.error().map(|e| e.to_string()).unwrap_or_default();
                    writeln!(
                        f,
                        "{:>4}  {:>10}  {:>8}  {:>9}  {}  ({})",
                        "-",
                        "failed",
                        "-",
                        "-",
                        result.combination(),
                        reason
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// Scores pivoted over two parameters, e.g. accuracy by `n_neighbors` and `weights`.
#[derive(Debug, Clone)]
pub struct ScoreGrid {
    pub row_param: String,
    pub col_param: String,
    pub rows: Vec<ParamValue>,
    pub cols: Vec<ParamValue>,
    pub scores: Array2<f64>,
}

impl ScoreGrid {
    pub fn get(&self, row: &ParamValue, col: &ParamValue) -> Option<f64> {
        let r = self.rows.iter().position(|v| v == row)?;
        let c = self.cols.iter().position(|v| v == col)?;
        let score = self.scores[[r, c]];
        if score.is_nan() {
            None
        } else {
            Some(score)
        }
    }
}

impl fmt::Display for ScoreGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>12}", format!("{}\\{}", self.row_param, self.col_param))?;
        for col in &self.cols {
            write!(f, "  {:>10}", col.to_string())?;
        }
        writeln!(f)?;
        for (r, row) in self.rows.iter().enumerate() {
            write!(f, "{:>12}", row.to_string())?;
            for c in 0..self.cols.len() {
                let score = self.scores[[r, c]];
                if score.is_nan() {
                    write!(f, "  {:>10}", "-")?;
                } else {
                    write!(f, "  {:>10.4}", score)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ModelError;
    use crate::sweep::evaluator::Scores;
    use crate::sweep::{Combination, HyperparameterSpace};

    fn knn_combinations() -> Vec<Combination> {
        HyperparameterSpace::new()
            .with_param("n_neighbors", [1, 3, 5])
            .with_param("weights", ["uniform", "distance"])
            .combinations()
            .unwrap()
            .collect()
    }

    fn scored(combination: Combination, score: f64) -> EvaluationResult {
        EvaluationResult::succeeded(
            combination,
            Scores { mean: score, std: 0.0, per_split: vec![score], fit_time: None, score_time: None },
        )
    }

    fn report_with(scores: &[f64]) -> SweepReport {
        knn_combinations().into_iter().zip(scores).map(|(c, &s)| scored(c, s)).collect()
    }

    #[test]
    fn test_empty_report_has_no_best() {
        let report = SweepReport::new();
        assert!(matches!(report.best(), Err(SweepError::EmptySweep)));
        assert!(report.ranked().is_empty());
    }

    #[test]
    fn test_best_is_maximum_score() {
        let report = report_with(&[0.80, 0.85, 0.93, 0.91, 0.90, 0.88]);
        let best = report.best().unwrap();
        assert_eq!(best.index(), 2);
        assert!(report.results().iter().all(|r| best.score() >= r.score()));
    }

    #[test]
    fn test_constant_scores_resolve_to_first_combination() {
        let report = report_with(&[0.9; 6]);
        let best = report.best().unwrap();
        assert_eq!(best.combination().to_string(), "n_neighbors=1, weights=uniform");

        let order: Vec<usize> = report.ranked().iter().map(|r| r.index()).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_ranking_is_descending_and_stable() {
        let report = report_with(&[0.5, 0.9, 0.7, 0.9, 0.5, 0.7]);
        let order: Vec<usize> = report.ranked().iter().map(|r| r.index()).collect();
        assert_eq!(order, vec![1, 3, 2, 5, 0, 4]);
        assert_eq!(report.best().unwrap().index(), 1);
    }

    #[test]
    fn test_out_of_order_results_are_resorted() {
        let mut results: Vec<EvaluationResult> =
            knn_combinations().into_iter().map(|c| scored(c, 0.9)).collect();
        results.reverse();

        let mut pushed = SweepReport::new();
        for result in results {
            pushed.push(result);
        }
        let order: Vec<usize> = pushed.results().iter().map(|r| r.index()).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(pushed.best().unwrap().index(), 0);
    }

    #[test]
    fn test_failures_never_win_and_rank_last() {
        let mut combinations = knn_combinations().into_iter();
        let report: SweepReport = vec![
            EvaluationResult::failed(
                combinations.next().unwrap(),
                SweepError::Fit { combination: "n_neighbors=1".to_string(), source: ModelError::EmptyInput },
            ),
            scored(combinations.next().unwrap(), 0.4),
        ]
        .into_iter()
        .collect();

        assert_eq!(report.best().unwrap().index(), 1);
        let order: Vec<usize> = report.ranked().iter().map(|r| r.index()).collect();
        assert_eq!(order, vec![1, 0]);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.successes().count(), 1);
    }

    #[test]
    fn test_all_failed_report_has_no_best() {
        let report: SweepReport = knn_combinations()
            .into_iter()
            .map(|c| EvaluationResult::failed(c, SweepError::EmptySweep))
            .collect();
        assert!(matches!(report.best(), Err(SweepError::EmptySweep)));
    }

    #[test]
    fn test_score_grid_pivots_two_parameters() {
        let report = report_with(&[0.80, 0.85, 0.93, 0.91, 0.90, 0.88]);
        let grid = report.score_grid("n_neighbors", "weights").unwrap();

        assert_eq!(grid.scores.dim(), (3, 2));
        assert_eq!(grid.rows, vec![ParamValue::Int(1), ParamValue::Int(3), ParamValue::Int(5)]);
        assert_eq!(grid.get(&ParamValue::Int(3), &ParamValue::from("distance")), Some(0.91));
        assert_eq!(grid.get(&ParamValue::Int(7), &ParamValue::from("distance")), None);

        let rendered = grid.to_string();
        assert!(rendered.contains("n_neighbors\\weights"), "Unexpected grid:\n{}", rendered);
        assert!(rendered.contains("0.9300"));
    }

    #[test]
    fn test_score_grid_rejects_unknown_parameter() {
        let report = report_with(&[0.5; 6]);
        assert!(matches!(report.score_grid("n_neighbors", "metric"), Err(SweepError::InvalidSpace(_))));
        assert!(matches!(SweepReport::new().score_grid("a", "b"), Err(SweepError::EmptySweep)));
    }

    #[test]
    fn test_table_lists_ranked_rows() {
        let report = report_with(&[0.80, 0.85, 0.93, 0.91, 0.90, 0.88]);
        let table = report.table().limit(2).to_string();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("n_neighbors=3, weights=uniform"), "Unexpected table:\n{}", table);
        assert!(lines[2].contains("n_neighbors=3, weights=distance"), "Unexpected table:\n{}", table);
    }
}
