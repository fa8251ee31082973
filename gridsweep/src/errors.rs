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

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ScalerError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Input has no feature columns")]
    NoFeatures,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Scaler has not been fitted")]
    NotFitted,
}

#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("Scaler error: {0}")]
    Scaler(#[from] ScalerError),

    #[error("Invalid hyperparameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Missing hyperparameter '{0}'")]
    MissingParameter(String),

    #[error("Input is empty")]
    EmptyInput,

    #[error("Input has no feature columns")]
    NoFeatures,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Input contains NaN or infinite values")]
    InvalidNumericValue,

    #[error("Invalid class label {0}: labels must be non-negative integers")]
    InvalidLabel(f64),

    #[error("Model has not been fitted")]
    NotFitted,
}

#[derive(Error, Debug, PartialEq)]
pub enum ScoreError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Input contains NaN or infinite values")]
    InvalidNumericValue,
}

#[derive(Error, Debug, PartialEq)]
pub enum SplitError {
    #[error("Dataset is empty")]
    EmptyInput,

    #[error("Invalid test ratio {0}: must be strictly between 0 and 1")]
    InvalidRatio(f64),

    #[error("Invalid number of folds {0}: need at least 2")]
    InvalidFolds(usize),

    #[error("Not enough samples: need at least {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("Split error: {0}")]
    Split(#[from] SplitError),

    #[error("Features have {features} rows but targets have {targets}")]
    RowMismatch { features: usize, targets: usize },

    #[error("Failed to download dataset: {0}")]
    Download(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("Failed to open file: {0}")]
    FileOpen(#[from] std::io::Error),

    #[error("CSV file is empty")]
    EmptyFile,

    #[error("CSV must have at least one feature and one target column")]
    InsufficientColumns,

    #[error("Inconsistent column count: row {row} has {actual} columns, expected {expected}")]
    InconsistentColumns { row: usize, actual: usize, expected: usize },

    #[error("Invalid numeric value '{value}' at row {row}: {source}")]
    InvalidNumeric { value: String, row: usize, source: std::num::ParseFloatError },

    #[error("Failed to shape data into array: {0}")]
    ArrayShape(#[from] ndarray::ShapeError),

    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),
}

/// Errors raised while running a sweep.
///
/// The per-combination variants (`ModelConstruction`, `Fit`, `Prediction`,
/// `Score`, `Timeout`, `WorkerPanicked`) are normally attached to a failed
/// [`EvaluationResult`](crate::sweep::EvaluationResult) and only returned
/// directly when the sweep runs in fail-fast mode.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Invalid hyperparameter space: {0}")]
    InvalidSpace(String),

    #[error("Model construction failed for [{combination}]: {source}")]
    ModelConstruction { combination: String, source: ModelError },

    #[error("Fit failed for [{combination}]: {source}")]
    Fit { combination: String, source: ModelError },

    #[error("Prediction failed for [{combination}]: {source}")]
    Prediction { combination: String, source: ModelError },

    #[error("Scoring failed for [{combination}]: {source}")]
    Score { combination: String, source: ScoreError },

    #[error("Evaluation of [{combination}] exceeded the {timeout:?} timeout")]
    Timeout { combination: String, timeout: Duration },

    #[error("Evaluation worker for [{combination}] panicked")]
    WorkerPanicked { combination: String },

    #[error("No successful evaluations to aggregate")]
    EmptySweep,

    #[error("Split error: {0}")]
    Split(#[from] SplitError),
}

impl SweepError {
    /// Whether the error belongs to a single combination rather than the sweep as a whole.
    pub fn is_per_combination(&self) -> bool {
        !matches!(self, SweepError::InvalidSpace(_) | SweepError::EmptySweep | SweepError::Split(_))
    }
}
