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

//! Exhaustive hyperparameter search for classifiers.
//!
//! A [`sweep::HyperparameterSpace`] names candidate values per parameter.
//! [`sweep::GridSearch`] builds a model for every combination, fits it on
//! training data, scores it on held-out data (a single split or k folds) and
//! collects the outcomes in a [`sweep::SweepReport`] that can name the best
//! combination, rank them all and render tables.
//!
//! ```no_run
//! use gridsweep::algorithms::KNN;
//! use gridsweep::data::{CsvHeadersLoader, KFold, load_data};
//! use gridsweep::sweep::{GridSearch, HyperparameterSpace};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = load_data::<CsvHeadersLoader, _>("train_data.csv")?;
//! let space = HyperparameterSpace::new()
//!     .with_param("n_neighbors", [1, 3, 5])
//!     .with_param("weights", ["uniform", "distance"]);
//!
//! let report = GridSearch::new(KNN::from_combination, space)
//!     .build()
//!     .run_cv(&data, &KFold::new(5).shuffle(42).stratified(true))?;
//! println!("{}", report.table());
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod config;
pub mod data;
pub mod errors;
pub mod scalers;
pub mod scoring;
pub mod sweep;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::SweepConfig;
pub use errors::SweepError;
pub use ndarray;
