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

//! Fixtures shared by the unit tests.

use std::thread;
use std::time::Duration;

use ndarray::{Array1, Array2, array};

use crate::data::Dataset;
use crate::errors::{ModelError, ScoreError};
use crate::scoring::Scorer;
use crate::sweep::Model;

/// The iris data set converted into this crate's array types.
pub(crate) fn iris() -> Dataset {
    let dataset = linfa_datasets::iris();
    let records = dataset.records();
    let x = Array2::from_shape_vec(
        (records.nrows(), records.ncols()),
        records.iter().copied().collect(),
    )
    .unwrap();
    let y = Array1::from_iter(dataset.targets().iter().map(|&t| t as f64));
    Dataset::new(x, y).unwrap()
}

/// Two well separated clusters, returned as `(train, held_out)`.
pub(crate) fn two_blobs() -> (Dataset, Dataset) {
    let train = Dataset::new(
        array![[0.0, 0.0], [0.2, 0.1], [0.1, 0.3], [5.0, 5.0], [5.2, 4.9], [4.8, 5.1]],
        array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
    )
    .unwrap();
    let held_out = Dataset::new(array![[0.1, 0.1], [5.1, 5.0]], array![0.0, 1.0]).unwrap();
    (train, held_out)
}

/// Predicts a constant label; fit optionally sleeps or panics.
pub(crate) struct StubModel {
    pub label: f64,
    pub fit_delay: Duration,
    pub panic_on_fit: bool,
}

impl StubModel {
    pub(crate) fn constant(label: f64) -> Self {
        StubModel { label, fit_delay: Duration::ZERO, panic_on_fit: false }
    }
}

impl Model for StubModel {
    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<(), ModelError> {
        if self.panic_on_fit {
            panic!("stub model asked to panic");
        }
        thread::sleep(self.fit_delay);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        Ok(Array1::from_elem(x.nrows(), self.label))
    }
}

/// Scores every prediction set the same.
pub(crate) struct ConstantScorer(pub f64);

impl Scorer for ConstantScorer {
    fn name(&self) -> &str {
        "constant"
    }

    fn score(&self, _predictions: &Array1<f64>, _actuals: &Array1<f64>) -> Result<f64, ScoreError> {
        Ok(self.0)
    }
}
