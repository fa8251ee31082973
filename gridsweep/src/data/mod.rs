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

pub mod csv;
pub mod processors;
pub mod split;

pub use self::csv::{CsvHeadersLoader, CsvLoader};
pub use self::split::{KFold, TrainTestSplit};

use ndarray::{Array1, Array2, Axis};

use crate::errors::DataError;

/// A feature matrix and its row-aligned labels.
///
/// Rows are samples and columns are features; `targets[i]` labels `features.row(i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    targets: Array1<f64>,
}

impl Dataset {
    pub fn new(features: Array2<f64>, targets: Array1<f64>) -> Result<Self, DataError> {
        if features.nrows() != targets.len() {
            return Err(DataError::RowMismatch {
                features: features.nrows(),
                targets: targets.len(),
            });
        }
        Ok(Dataset { features, targets })
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn targets(&self) -> &Array1<f64> {
        &self.targets
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.features.nrows() == 0
    }

    /// Copies out the given rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(0), rows),
            targets: self.targets.select(Axis(0), rows),
        }
    }

    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>) {
        (self.features, self.targets)
    }
}

/// A trait for loading data from files into a [`Dataset`].
///
/// Implementors read a file from a given path and return a feature matrix of
/// shape `(n_rows, n_features)` with a target vector of length `n_rows`. The
/// trait is generic over an associated error type so each format can report
/// its own failures.
pub trait DataLoader {
    fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Dataset, Self::Error>;

    type Error: std::error::Error + 'static;
}

/// Loads data from a file using a specified `DataLoader` implementation.
///
/// # Type Parameters
/// - `T`: The type implementing `DataLoader`, determining the specific loading behavior
///   and error type.
/// - `P`: The path type, constrained to implement `AsRef<Path>`.
///
/// # Returns
/// The parsed [`Dataset`], or the loader's error.
pub fn load_data<T: DataLoader, P: AsRef<std::path::Path>>(path: P) -> Result<Dataset, T::Error> {
    T::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_dataset_rejects_row_mismatch() {
        let result = Dataset::new(array![[1.0], [2.0]], array![0.0]);
        assert!(matches!(result, Err(DataError::RowMismatch { features: 2, targets: 1 })));
    }

    #[test]
    fn test_dataset_select_keeps_rows_aligned() {
        let data =
            Dataset::new(array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]], array![0.0, 1.0, 2.0])
                .unwrap();
        let picked = data.select(&[2, 0]);
        assert_eq!(picked.features(), &array![[3.0, 30.0], [1.0, 10.0]]);
        assert_eq!(picked.targets(), &array![2.0, 0.0]);
        assert_eq!(picked.n_features(), 2);
        assert!(!picked.is_empty());
    }
}
