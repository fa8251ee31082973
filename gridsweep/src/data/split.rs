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

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::Dataset;
use crate::errors::SplitError;

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Row indices grouped by class label, classes in ascending label order.
fn indices_by_class(data: &Dataset) -> Vec<Vec<usize>> {
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in data.targets().iter().enumerate() {
        // labels are compared on their integer part; class labels are integral
        groups.entry(label as i64).or_default().push(i);
    }
    groups.into_values().collect()
}

fn complement(n: usize, excluded: &[usize]) -> Vec<usize> {
    let mut mask = vec![true; n];
    for &i in excluded {
        mask[i] = false;
    }
    (0..n).filter(|&i| mask[i]).collect()
}

/// Splits a dataset into disjoint training and held-out partitions.
///
/// With a fixed seed the partition is identical from run to run.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    test_ratio: f64,
    seed: Option<u64>,
    shuffle: bool,
    stratify: bool,
}

impl TrainTestSplit {
    pub fn new(test_ratio: f64) -> Self {
        TrainTestSplit { test_ratio, seed: None, shuffle: true, stratify: false }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Keep class proportions roughly equal in both partitions.
    pub fn stratify(mut self, stratify: bool) -> Self {
        self.stratify = stratify;
        self
    }

    /// Returns `(train, held_out)`.
    pub fn split(&self, data: &Dataset) -> Result<(Dataset, Dataset), SplitError> {
        let n = data.n_samples();
        if n == 0 {
            return Err(SplitError::EmptyInput);
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(SplitError::InvalidRatio(self.test_ratio));
        }
        if n < 2 {
            return Err(SplitError::InsufficientSamples { required: 2, actual: n });
        }

        let mut rng = rng_for(self.seed);
        let mut test: Vec<usize> = if self.stratify {
            let mut picked = Vec::new();
            for mut group in indices_by_class(data) {
                if self.shuffle {
                    group.shuffle(&mut rng);
                }
                let take = ((group.len() as f64 * self.test_ratio).round() as usize).min(group.len());
                picked.extend_from_slice(&group[..take]);
            }
            picked
        } else {
            let n_test = ((n as f64 * self.test_ratio).ceil() as usize).clamp(1, n - 1);
            let mut order: Vec<usize> = (0..n).collect();
            if self.shuffle {
                order.shuffle(&mut rng);
            }
            order.truncate(n_test);
            order
        };

        let mut train = complement(n, &test);
        if test.is_empty() || train.is_empty() {
            return Err(SplitError::InsufficientSamples { required: 2, actual: n });
        }
        if self.shuffle {
            train.shuffle(&mut rng);
            test.shuffle(&mut rng);
        } else {
            test.sort_unstable();
        }

        debug!("Split {} samples: train={}, held_out={}", n, train.len(), test.len());
        Ok((data.select(&train), data.select(&test)))
    }
}

/// K-fold cross-validation splitter.
///
/// Each sample lands in exactly one held-out fold. Without stratification the
/// folds are contiguous blocks of the (optionally shuffled) row order and the
/// first `n % k` folds get one extra sample. With stratification each class is
/// dealt round-robin across the folds.
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    seed: Option<u64>,
    stratified: bool,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        KFold { n_splits, seed: None, stratified: false }
    }

    /// Shuffle rows with the given seed before assigning folds.
    pub fn shuffle(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn stratified(mut self, stratified: bool) -> Self {
        self.stratified = stratified;
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Held-out row indices of every fold, each sorted ascending.
    pub fn fold_indices(&self, data: &Dataset) -> Result<Vec<Vec<usize>>, SplitError> {
        let n = data.n_samples();
        if self.n_splits < 2 {
            return Err(SplitError::InvalidFolds(self.n_splits));
        }
        if n == 0 {
            return Err(SplitError::EmptyInput);
        }
        if n < self.n_splits {
            return Err(SplitError::InsufficientSamples { required: self.n_splits, actual: n });
        }

        let mut rng = self.seed.map(StdRng::seed_from_u64);
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];

        if self.stratified {
            let mut next_fold = 0;
            for mut group in indices_by_class(data) {
                if let Some(rng) = rng.as_mut() {
                    group.shuffle(rng);
                }
                for i in group {
                    folds[next_fold].push(i);
                    next_fold = (next_fold + 1) % self.n_splits;
                }
            }
        } else {
            let mut order: Vec<usize> = (0..n).collect();
            if let Some(rng) = rng.as_mut() {
                order.shuffle(rng);
            }
            let base = n / self.n_splits;
            let extra = n % self.n_splits;
            let mut start = 0;
            for (f, fold) in folds.iter_mut().enumerate() {
                let size = base + usize::from(f < extra);
                fold.extend_from_slice(&order[start..start + size]);
                start += size;
            }
        }

        for fold in folds.iter_mut() {
            fold.sort_unstable();
        }
        Ok(folds)
    }

    /// Materializes `(train, held_out)` pairs, one per fold.
    pub fn split(&self, data: &Dataset) -> Result<Vec<(Dataset, Dataset)>, SplitError> {
        let folds = self.fold_indices(data)?;
        Ok(folds
            .iter()
            .map(|held_out| {
                let train = complement(data.n_samples(), held_out);
                (data.select(&train), data.select(held_out))
            })
            .collect())
    }
}
