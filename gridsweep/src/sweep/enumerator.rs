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

use std::iter::FusedIterator;

use super::space::{Combination, HyperparameterSpace};

/// Lazy iterator over every [`Combination`] of a [`HyperparameterSpace`].
///
/// Obtained from [`HyperparameterSpace::combinations`], which validates the
/// space first. Order is lexicographic by parameter declaration order and
/// then by candidate order, so the last declared parameter varies fastest.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    space: &'a HyperparameterSpace,
    next: usize,
    total: usize,
}

impl<'a> Combinations<'a> {
    pub(crate) fn new(space: &'a HyperparameterSpace, total: usize) -> Self {
        Combinations { space, next: 0, total }
    }

    /// Total number of combinations, including those already yielded.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Iterator for Combinations<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let combination = self.space.combination_at(self.next)?;
        self.next += 1;
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n).min(self.total);
        self.next()
    }
}

impl ExactSizeIterator for Combinations<'_> {}

impl FusedIterator for Combinations<'_> {}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::errors::SweepError;
    use crate::sweep::space::ParamValue;

    fn knn_space() -> HyperparameterSpace {
        HyperparameterSpace::new()
            .with_param("n_neighbors", [1, 3, 5])
            .with_param("weights", ["uniform", "distance"])
    }

    fn as_pairs(space: &HyperparameterSpace) -> Vec<(i64, String)> {
        space
            .combinations()
            .unwrap()
            .map(|c| {
                (
                    c.get("n_neighbors").and_then(ParamValue::as_int).unwrap(),
                    c.get("weights").and_then(ParamValue::as_str).unwrap().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_enumerates_in_declaration_order() {
        let pairs = as_pairs(&knn_space());
        let expected: Vec<(i64, String)> = vec![
            (1, "uniform".to_string()),
            (1, "distance".to_string()),
            (3, "uniform".to_string()),
            (3, "distance".to_string()),
            (5, "uniform".to_string()),
            (5, "distance".to_string()),
        ];
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_enumeration_is_restartable_and_deterministic() {
        let space = knn_space();
        let first: Vec<Combination> = space.combinations().unwrap().collect();
        let second: Vec<Combination> = space.combinations().unwrap().collect();
        assert_eq!(first, second);
        assert!(first.iter().enumerate().all(|(i, c)| c.index() == i));
    }

    #[test]
    fn test_reports_exact_size() {
        let space = knn_space();
        let mut combinations = space.combinations().unwrap();
        assert_eq!(combinations.len(), 6);
        combinations.next();
        assert_eq!(combinations.len(), 5);
        assert_eq!(combinations.total(), 6);
        assert_eq!(combinations.nth(10), None);
        assert_eq!(combinations.len(), 0);
    }

    #[test]
    fn test_empty_parameter_fails_before_enumeration() {
        let space = knn_space().with_param("metric", Vec::<&str>::new());
        assert!(matches!(space.combinations(), Err(SweepError::InvalidSpace(_))));
    }

    #[test]
    fn test_single_candidate_parameters_yield_one_combination() {
        let space =
            HyperparameterSpace::new().with_param("n_neighbors", [7]).with_param("p", [2.0]);
        let all: Vec<Combination> = space.combinations().unwrap().collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].to_string(), "n_neighbors=7, p=2");
        assert_eq!(all.iter().map(|c| c.to_string()).collect::<HashSet<_>>().len(), 1);
    }
}

#[cfg(test)]
mod property_tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use crate::sweep::space::HyperparameterSpace;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_cross_product_is_complete_and_unique(sizes in prop::collection::vec(1usize..5, 1..5)) {
            let mut space = HyperparameterSpace::new();
            for (i, &size) in sizes.iter().enumerate() {
                space.add(&format!("p{}", i), (0..size as i64).collect::<Vec<_>>());
            }

            let expected: usize = sizes.iter().product();
            let rendered: Vec<String> =
                space.combinations().unwrap().map(|c| c.to_string()).collect();

            prop_assert_eq!(rendered.len(), expected);
            prop_assert_eq!(rendered.iter().collect::<HashSet<_>>().len(), expected);

            let again: Vec<String> =
                space.combinations().unwrap().map(|c| c.to_string()).collect();
            prop_assert_eq!(rendered, again);
        }
    }
}
