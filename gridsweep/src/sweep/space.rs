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

use crate::errors::{ModelError, SweepError};

use super::enumerator::Combinations;

/// One candidate value for a hyperparameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Integers widen to floats; other variants have no numeric reading.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

/// Ordered set of named hyperparameters and their candidate values.
///
/// Declaration order is significant: it fixes the enumeration order of the
/// sweep, and with it which combination wins a tie.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HyperparameterSpace {
    params: Vec<(String, Vec<ParamValue>)>,
}

impl HyperparameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, consuming and returning the space.
    pub fn with_param<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.add(name, values);
        self
    }

    /// Adds a parameter in place. Duplicate names are kept and rejected by
    /// [`validate`](Self::validate).
    pub fn add<I, V>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.params.push((name.to_string(), values.into_iter().map(Into::into).collect()));
    }

    pub fn get(&self, name: &str) -> Option<&[ParamValue]> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, values)| values.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ParamValue])> {
        self.params.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Checks the space can be swept and returns the number of combinations.
    pub fn validate(&self) -> Result<usize, SweepError> {
        if self.params.is_empty() {
            return Err(SweepError::InvalidSpace("no parameters declared".to_string()));
        }

        let mut total: usize = 1;
        for (i, (name, values)) in self.params.iter().enumerate() {
            if values.is_empty() {
                return Err(SweepError::InvalidSpace(format!(
                    "parameter '{}' has no candidate values",
                    name
                )));
            }
            if self.params[..i].iter().any(|(other, _)| other == name) {
                return Err(SweepError::InvalidSpace(format!(
                    "parameter '{}' is declared more than once",
                    name
                )));
            }
            total = total.checked_mul(values.len()).ok_or_else(|| {
                SweepError::InvalidSpace("number of combinations overflows usize".to_string())
            })?;
        }

        Ok(total)
    }

    /// Lazily enumerates the full cross product, last parameter varying fastest.
    ///
    /// Each call starts a fresh enumeration.
    pub fn combinations(&self) -> Result<Combinations<'_>, SweepError> {
        let total = self.validate()?;
        Ok(Combinations::new(self, total))
    }

    /// Decodes the combination at `index` in enumeration order.
    ///
    /// Returns `None` when `index` is past the end. Assumes a validated space.
    pub fn combination_at(&self, index: usize) -> Option<Combination> {
        let total = self.params.iter().try_fold(1usize, |acc, (_, v)| acc.checked_mul(v.len()))?;
        if index >= total {
            return None;
        }

        let mut values = Vec::with_capacity(self.params.len());
        let mut remainder = index;
        for (name, candidates) in self.params.iter().rev() {
            let radix = candidates.len();
            values.push((name.clone(), candidates[remainder % radix].clone()));
            remainder /= radix;
        }
        values.reverse();

        Some(Combination { index, values })
    }
}

/// One full assignment of values to every parameter of a space.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    index: usize,
    values: Vec<(String, ParamValue)>,
}

impl Combination {
    /// Position of this combination in enumeration order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, value)| value)
    }

    /// Like [`get`](Self::get), but a missing parameter is a model construction error.
    pub fn require(&self, name: &str) -> Result<&ParamValue, ModelError> {
        self.get(name).ok_or_else(|| ModelError::MissingParameter(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knn_space() -> HyperparameterSpace {
        HyperparameterSpace::new()
            .with_param("n_neighbors", [1, 3, 5])
            .with_param("weights", ["uniform", "distance"])
    }

    #[test]
    fn test_validate_counts_combinations() {
        assert_eq!(knn_space().validate().unwrap(), 6);
    }

    #[test]
    fn test_validate_rejects_empty_candidates() {
        let space = knn_space().with_param("metric", Vec::<&str>::new());
        let result = space.validate();
        assert!(
            matches!(&result, Err(SweepError::InvalidSpace(msg)) if msg.contains("metric")),
            "Unexpected result: {:?}",
            result
        );
    }

    #[test]
    fn test_validate_rejects_no_parameters() {
        assert!(matches!(HyperparameterSpace::new().validate(), Err(SweepError::InvalidSpace(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let space = knn_space().with_param("weights", ["uniform"]);
        assert!(matches!(space.validate(), Err(SweepError::InvalidSpace(msg)) if msg.contains("more than once")));
    }

    #[test]
    fn test_combination_at_decodes_mixed_radix() {
        let space = knn_space();
        let c = space.combination_at(3).unwrap();
        assert_eq!(c.index(), 3);
        assert_eq!(c.get("n_neighbors"), Some(&ParamValue::Int(3)));
        assert_eq!(c.get("weights"), Some(&ParamValue::Str("distance".to_string())));
        assert!(space.combination_at(6).is_none());
    }

    #[test]
    fn test_combination_display_and_require() {
        let c = knn_space().combination_at(0).unwrap();
        assert_eq!(c.to_string(), "n_neighbors=1, weights=uniform");
        assert!(matches!(c.require("metric"), Err(ModelError::MissingParameter(name)) if name == "metric"));
    }

    #[test]
    fn test_param_value_accessors() {
        assert_eq!(ParamValue::from(3).as_float(), Some(3.0));
        assert_eq!(ParamValue::from(2.5).as_int(), None);
        assert_eq!(ParamValue::from("manhattan").as_str(), Some("manhattan"));
        assert_eq!(ParamValue::from(true).as_bool(), Some(true));
    }
}
