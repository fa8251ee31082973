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

use ndarray::{Array1, Array2, Axis};

use crate::errors::ScalerError;

/// Standardizes features to zero mean and unit variance, column by column.
///
/// Constant columns keep a standard deviation of 1 so they are centred but
/// not divided by zero.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        StandardScaler { mean: None, std: None }
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.std.is_some()
    }

    pub fn fit(&mut self, x: &Array2<f64>) -> Result<(), ScalerError> {
        if x.ncols() == 0 {
            return Err(ScalerError::NoFeatures);
        }
        let mean = x.mean_axis(Axis(0)).ok_or(ScalerError::EmptyInput)?;
        let std = x.std_axis(Axis(0), 0.0);
        self.mean = Some(mean);
        self.std = Some(std.mapv(|s| if s == 0.0 { 1.0 } else { s }));
        Ok(())
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        let (mean, std) = self.parameters()?;
        if x.ncols() != mean.len() {
            return Err(ScalerError::DimensionMismatch { expected: mean.len(), actual: x.ncols() });
        }
        Ok((x - mean) / std)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ScalerError> {
        let (mean, std) = self.parameters()?;
        if x.ncols() != mean.len() {
            return Err(ScalerError::DimensionMismatch { expected: mean.len(), actual: x.ncols() });
        }
        Ok(x * std + mean)
    }

    fn parameters(&self) -> Result<(&Array1<f64>, &Array1<f64>), ScalerError> {
        match (self.mean.as_ref(), self.std.as_ref()) {
            (Some(mean), Some(std)) => Ok((mean, std)),
            _ => Err(ScalerError::NotFitted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, array};

    #[test]
    fn test_standard_scaler_fit_transform() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let mut scaler = StandardScaler::new();
        let x_scaled = scaler.fit_transform(&x).unwrap();

        let mean = x_scaled.mean_axis(Axis(0)).unwrap();
        let std = x_scaled.std_axis(Axis(0), 0.0);
        for &m in mean.iter() {
            assert!(m.abs() < 1e-10, "Mean should be ~0, got {}", m);
        }
        for &s in std.iter() {
            assert!((s - 1.0).abs() < 1e-10, "Std should be ~1, got {}", s);
        }
    }

    #[test]
    fn test_standard_scaler_inverse_transform() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let mut scaler = StandardScaler::new();
        let x_scaled = scaler.fit_transform(&x).unwrap();
        let x_restored = scaler.inverse_transform(&x_scaled).unwrap();

        for (orig, restored) in x.iter().zip(x_restored.iter()) {
            assert!((orig - restored).abs() < 1e-10, "Restored value differs");
        }
    }

    #[test]
    fn test_standard_scaler_zero_variance() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0]).unwrap();
        let mut scaler = StandardScaler::new();
        let x_scaled = scaler.fit_transform(&x).unwrap();

        assert_eq!(x_scaled.column(0), Array1::from_vec(vec![0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_standard_scaler_not_fitted() {
        let scaler = StandardScaler::new();
        let result = scaler.transform(&array![[1.0, 2.0]]);
        assert!(matches!(result, Err(ScalerError::NotFitted)));
    }

    #[test]
    fn test_standard_scaler_empty_input() {
        let mut scaler = StandardScaler::new();
        let x: Array2<f64> = Array2::zeros((0, 2));
        assert!(matches!(scaler.fit(&x), Err(ScalerError::EmptyInput)));
    }

    #[test]
    fn test_standard_scaler_dimension_mismatch() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let result = scaler.transform(&array![[1.0, 2.0, 3.0]]);
        assert!(matches!(result, Err(ScalerError::DimensionMismatch { expected: 2, actual: 3 })));
    }
}
