//! Feature scaling implementations

use crate::error::{LoanfitError, Result};
use crate::training::linear_models::check_features;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// Max absolute scaling: x / max(|x|)
    MaxAbs,
}

impl ScalerType {
    pub fn name(&self) -> &'static str {
        match self {
            ScalerType::Standard => "StandardScaler",
            ScalerType::MinMax => "MinMaxScaler",
            ScalerType::MaxAbs => "MaxAbsScaler",
        }
    }
}

/// Column-wise scaler over a dense matrix.
///
/// Every column is mapped to `(x - center) / scale`. A constant column
/// gets scale 1 so it is shifted but never divided by zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    center: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            center: None,
            scale: None,
        }
    }

    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(LoanfitError::DataError("Cannot fit scaler on empty data".to_string()));
        }

        let (center, scale) = match self.scaler_type {
            ScalerType::Standard => {
                let mean = x.mean_axis(Axis(0)).ok_or_else(|| {
                    LoanfitError::ComputationError("Failed to compute column means".to_string())
                })?;
                // Population standard deviation
                let std = x.std_axis(Axis(0), 0.0);
                (mean, std)
            }
            ScalerType::MinMax => {
                let min = x.fold_axis(Axis(0), f64::INFINITY, |m, &v| m.min(v));
                let max = x.fold_axis(Axis(0), f64::NEG_INFINITY, |m, &v| m.max(v));
                let range = &max - &min;
                (min, range)
            }
            ScalerType::MaxAbs => {
                let max_abs = x.fold_axis(Axis(0), 0.0f64, |m, &v| m.max(v.abs()));
                (Array1::zeros(x.ncols()), max_abs)
            }
        };

        self.scale = Some(scale.mapv(|s| if s.abs() < 1e-12 || !s.is_finite() { 1.0 } else { s }));
        self.center = Some(center);
        Ok(self)
    }

    /// Transform the data
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match (&self.center, &self.scale) {
            (Some(center), Some(scale)) => {
                check_features(center.len(), x)?;
                Ok((x - center) / scale)
            }
            _ => Err(LoanfitError::ModelNotFitted),
        }
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        match (&self.center, &self.scale) {
            (Some(center), Some(scale)) => {
                check_features(center.len(), x)?;
                Ok(x * scale + center)
            }
            _ => Err(LoanfitError::ModelNotFitted),
        }
    }
}
