//! Estimator trait shared by every model in a pipeline

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Trait for estimators placed at the end of a pipeline
pub trait Model: Send + Sync + std::fmt::Debug {
    /// Display name, e.g. `LogisticRegression`
    fn name(&self) -> &'static str;

    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions. Classifiers return 0/1.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Whether predictions are class labels
    fn is_classifier(&self) -> bool {
        false
    }

    /// Per-feature importance used by model-based selectors
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }

    /// Constructor parameters, for display and structural comparison
    fn params(&self) -> serde_json::Value;
}

/// Per-class sample weighting for linear classifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Inverse class frequency
    #[default]
    Balanced,
    /// Every sample weighs 1
    Uniform,
}

impl ClassWeight {
    pub fn sample_weights(&self, y: &Array1<f64>) -> Array1<f64> {
        match self {
            ClassWeight::Balanced => balanced_sample_weights(y),
            ClassWeight::Uniform => Array1::ones(y.len()),
        }
    }
}

impl std::fmt::Display for ClassWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassWeight::Balanced => write!(f, "balanced"),
            ClassWeight::Uniform => write!(f, "None"),
        }
    }
}

/// Balanced class weights: `n / (2 * n_class)` for each sample
pub fn balanced_sample_weights(y: &Array1<f64>) -> Array1<f64> {
    let n = y.len() as f64;
    let n_pos = y.iter().filter(|&&v| v > 0.5).count() as f64;
    let n_neg = n - n_pos;
    let w_pos = if n_pos > 0.0 { n / (2.0 * n_pos) } else { 1.0 };
    let w_neg = if n_neg > 0.0 { n / (2.0 * n_neg) } else { 1.0 };
    y.mapv(|v| if v > 0.5 { w_pos } else { w_neg })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_balanced_weights() {
        let y = array![1.0, 0.0, 0.0, 0.0];
        let w = balanced_sample_weights(&y);
        assert!((w[0] - 2.0).abs() < 1e-12);
        assert!((w[1] - 4.0 / 6.0).abs() < 1e-12);
        // Each class carries half of the total weight
        let pos: f64 = w[0];
        let neg: f64 = w[1] + w[2] + w[3];
        assert!((pos - neg).abs() < 1e-12);
    }
}
