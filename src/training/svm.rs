//! Linear support vector classifier
//!
//! Primal squared-hinge objective solved by (proximal) gradient descent:
//! `penalty(w) / C + Σ sᵢ · max(0, 1 - yᵢ f(xᵢ))²`, labels mapped to ±1
//! and `sᵢ` the class-based sample weight.

use super::linear_models::{check_features, check_rows, LassoRegression};
use super::models::{ClassWeight, Model};
use super::spectral_norm_sq;
use crate::error::{LoanfitError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Coefficient penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Penalty {
    /// Sparse coefficients
    L1,
    /// Squared norm
    L2,
}

impl std::fmt::Display for Penalty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Penalty::L1 => write!(f, "l1"),
            Penalty::L2 => write!(f, "l2"),
        }
    }
}

/// Linear SVM classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSVC {
    pub penalty: Penalty,
    /// Inverse regularization strength
    pub c: f64,
    pub class_weight: ClassWeight,
    pub max_iter: usize,
    pub tol: f64,
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
    is_fitted: bool,
}

impl Default for LinearSVC {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSVC {
    pub fn new() -> Self {
        Self {
            penalty: Penalty::L2,
            c: 1.0,
            class_weight: ClassWeight::Uniform,
            max_iter: 1000,
            tol: 1e-4,
            coefficients: None,
            intercept: 0.0,
            is_fitted: false,
        }
    }

    pub fn with_penalty(mut self, penalty: Penalty) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_rows(x, y)?;
        if self.c <= 0.0 {
            return Err(LoanfitError::invalid_param("C", self.c, "must be positive"));
        }

        let n = x.nrows() as f64;
        let signs = y.mapv(|v| if v > 0.5 { 1.0 } else { -1.0 });
        let sw = self.class_weight.sample_weights(y);
        let max_w = sw.iter().copied().fold(0.0f64, f64::max);

        // Objective scaled by 1 / (C n)
        let reg = 1.0 / (self.c * n);
        let lipschitz = 2.0 * max_w * (spectral_norm_sq(x) + n) / n
            + if self.penalty == Penalty::L2 { reg } else { 0.0 };
        let step = 1.0 / lipschitz;

        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            iterations = iter + 1;
            let margins = (x.dot(&w) + b) * &signs;
            // d/df of the squared hinge, times the label sign and weight
            let slack = margins.mapv(|m| (1.0 - m).max(0.0));
            let coef = -2.0 * &slack * &signs * &sw / n;

            let mut dw = x.t().dot(&coef);
            if self.penalty == Penalty::L2 {
                dw.scaled_add(reg, &w);
            }
            let db = coef.sum();

            let w_old = w.clone();
            w.scaled_add(-step, &dw);
            if self.penalty == Penalty::L1 {
                w.mapv_inplace(|v| LassoRegression::soft_threshold(v, step * reg));
            }
            b -= step * db;

            let change = (&w - &w_old).mapv(f64::abs).fold(0.0f64, |m, &v| m.max(v));
            if change.max((step * db).abs()) < self.tol * step {
                break;
            }
        }

        debug!(iterations, penalty = %self.penalty, "LinearSVC fitted");
        self.coefficients = Some(w);
        self.intercept = b;
        self.is_fitted = true;
        Ok(self)
    }

    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match &self.coefficients {
            Some(coef) if self.is_fitted => {
                check_features(coef.len(), x)?;
                Ok(x.dot(coef) + self.intercept)
            }
            _ => Err(LoanfitError::ModelNotFitted),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .decision_function(x)?
            .mapv(|d| if d > 0.0 { 1.0 } else { 0.0 }))
    }
}

impl Model for LinearSVC {
    fn name(&self) -> &'static str {
        "LinearSVC"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        LinearSVC::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        LinearSVC::predict(self, x)
    }

    fn is_classifier(&self) -> bool {
        true
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.coefficients.as_ref().map(|c| c.mapv(f64::abs))
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "penalty": self.penalty.to_string(),
            "loss": "squared_hinge",
            "C": self.c,
            "class_weight": self.class_weight.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn create_linear_separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [-2.0, 0.1],
            [-1.8, -0.2],
            [-1.2, 0.3],
            [-0.9, -0.1],
            [0.9, 0.2],
            [1.1, -0.3],
            [1.6, 0.1],
            [2.1, 0.0]
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_linear_svc_separates() {
        let (x, y) = create_linear_separable_data();
        let mut model = LinearSVC::new().with_class_weight(ClassWeight::Balanced);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_l1_penalty_sparsifies() {
        let (x, y) = create_linear_separable_data();
        let mut model = LinearSVC::new().with_penalty(Penalty::L1).with_c(0.1);
        model.fit(&x, &y).unwrap();
        let coef = model.coefficients.as_ref().unwrap();
        assert!(coef[0].abs() > 0.0);
        assert_eq!(coef[1], 0.0);
    }

    #[test]
    fn test_unfitted() {
        let model = LinearSVC::new();
        assert!(model.decision_function(&array![[0.0, 0.0]]).is_err());
    }
}
