//! Selection by the coefficients of a fitted sub-model

use crate::error::{LoanfitError, Result};
use crate::pipeline::PipelineStage;
use crate::training::linear_models::check_features;
use crate::training::Model;
use ndarray::{Array1, Array2, Axis};
use serde_json::json;
use tracing::debug;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Keep columns whose importance (`|coef|` for linear models) reaches the
/// threshold
#[derive(Debug)]
pub struct SelectFromModel {
    estimator: Box<dyn Model>,
    threshold: f64,
    n_features_in: Option<usize>,
    selected: Vec<usize>,
}

impl SelectFromModel {
    pub fn new(estimator: Box<dyn Model>, threshold: f64) -> Self {
        Self {
            estimator,
            threshold,
            n_features_in: None,
            selected: Vec::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn estimator(&self) -> &dyn Model {
        self.estimator.as_ref()
    }

    pub fn selected_features(&self) -> &[usize] {
        &self.selected
    }
}

impl PipelineStage for SelectFromModel {
    fn name(&self) -> &'static str {
        "SelectFromModel"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.estimator.fit(x, y)?;
        let importances = self.estimator.feature_importances().ok_or_else(|| {
            LoanfitError::InvalidFeatureSelection(format!(
                "{} exposes no coefficients to select on",
                self.estimator.name()
            ))
        })?;

        self.selected = importances
            .iter()
            .enumerate()
            .filter(|&(_, &imp)| imp >= self.threshold)
            .map(|(j, _)| j)
            .collect();
        if self.selected.is_empty() {
            return Err(LoanfitError::ValidationError(format!(
                "No feature reaches the importance threshold {} of {}",
                self.threshold,
                self.estimator.name()
            )));
        }

        debug!(
            estimator = self.estimator.name(),
            kept = self.selected.len(),
            total = x.ncols(),
            "SelectFromModel fitted"
        );
        self.n_features_in = Some(x.ncols());
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let n_in = self.n_features_in.ok_or(LoanfitError::ModelNotFitted)?;
        check_features(n_in, x)?;
        Ok(x.select(Axis(1), &self.selected))
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "estimator": self.estimator.name(),
            "estimator_params": self.estimator.params(),
            "threshold": self.threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{ClassWeight, LassoCV, LinearSVC, Penalty};

    fn signal_data() -> (Array2<f64>, Array1<f64>) {
        // Column 0 drives the target; column 1 is small noise
        let x = Array2::from_shape_fn((60, 2), |(i, j)| {
            if j == 0 {
                if i % 2 == 0 { 1.0 } else { -1.0 }
            } else {
                ((i * 7) % 5) as f64 * 0.01
            }
        });
        let y = x.column(0).mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
        (x, y)
    }

    #[test]
    fn test_lasso_cv_selector() {
        let (x, y) = signal_data();
        let mut selector = SelectFromModel::new(Box::new(LassoCV::default()), 0.1);
        let out = selector.fit_transform(&x, &y).unwrap();
        assert_eq!(selector.selected_features(), &[0]);
        assert_eq!(out.ncols(), 1);
    }

    #[test]
    fn test_l1_svc_selector() {
        let (x, y) = signal_data();
        let svc = LinearSVC::new()
            .with_penalty(Penalty::L1)
            .with_class_weight(ClassWeight::Balanced);
        let mut selector = SelectFromModel::new(Box::new(svc), DEFAULT_THRESHOLD);
        selector.fit(&x, &y).unwrap();
        assert_eq!(selector.selected_features(), &[0]);
    }

    #[test]
    fn test_nothing_selected() {
        let (x, y) = signal_data();
        let mut selector = SelectFromModel::new(Box::new(LassoCV::default()), 1e6);
        assert!(selector.fit(&x, &y).is_err());
    }
}
