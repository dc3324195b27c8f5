//! Voting regressor: averages the predictions of named members

use super::models::Model;
use crate::error::{LoanfitError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde_json::json;
use tracing::debug;

/// Voting regressor ensemble
#[derive(Debug)]
pub struct VotingRegressor {
    estimators: Vec<(String, Box<dyn Model>)>,
    /// Weights for each member; uniform when absent
    weights: Option<Vec<f64>>,
    is_fitted: bool,
}

impl VotingRegressor {
    /// Create a voting regressor from named members
    pub fn new(estimators: Vec<(String, Box<dyn Model>)>) -> Self {
        Self {
            estimators,
            weights: None,
            is_fitted: false,
        }
    }

    /// Set member weights
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn estimator_names(&self) -> Vec<&str> {
        self.estimators.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Weighted mean of member predictions
    pub fn predict_from_predictions(&self, predictions: &[Array1<f64>]) -> Result<Array1<f64>> {
        if predictions.is_empty() {
            return Err(LoanfitError::ValidationError("No predictions provided".to_string()));
        }

        let n_models = predictions.len();
        let weights = match &self.weights {
            Some(w) if w.len() == n_models => w.clone(),
            Some(w) => {
                return Err(LoanfitError::ShapeError {
                    expected: format!("{} weights", n_models),
                    actual: format!("{} weights", w.len()),
                })
            }
            None => vec![1.0; n_models],
        };
        let weight_sum: f64 = weights.iter().sum();
        if weight_sum <= 0.0 {
            return Err(LoanfitError::invalid_param("weights", weight_sum, "must sum to a positive value"));
        }

        let mut result = Array1::<f64>::zeros(predictions[0].len());
        for (pred, &weight) in predictions.iter().zip(weights.iter()) {
            result.scaled_add(weight / weight_sum, pred);
        }
        Ok(result)
    }
}

impl Model for VotingRegressor {
    fn name(&self) -> &'static str {
        "VotingRegressor"
    }

    /// Members are independent, so they fit in parallel
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if self.estimators.is_empty() {
            return Err(LoanfitError::ValidationError("No estimators provided".to_string()));
        }
        self.estimators
            .par_iter_mut()
            .map(|(_, model)| model.fit(x, y))
            .collect::<Result<Vec<()>>>()?;

        debug!(members = self.estimators.len(), "VotingRegressor fitted");
        self.is_fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(LoanfitError::ModelNotFitted);
        }
        let predictions = self
            .estimators
            .iter()
            .map(|(_, model)| model.predict(x))
            .collect::<Result<Vec<_>>>()?;
        self.predict_from_predictions(&predictions)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        let all: Vec<Array1<f64>> = self
            .estimators
            .iter()
            .map(|(_, m)| m.feature_importances())
            .collect::<Option<Vec<_>>>()?;
        self.predict_from_predictions(&all).ok()
    }

    fn params(&self) -> serde_json::Value {
        let members: Vec<serde_json::Value> = self
            .estimators
            .iter()
            .map(|(name, model)| json!({ "name": name, "model": model.name(), "params": model.params() }))
            .collect();
        json!({ "estimators": members, "weights": self.weights })
    }
}
