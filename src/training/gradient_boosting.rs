//! Histogram gradient boosting regressor
//!
//! Least-squares boosting over [`HistogramTree`]s grown on pre-binned
//! features. Large inputs hold out a validation slice and stop once the
//! validation loss stalls.

use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::linear_models::check_rows;
use super::models::Model;
use super::tree::{BinMapper, HistogramTree};
use crate::error::{LoanfitError, Result};

/// When to hold out data for early stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarlyStopping {
    /// Enabled above [`HistGradientBoostingConfig::AUTO_EARLY_STOPPING_ROWS`] rows
    Auto,
    On,
    Off,
}

/// Histogram gradient boosting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistGradientBoostingConfig {
    /// Shrinkage applied to every tree
    pub learning_rate: f64,
    /// Maximum boosting iterations
    pub max_iter: usize,
    pub max_leaf_nodes: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub l2_regularization: f64,
    pub max_bins: usize,
    pub early_stopping: EarlyStopping,
    pub validation_fraction: f64,
    pub n_iter_no_change: usize,
    pub tol: f64,
    /// Seed for the early-stopping holdout
    pub random_state: u64,
}

impl Default for HistGradientBoostingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 100,
            max_leaf_nodes: 31,
            max_depth: None,
            min_samples_leaf: 20,
            l2_regularization: 0.0,
            max_bins: 255,
            early_stopping: EarlyStopping::Auto,
            validation_fraction: 0.1,
            n_iter_no_change: 10,
            tol: 1e-7,
            random_state: 0,
        }
    }
}

impl HistGradientBoostingConfig {
    pub const AUTO_EARLY_STOPPING_ROWS: usize = 10_000;

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_early_stopping(mut self, early_stopping: EarlyStopping) -> Self {
        self.early_stopping = early_stopping;
        self
    }
}

/// Histogram Gradient Boosting Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistGradientBoostingRegressor {
    config: HistGradientBoostingConfig,
    bin_mapper: Option<BinMapper>,
    trees: Vec<HistogramTree>,
    baseline: f64,
    feature_importances: Option<Array1<f64>>,
    /// Validation MSE per iteration when early stopping ran
    pub validation_loss: Vec<f64>,
}

impl Default for HistGradientBoostingRegressor {
    fn default() -> Self {
        Self::new(HistGradientBoostingConfig::default())
    }
}

impl HistGradientBoostingRegressor {
    pub fn new(config: HistGradientBoostingConfig) -> Self {
        Self {
            config,
            bin_mapper: None,
            trees: Vec::new(),
            baseline: 0.0,
            feature_importances: None,
            validation_loss: Vec::new(),
        }
    }

    pub fn config(&self) -> &HistGradientBoostingConfig {
        &self.config
    }

    pub fn n_iter(&self) -> usize {
        self.trees.len()
    }

    fn uses_early_stopping(&self, n_samples: usize) -> bool {
        match self.config.early_stopping {
            EarlyStopping::On => n_samples >= 2,
            EarlyStopping::Off => false,
            EarlyStopping::Auto => n_samples > HistGradientBoostingConfig::AUTO_EARLY_STOPPING_ROWS,
        }
    }

    /// Fit the boosting model
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_rows(x, y)?;
        if self.config.learning_rate <= 0.0 {
            return Err(LoanfitError::invalid_param(
                "learning_rate",
                self.config.learning_rate,
                "must be positive",
            ));
        }

        let n_samples = x.nrows();
        let (train_idx, val_idx) = if self.uses_early_stopping(n_samples) {
            let mut order: Vec<usize> = (0..n_samples).collect();
            order.shuffle(&mut Xoshiro256PlusPlus::seed_from_u64(self.config.random_state));
            let n_val = ((n_samples as f64 * self.config.validation_fraction).ceil() as usize)
                .clamp(1, n_samples - 1);
            let val = order.split_off(n_samples - n_val);
            (order, val)
        } else {
            ((0..n_samples).collect::<Vec<_>>(), Vec::new())
        };

        let x_train = x.select(Axis(0), &train_idx);
        let y_train = y.select(Axis(0), &train_idx);

        let mut mapper = BinMapper::new(self.config.max_bins);
        mapper.fit(&x_train);
        let n_bins: Vec<usize> = (0..mapper.n_features()).map(|j| mapper.n_bins(j)).collect();
        let binned = mapper.transform(&x_train)?;

        self.baseline = y_train.mean().unwrap_or(0.0);
        let mut raw = Array1::from_elem(y_train.len(), self.baseline);

        let mut validation = if val_idx.is_empty() {
            None
        } else {
            let x_val = mapper.transform(&x.select(Axis(0), &val_idx))?;
            let y_val = y.select(Axis(0), &val_idx);
            let raw_val = Array1::from_elem(y_val.len(), self.baseline);
            Some((x_val, y_val, raw_val))
        };

        self.trees.clear();
        self.validation_loss.clear();
        let mut importances = Array1::<f64>::zeros(x.ncols());

        for _ in 0..self.config.max_iter {
            let residuals = &y_train - &raw;
            let mut tree = HistogramTree::new()
                .with_max_leaf_nodes(self.config.max_leaf_nodes)
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf)
                .with_l2_regularization(self.config.l2_regularization);
            tree.fit(&binned, &n_bins, &residuals)?;

            raw.scaled_add(self.config.learning_rate, &tree.predict_binned(&binned)?);
            if let Some(tree_importance) = tree.feature_importances() {
                importances += tree_importance;
            }

            let stop = match validation.as_mut() {
                Some((x_val, y_val, raw_val)) => {
                    raw_val.scaled_add(self.config.learning_rate, &tree.predict_binned(x_val)?);
                    let loss = (&*y_val - &*raw_val).mapv(|v| v * v).mean().unwrap_or(0.0);
                    self.validation_loss.push(loss);
                    self.should_stop()
                }
                None => false,
            };

            let single_leaf = tree.n_leaves() <= 1;
            self.trees.push(tree);
            if stop || single_leaf {
                break;
            }
        }

        let total = importances.sum();
        if total > 0.0 {
            importances /= total;
        }

        debug!(
            learning_rate = self.config.learning_rate,
            n_iter = self.trees.len(),
            early_stopping = !self.validation_loss.is_empty(),
            "HistGradientBoostingRegressor fitted"
        );

        self.feature_importances = Some(importances);
        self.bin_mapper = Some(mapper);
        Ok(self)
    }

    /// Stop when none of the last `n_iter_no_change` losses beat the loss
    /// recorded just before them by more than `tol`.
    fn should_stop(&self) -> bool {
        let k = self.config.n_iter_no_change;
        let losses = &self.validation_loss;
        if losses.len() <= k {
            return false;
        }
        let reference = losses[losses.len() - k - 1];
        losses[losses.len() - k..]
            .iter()
            .all(|&loss| loss > reference - self.config.tol)
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let mapper = self.bin_mapper.as_ref().ok_or(LoanfitError::ModelNotFitted)?;
        let binned = mapper.transform(x)?;
        let mut predictions = Array1::from_elem(x.nrows(), self.baseline);
        for tree in &self.trees {
            predictions.scaled_add(self.config.learning_rate, &tree.predict_binned(&binned)?);
        }
        Ok(predictions)
    }
}

impl Model for HistGradientBoostingRegressor {
    fn name(&self) -> &'static str {
        "HistGradientBoostingRegressor"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        HistGradientBoostingRegressor::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        HistGradientBoostingRegressor::predict(self, x)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.feature_importances.clone()
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "learning_rate": self.config.learning_rate,
            "max_iter": self.config.max_iter,
            "max_leaf_nodes": self.config.max_leaf_nodes,
            "min_samples_leaf": self.config.min_samples_leaf,
            "max_bins": self.config.max_bins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_regression_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((200, 2), |(i, j)| {
            if j == 0 {
                i as f64 / 20.0
            } else {
                ((i * 13) % 17) as f64
            }
        });
        let y = x.column(0).mapv(|v| (v * 0.8).sin() + 0.5 * v);
        (x, y)
    }

    #[test]
    fn test_boosting_reduces_error() {
        let (x, y) = create_regression_data();
        let mut model = HistGradientBoostingRegressor::default();
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        let mse = (&pred - &y).mapv(|v| v * v).mean().unwrap();
        let var = y.var(0.0);
        assert!(mse < 0.1 * var, "mse {} vs var {}", mse, var);
    }

    #[test]
    fn test_importance_on_signal_feature() {
        let (x, y) = create_regression_data();
        let mut model = HistGradientBoostingRegressor::default();
        model.fit(&x, &y).unwrap();
        let imp = Model::feature_importances(&model).unwrap();
        assert!(imp[0] > imp[1]);
        assert!((imp.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_early_stopping_records_validation() {
        let (x, y) = create_regression_data();
        let config = HistGradientBoostingConfig::default()
            .with_early_stopping(EarlyStopping::On)
            .with_max_iter(500);
        let mut model = HistGradientBoostingRegressor::new(config);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.validation_loss.len(), model.n_iter());
        assert!(model.n_iter() <= 500);
    }

    #[test]
    fn test_predict_before_fit() {
        let model = HistGradientBoostingRegressor::default();
        let x = Array2::zeros((2, 2));
        assert!(matches!(model.predict(&x), Err(LoanfitError::ModelNotFitted)));
    }
}
