//! Transformation stage interface

use crate::error::Result;
use ndarray::{Array1, Array2};
use std::fmt::Debug;

/// A fitted transformation between preprocessing and the model.
///
/// Stages receive the label so supervised selectors can use it; purely
/// unsupervised stages ignore it.
pub trait PipelineStage: Send + Sync + Debug {
    /// Estimator-style name shown in pipeline steps
    fn name(&self) -> &'static str;

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    fn fit_transform(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Array2<f64>> {
        self.fit(x, y)?;
        self.transform(x)
    }

    /// Construction parameters, stable across fits
    fn params(&self) -> serde_json::Value;
}
