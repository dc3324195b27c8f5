//! Profit-based score for loan approval decisions
//!
//! A loan predicted negative (not charged off) is approved. Approved safe
//! loans earn `roa`; approved loans that default lose `haircut`. Loans
//! predicted positive are declined and contribute nothing.

use crate::error::Result;
use crate::training::Model;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Default return on a correctly approved loan
pub const DEFAULT_ROA: f64 = 0.02;
/// Default loss on an approved loan that defaults
pub const DEFAULT_HAIRCUT: f64 = 0.20;

/// `TN * roa - FN * haircut` over paired labels
pub fn custom_prof_score(y: &[bool], y_pred: &[bool], roa: f64, haircut: f64) -> f64 {
    let (tn, fn_) = y
        .iter()
        .zip(y_pred.iter())
        .filter(|&(_, &pred)| !pred)
        .fold((0usize, 0usize), |(tn, fn_), (&actual, _)| {
            if actual {
                (tn, fn_ + 1)
            } else {
                (tn + 1, fn_)
            }
        });

    tn as f64 * roa - fn_ as f64 * haircut
}

/// Scorer wrapping [`custom_prof_score`] with fixed parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitScorer {
    pub roa: f64,
    pub haircut: f64,
}

impl Default for ProfitScorer {
    fn default() -> Self {
        Self {
            roa: DEFAULT_ROA,
            haircut: DEFAULT_HAIRCUT,
        }
    }
}

impl ProfitScorer {
    pub fn new(roa: f64, haircut: f64) -> Self {
        Self { roa, haircut }
    }

    /// Score numeric predictions.
    ///
    /// A prediction is negative only when it is exactly `0.0`. Classifier
    /// outputs are 0/1; continuous regressor outputs are almost never
    /// exactly zero and therefore count as declined.
    pub fn score(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let actual: Vec<bool> = y_true.iter().map(|&v| v != 0.0).collect();
        let predicted: Vec<bool> = y_pred.iter().map(|&v| v != 0.0).collect();
        custom_prof_score(&actual, &predicted, self.roa, self.haircut)
    }

    /// Predict with a fitted model and score the result
    pub fn score_model(&self, model: &dyn Model, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = model.predict(x)?;
        Ok(self.score(y, &y_pred))
    }
}
