//! Greedy forward feature selection

use crate::error::{LoanfitError, Result};
use crate::pipeline::PipelineStage;
use crate::scoring::ProfitScorer;
use crate::training::linear_models::check_features;
use crate::training::{cross_val_score, CVStrategy, LogisticRegression, Model};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde_json::json;
use tracing::debug;

pub const DEFAULT_N_FEATURES: usize = 5;
pub const DEFAULT_CV: usize = 2;

/// Forward sequential selection: starting from no features, repeatedly add
/// the one whose inclusion gives the best mean cross-validated score.
#[derive(Debug, Clone)]
pub struct SequentialFeatureSelector {
    estimator: LogisticRegression,
    n_features_to_select: usize,
    cv: usize,
    scorer: ProfitScorer,
    n_features_in: Option<usize>,
    selected: Vec<usize>,
}

impl SequentialFeatureSelector {
    pub fn new(
        estimator: LogisticRegression,
        n_features_to_select: usize,
        cv: usize,
        scorer: ProfitScorer,
    ) -> Self {
        Self {
            estimator,
            n_features_to_select,
            cv,
            scorer,
            n_features_in: None,
            selected: Vec::new(),
        }
    }

    /// Selected columns in the order they were added
    pub fn selected_features(&self) -> &[usize] {
        &self.selected
    }

    fn candidate_score(&self, x: &Array2<f64>, y: &Array1<f64>, subset: &[usize]) -> Result<f64> {
        let estimator = &self.estimator;
        let results = cross_val_score(
            || Box::new(estimator.clone()) as Box<dyn Model>,
            &x.select(Axis(1), subset),
            y,
            CVStrategy::StratifiedKFold { n_splits: self.cv },
            &self.scorer,
        )?;
        Ok(results.mean_score)
    }
}

impl PipelineStage for SequentialFeatureSelector {
    fn name(&self) -> &'static str {
        "SequentialFeatureSelector"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_features = x.ncols();
        if self.n_features_to_select == 0 || self.n_features_to_select >= n_features {
            return Err(LoanfitError::invalid_param(
                "n_features_to_select",
                self.n_features_to_select,
                &format!("must be positive and less than the number of features ({})", n_features),
            ));
        }

        let mut selected: Vec<usize> = Vec::with_capacity(self.n_features_to_select);
        while selected.len() < self.n_features_to_select {
            let candidates: Vec<usize> = (0..n_features).filter(|j| !selected.contains(j)).collect();
            let scores = candidates
                .par_iter()
                .map(|&j| {
                    let mut subset = selected.clone();
                    subset.push(j);
                    self.candidate_score(x, y, &subset)
                })
                .collect::<Result<Vec<f64>>>()?;

            // Lowest index wins ties
            let (best, score) = candidates
                .iter()
                .zip(scores)
                .fold((candidates[0], f64::NEG_INFINITY), |(bj, bs), (&j, s)| {
                    if s > bs { (j, s) } else { (bj, bs) }
                });
            debug!(feature = best, score, round = selected.len() + 1, "Forward selection step");
            selected.push(best);
        }

        self.selected = selected;
        self.n_features_in = Some(n_features);
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let n_in = self.n_features_in.ok_or(LoanfitError::ModelNotFitted)?;
        check_features(n_in, x)?;
        let mut columns = self.selected.clone();
        columns.sort_unstable();
        Ok(x.select(Axis(1), &columns))
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "estimator": "LogisticRegression",
            "n_features_to_select": self.n_features_to_select,
            "direction": "forward",
            "cv": self.cv,
            "scoring": "custom_prof_score",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 4), |(i, j)| match j {
            2 => if i % 2 == 0 { 1.5 } else { -1.5 },
            _ => ((i * (j + 3)) % 7) as f64 / 7.0,
        });
        let y = x.column(2).mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
        (x, y)
    }

    #[test]
    fn test_picks_signal_first() {
        let (x, y) = data();
        let mut sfs = SequentialFeatureSelector::new(LogisticRegression::new(), 2, 2, ProfitScorer::default());
        let out = sfs.fit_transform(&x, &y).unwrap();

        assert_eq!(sfs.selected_features()[0], 2);
        assert_eq!(sfs.selected_features().len(), 2);
        assert_eq!(out.ncols(), 2);
    }

    #[test]
    fn test_rejects_selecting_all_features() {
        let (x, y) = data();
        let mut sfs = SequentialFeatureSelector::new(LogisticRegression::new(), 4, 2, ProfitScorer::default());
        assert!(sfs.fit(&x, &y).is_err());
    }
}
