//! Recursive feature elimination with cross-validated size selection

use crate::error::{LoanfitError, Result};
use crate::pipeline::PipelineStage;
use crate::scoring::ProfitScorer;
use crate::training::linear_models::check_features;
use crate::training::{mean_std, take_rows, CVStrategy, CrossValidator, LogisticRegression, Model};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde_json::json;
use tracing::{debug, info};

pub const DEFAULT_CV: usize = 2;

/// RFE that drops one feature per round, the one with the smallest
/// `|coef|`, and keeps the subset size with the best mean fold score.
#[derive(Debug, Clone)]
pub struct Rfecv {
    estimator: LogisticRegression,
    cv: usize,
    scorer: ProfitScorer,
    min_features_to_select: usize,
    n_features_in: Option<usize>,
    support: Vec<usize>,
    /// 1 for kept features; larger values were eliminated earlier
    pub ranking: Vec<usize>,
    /// Mean fold score for `min_features_to_select + i` features
    pub cv_scores: Vec<f64>,
}

impl Rfecv {
    pub fn new(estimator: LogisticRegression, cv: usize, scorer: ProfitScorer) -> Self {
        Self {
            estimator,
            cv,
            scorer,
            min_features_to_select: 1,
            n_features_in: None,
            support: Vec::new(),
            ranking: Vec::new(),
            cv_scores: Vec::new(),
        }
    }

    pub fn cv(&self) -> usize {
        self.cv
    }

    pub fn n_features(&self) -> usize {
        self.support.len()
    }

    pub fn selected_features(&self) -> &[usize] {
        &self.support
    }

    /// Run elimination down to `stop_at` features, calling `on_step` with
    /// each evaluated subset and the model fitted on it.
    /// Returns the surviving subset and the removal order.
    fn eliminate<F>(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        stop_at: usize,
        mut on_step: F,
    ) -> Result<(Vec<usize>, Vec<usize>)>
    where
        F: FnMut(&[usize], &LogisticRegression) -> Result<()>,
    {
        let mut support: Vec<usize> = (0..x.ncols()).collect();
        let mut removed = Vec::new();

        loop {
            let mut model = self.estimator.clone();
            Model::fit(&mut model, &x.select(Axis(1), &support), y)?;
            on_step(&support, &model)?;
            if support.len() <= stop_at {
                break;
            }

            let importances = model.feature_importances().ok_or(LoanfitError::ModelNotFitted)?;
            let weakest = importances
                .iter()
                .enumerate()
                .fold((0, f64::INFINITY), |(best, min), (pos, &imp)| {
                    if imp < min { (pos, imp) } else { (best, min) }
                })
                .0;
            removed.push(support.remove(weakest));
        }
        Ok((support, removed))
    }
}

impl PipelineStage for Rfecv {
    fn name(&self) -> &'static str {
        "RFECV"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_features = x.ncols();
        let min_features = self.min_features_to_select;
        if n_features < min_features {
            return Err(LoanfitError::ValidationError(format!(
                "RFECV needs at least {} feature(s), got {}",
                min_features, n_features
            )));
        }

        let splits = CrossValidator::new(CVStrategy::StratifiedKFold { n_splits: self.cv })
            .split(x.nrows(), Some(y))?;

        // fold_scores[fold][k - min_features] for a subset of k features
        let fold_scores = splits
            .par_iter()
            .map(|split| {
                let (x_train, y_train) = take_rows(x, y, &split.train_indices);
                let (x_test, y_test) = take_rows(x, y, &split.test_indices);
                let mut scores = vec![0.0; n_features - min_features + 1];
                self.eliminate(&x_train, &y_train, min_features, |subset, model| {
                    let score = self.scorer.score_model(model, &x_test.select(Axis(1), subset), &y_test)?;
                    scores[subset.len() - min_features] = score;
                    Ok(())
                })?;
                Ok(scores)
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        self.cv_scores = (0..=n_features - min_features)
            .map(|i| {
                let column: Vec<f64> = fold_scores.iter().map(|s| s[i]).collect();
                mean_std(&column).0
            })
            .collect();

        // First maximum wins, so ties resolve to fewer features
        let best = self
            .cv_scores
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bs), (i, &s)| if s > bs { (i, s) } else { (bi, bs) })
            .0;
        let n_selected = best + min_features;

        let (support, removed) = self.eliminate(x, y, n_selected, |_, _| Ok(()))?;
        let mut ranking = vec![1; n_features];
        for (order, &feature) in removed.iter().enumerate() {
            ranking[feature] = removed.len() - order + 1;
        }

        info!(
            n_features_in = n_features,
            n_selected,
            cv = self.cv,
            "RFECV selected features"
        );
        debug!(cv_scores = ?self.cv_scores, "RFECV scores by subset size");

        self.support = support;
        self.ranking = ranking;
        self.n_features_in = Some(n_features);
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let n_in = self.n_features_in.ok_or(LoanfitError::ModelNotFitted)?;
        check_features(n_in, x)?;
        Ok(x.select(Axis(1), &self.support))
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "estimator": "LogisticRegression",
            "estimator_params": Model::params(&self.estimator),
            "step": 1,
            "cv": format!("StratifiedKFold(n_splits={})", self.cv),
            "scoring": "custom_prof_score",
            "min_features_to_select": self.min_features_to_select,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::ClassWeight;

    fn data() -> (Array2<f64>, Array1<f64>) {
        // Column 1 carries the label; columns 0 and 2 are uncorrelated noise
        let x = Array2::from_shape_fn((40, 3), |(i, j)| match j {
            1 => if i % 2 == 0 { 2.0 } else { -2.0 },
            0 => ((i * 3) % 7) as f64 / 7.0,
            _ => ((i * 5) % 11) as f64 / 11.0,
        });
        let y = x.column(1).mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
        (x, y)
    }

    #[test]
    fn test_keeps_signal_feature() {
        let (x, y) = data();
        let estimator = LogisticRegression::new().with_class_weight(ClassWeight::Balanced);
        let mut rfecv = Rfecv::new(estimator, 2, ProfitScorer::default());
        let out = rfecv.fit_transform(&x, &y).unwrap();

        assert!(rfecv.selected_features().contains(&1));
        assert_eq!(out.ncols(), rfecv.n_features());
        assert_eq!(rfecv.cv_scores.len(), 3);
        assert_eq!(rfecv.ranking[1], 1);
    }

    #[test]
    fn test_ranking_marks_elimination_order() {
        let (x, y) = data();
        let mut rfecv = Rfecv::new(LogisticRegression::new(), 2, ProfitScorer::default());
        rfecv.fit(&x, &y).unwrap();

        let kept = rfecv.ranking.iter().filter(|&&r| r == 1).count();
        assert_eq!(kept, rfecv.n_features());
        let mut ranks = rfecv.ranking.clone();
        ranks.sort_unstable();
        ranks.dedup();
        assert_eq!(ranks.len(), 3 - kept + 1);
    }

    #[test]
    fn test_transform_before_fit() {
        let rfecv = Rfecv::new(LogisticRegression::new(), 2, ProfitScorer::default());
        assert!(rfecv.transform(&Array2::zeros((1, 3))).is_err());
    }
}
