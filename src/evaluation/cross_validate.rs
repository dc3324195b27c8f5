//! Whole-pipeline cross-validation with timings

use crate::data::Dataset;
use crate::error::Result;
use crate::pipeline::{build_pipeline, PipelineConfig};
use crate::scoring::ProfitScorer;
use crate::training::{mean_std, CVStrategy, CrossValidator};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Scores and timings of one fold; times in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    pub fold: usize,
    pub test_score: f64,
    pub train_score: f64,
    pub fit_time: f64,
    pub score_time: f64,
}

/// Per-fold results of [`cross_validate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidateReport {
    pub strategy: CVStrategy,
    pub folds: Vec<FoldResult>,
}

impl CrossValidateReport {
    fn column(&self, f: impl Fn(&FoldResult) -> f64) -> Vec<f64> {
        self.folds.iter().map(f).collect()
    }

    pub fn test_scores(&self) -> Vec<f64> {
        self.column(|r| r.test_score)
    }

    pub fn mean_test_score(&self) -> f64 {
        mean_std(&self.test_scores()).0
    }

    /// Population standard deviation
    pub fn std_test_score(&self) -> f64 {
        mean_std(&self.test_scores()).1
    }

    pub fn mean_train_score(&self) -> f64 {
        mean_std(&self.column(|r| r.train_score)).0
    }

    pub fn std_fit_time(&self) -> f64 {
        mean_std(&self.column(|r| r.fit_time)).1
    }

    pub fn mean_score_time(&self) -> f64 {
        mean_std(&self.column(|r| r.score_time)).0
    }
}

/// Rebuild and refit the pipeline on every fold, scoring train and test
/// rows with the profit scorer. Classifiers use stratified folds.
pub fn cross_validate(
    config: &PipelineConfig,
    dataset: &Dataset,
    n_splits: usize,
    scorer: &ProfitScorer,
) -> Result<CrossValidateReport> {
    let strategy = CVStrategy::for_estimator(config.model.is_classifier(), n_splits);
    let target = dataset.target();
    let splits = CrossValidator::new(strategy).split(dataset.n_rows(), Some(&target))?;

    let mut folds = Vec::with_capacity(splits.len());
    for split in &splits {
        let train = dataset.take(&split.train_indices)?;
        let test = dataset.take(&split.test_indices)?;
        let y_train = train.target();
        let y_test = test.target();

        let mut pipeline = build_pipeline(config, scorer)?;
        let start = Instant::now();
        pipeline.fit(&train.features, &y_train)?;
        let fit_time = start.elapsed().as_secs_f64();

        let start = Instant::now();
        let test_score = scorer.score(&y_test, &pipeline.predict(&test.features)?);
        let score_time = start.elapsed().as_secs_f64();
        let train_score = scorer.score(&y_train, &pipeline.predict(&train.features)?);

        debug!(fold = split.fold_idx, test_score, train_score, fit_time, "Fold scored");
        folds.push(FoldResult {
            fold: split.fold_idx,
            test_score,
            train_score,
            fit_time,
            score_time,
        });
    }

    let report = CrossValidateReport { strategy, folds };
    info!(
        n_splits,
        mean_test_score = report.mean_test_score(),
        std_test_score = report.std_test_score(),
        "Cross-validation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(scores: &[f64]) -> CrossValidateReport {
        CrossValidateReport {
            strategy: CVStrategy::KFold { n_splits: scores.len() },
            folds: scores
                .iter()
                .enumerate()
                .map(|(fold, &s)| FoldResult {
                    fold,
                    test_score: s,
                    train_score: 2.0 * s,
                    fit_time: fold as f64,
                    score_time: 0.5,
                })
                .collect(),
        }
    }

    #[test]
    fn test_summary_statistics() {
        let r = report(&[1.0, 3.0]);
        assert_eq!(r.mean_test_score(), 2.0);
        assert_eq!(r.std_test_score(), 1.0);
        assert_eq!(r.mean_train_score(), 4.0);
        assert_eq!(r.std_fit_time(), 0.5);
        assert_eq!(r.mean_score_time(), 0.5);
    }
}
