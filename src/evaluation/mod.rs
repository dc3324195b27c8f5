//! Fit diagnostics and cross-validated profit for a configured pipeline

mod cross_validate;

pub use cross_validate::{cross_validate, CrossValidateReport, FoldResult};

use crate::data::{Dataset, HoldoutSplit};
use crate::error::Result;
use crate::pipeline::{build_pipeline, Pipeline, PipelineConfig, StepDescription};
use crate::scoring::{ClassificationReport, ProfitScorer, RegressionReport};
use polars::prelude::DataFrame;
use ndarray::Array1;
use serde::Serialize;
use tracing::info;

/// Training-set diagnostics, by model family
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Diagnostics {
    Classification(ClassificationReport),
    Regression(RegressionReport),
}

impl Diagnostics {
    /// Compare a fitted pipeline's predictions with the labels
    pub fn compute(pipeline: &Pipeline, df: &DataFrame, y: &Array1<f64>) -> Result<Self> {
        let predictions = pipeline.predict(df)?;
        Ok(if pipeline.is_classifier() {
            Diagnostics::Classification(ClassificationReport::compute(y, &predictions))
        } else {
            Diagnostics::Regression(RegressionReport::compute(y, &predictions))
        })
    }
}

/// Everything shown after one build: steps, train diagnostics, CV summary
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub config: PipelineConfig,
    pub steps: Vec<StepDescription>,
    pub diagnostics: Diagnostics,
    /// Profit of the fitted pipeline on the holdout test rows
    pub holdout_profit: f64,
    pub cross_validation: CrossValidateReport,
}

/// Build the pipeline, fit it on the train split, report train
/// diagnostics, then cross-validate on the full dataset.
pub fn run_session(
    config: &PipelineConfig,
    dataset: &Dataset,
    split: &HoldoutSplit,
    cv_folds: usize,
    scorer: &ProfitScorer,
) -> Result<SessionReport> {
    let mut pipeline = build_pipeline(config, scorer)?;
    let y_train = split.train.target();
    pipeline.fit(&split.train.features, &y_train)?;

    let diagnostics = Diagnostics::compute(&pipeline, &split.train.features, &y_train)?;
    let holdout_profit = scorer.score(&split.test.target(), &pipeline.predict(&split.test.features)?);
    info!(model = %config.model, holdout_profit, "Pipeline fitted on train split");

    let cross_validation = cross_validate(config, dataset, cv_folds, scorer)?;

    Ok(SessionReport {
        config: config.clone(),
        steps: pipeline.steps(),
        diagnostics,
        holdout_profit,
        cross_validation,
    })
}
