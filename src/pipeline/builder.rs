//! Maps a [`PipelineConfig`] to an unfitted [`Pipeline`]

use super::model_pipeline::Pipeline;
use super::options::{FeatureCreation, FeatureSelection, ModelChoice, PipelineConfig, SelectorModel};
use super::stage::PipelineStage;
use crate::error::Result;
use crate::feature_engineering::PolynomialFeatures;
use crate::feature_selection::{Rfecv, SelectFromModel, SelectKBest, SequentialFeatureSelector, TruncatedSvd};
use crate::preprocessing::{ColumnTransformer, Scaler, ScalerType};
use crate::scoring::ProfitScorer;
use crate::training::{
    linspace, ClassWeight, HistGradientBoostingConfig, HistGradientBoostingRegressor, LassoCV, LassoRegression,
    LinearSVC, LogisticRegression, Model, Penalty, RidgeCV, RidgeRegression, VotingRegressor,
};
use tracing::info;

/// Members of the learning-rate voting ensemble
pub const LEARNING_RATE_MEMBERS: usize = 10;
/// Lasso alpha when no grid is given
pub const DEFAULT_LASSO_ALPHA: f64 = 0.3;
/// Ridge alpha when no grid is given
pub const DEFAULT_RIDGE_ALPHA: f64 = 1.0;

/// Build the pipeline for `config`. The scorer drives selectors that
/// cross-validate.
pub fn build_pipeline(config: &PipelineConfig, scorer: &ProfitScorer) -> Result<Pipeline> {
    config.validate()?;

    let model = build_model(&config.model);
    let feature_create = build_creation(&config.feature_creation);
    let feature_select = build_selection(&config.feature_selection, scorer);
    let preprocessor = ColumnTransformer::new(
        config.numeric_features.clone(),
        config.categorical_features.clone(),
    );

    info!(
        model = %config.model,
        estimator = model.name(),
        numeric = config.numeric_features.len(),
        categorical = config.categorical_features.len(),
        feature_create = feature_create.as_ref().map_or("passthrough", |s| s.name()),
        feature_select = feature_select.as_ref().map_or("passthrough", |s| s.name()),
        "Pipeline built"
    );

    Ok(Pipeline::new(preprocessor, feature_create, feature_select, model, config.model))
}

/// Estimator for a model choice
pub fn build_model(choice: &ModelChoice) -> Box<dyn Model> {
    match *choice {
        ModelChoice::LogisticRegression { .. } => {
            Box::new(LogisticRegression::new().with_class_weight(ClassWeight::Balanced))
        }
        ModelChoice::HistGradientBoosting { lr_range: None } => Box::new(HistGradientBoostingRegressor::default()),
        ModelChoice::HistGradientBoosting { lr_range: Some((min, max)) } => {
            let members = linspace(min, max, LEARNING_RATE_MEMBERS)
                .into_iter()
                .map(|lr| {
                    let config = HistGradientBoostingConfig::default().with_learning_rate(lr);
                    (lr.to_string(), Box::new(HistGradientBoostingRegressor::new(config)) as Box<dyn Model>)
                })
                .collect();
            Box::new(VotingRegressor::new(members))
        }
        ModelChoice::Lasso { alpha_range: None } => Box::new(LassoRegression::new(DEFAULT_LASSO_ALPHA)),
        ModelChoice::Lasso { alpha_range: Some(r) } => Box::new(LassoCV::new(linspace(r.min, r.max, r.points))),
        ModelChoice::Ridge { alpha_range: None } => Box::new(RidgeRegression::new(DEFAULT_RIDGE_ALPHA)),
        ModelChoice::Ridge { alpha_range: Some(r) } => Box::new(RidgeCV::new(linspace(r.min, r.max, r.points))),
        ModelChoice::LinearSvc { .. } => Box::new(
            LinearSVC::new()
                .with_penalty(Penalty::L2)
                .with_class_weight(ClassWeight::Balanced),
        ),
    }
}

fn build_creation(creation: &FeatureCreation) -> Option<Box<dyn PipelineStage>> {
    match *creation {
        FeatureCreation::Passthrough => None,
        FeatureCreation::Polynomial { degree, interaction_only } => Some(Box::new(
            PolynomialFeatures::new(degree).with_interaction_only(interaction_only),
        )),
        FeatureCreation::MinMaxScaler => Some(Box::new(Scaler::new(ScalerType::MinMax))),
        FeatureCreation::MaxAbsScaler => Some(Box::new(Scaler::new(ScalerType::MaxAbs))),
    }
}

fn build_selection(selection: &FeatureSelection, scorer: &ProfitScorer) -> Option<Box<dyn PipelineStage>> {
    match *selection {
        FeatureSelection::Passthrough => None,
        FeatureSelection::Pca { n_components } => Some(Box::new(TruncatedSvd::new(n_components))),
        FeatureSelection::SelectKBest { k } => Some(Box::new(SelectKBest::new(k))),
        FeatureSelection::SelectFromModel { estimator, threshold } => {
            let inner: Box<dyn Model> = match estimator {
                SelectorModel::LassoCv => Box::new(LassoCV::default()),
                SelectorModel::LinearSvcL1 { class_weight } => Box::new(
                    LinearSVC::new()
                        .with_penalty(Penalty::L1)
                        .with_class_weight(class_weight),
                ),
            };
            Some(Box::new(SelectFromModel::new(inner, threshold)))
        }
        FeatureSelection::Rfecv { cv, class_weight } => Some(Box::new(Rfecv::new(
            LogisticRegression::new().with_class_weight(class_weight),
            cv,
            *scorer,
        ))),
        FeatureSelection::Sequential {
            n_features,
            cv,
            class_weight,
        } => Some(Box::new(SequentialFeatureSelector::new(
            LogisticRegression::new().with_class_weight(class_weight),
            n_features,
            cv,
            *scorer,
        ))),
    }
}
