//! loanfit - loan-default model builder scored on lending profit
//!
//! This crate provides:
//! - Loan data loading with a stratified holdout split
//! - A profit scorer: repaid approvals earn the ROA, charged-off approvals lose the haircut
//! - Pipelines of preprocessing, feature creation, feature selection and a model
//! - Cross-validation with fit and score timings
//! - An interactive terminal dashboard and one-shot CLI commands
//!
//! # Modules
//!
//! - [`data`] - CSV loading, labels, holdout split
//! - [`scoring`] - Profit scorer and classification/regression reports
//! - [`preprocessing`] - Imputation, scaling, one-hot encoding, column transformer
//! - [`feature_engineering`] - Polynomial features and rescaling stages
//! - [`feature_selection`] - SVD, SelectKBest, SelectFromModel, RFECV, sequential selection
//! - [`training`] - Estimators and cross-validation splitters
//! - [`pipeline`] - Pipeline choices and assembly
//! - [`evaluation`] - Train diagnostics and pipeline cross-validation
//! - [`cli`] - Command-line interface and dashboard

pub mod config;
pub mod error;

pub mod data;
pub mod scoring;

pub mod preprocessing;
pub mod feature_engineering;
pub mod feature_selection;
pub mod training;

pub mod pipeline;
pub mod evaluation;

pub mod cli;

pub use error::{LoanfitError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::error::{LoanfitError, Result};

    pub use crate::data::{Dataset, HoldoutSplit, LoanDataLoader};
    pub use crate::scoring::{custom_prof_score, ClassificationReport, ProfitScorer, RegressionReport};

    pub use crate::pipeline::{
        build_pipeline, AlphaRange, FeatureCreation, FeatureSelection, ModelChoice, Pipeline, PipelineConfig,
        PipelineStage, SelectorModel,
    };
    pub use crate::training::{ClassWeight, CVStrategy, Model};

    pub use crate::evaluation::{cross_validate, run_session, CrossValidateReport, Diagnostics, SessionReport};
}
