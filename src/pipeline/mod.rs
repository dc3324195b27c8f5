//! Pipeline assembly
//!
//! A pipeline is the fixed chain preprocessing → feature creation →
//! feature selection → model. [`PipelineConfig`] records the user's
//! choices and [`build_pipeline`] turns it into an unfitted [`Pipeline`].

mod builder;
mod model_pipeline;
mod options;
mod stage;

pub use builder::{
    build_model, build_pipeline, DEFAULT_LASSO_ALPHA, DEFAULT_RIDGE_ALPHA, LEARNING_RATE_MEMBERS,
};
pub use model_pipeline::{Pipeline, StepDescription};
pub use options::{
    AlphaRange, FeatureCreation, FeatureSelection, ModelChoice, PipelineConfig, SelectorModel, CREATION_MENU,
    DEFAULT_DEGREE, MAX_CV, MIN_CV, MODEL_MENU, SELECTION_MENU,
};
pub use stage::PipelineStage;
