//! Feature selection stages
//!
//! Each selector is a [`PipelineStage`](crate::pipeline::PipelineStage)
//! placed between feature creation and the model.

mod from_model;
mod kbest;
mod rfecv;
mod sequential;
mod svd;

pub use from_model::{SelectFromModel, DEFAULT_THRESHOLD};
pub use kbest::{f_classif, SelectKBest, DEFAULT_K};
pub use rfecv::{Rfecv, DEFAULT_CV as DEFAULT_RFECV_CV};
pub use sequential::{SequentialFeatureSelector, DEFAULT_CV as DEFAULT_SFS_CV, DEFAULT_N_FEATURES};
pub use svd::TruncatedSvd;
