//! Scoring: the profit scorer and standard holdout metrics

mod metrics;
mod profit;

pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix, RegressionReport, ResidualBin};
pub use profit::{custom_prof_score, ProfitScorer, DEFAULT_HAIRCUT, DEFAULT_ROA};
