//! Dashboard session state and its text rendering

use super::content::{DICTIONARY, OVERVIEW, TITLE};
use crate::evaluation::{Diagnostics, SessionReport};
use crate::pipeline::PipelineConfig;
use crate::scoring::{ClassificationReport, RegressionReport};
use serde::Serialize;

/// Dashboard sections, in menu order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Section {
    #[default]
    Overview,
    CustomModelBuilder,
    Leaderboard,
    Dictionary,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Overview,
        Section::CustomModelBuilder,
        Section::Leaderboard,
        Section::Dictionary,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::CustomModelBuilder => "Custom Model Builder",
            Section::Leaderboard => "Leaderboard",
            Section::Dictionary => "Dictionary",
        }
    }

    /// Longer label used in the section menu
    pub fn menu_label(&self) -> &'static str {
        match self {
            Section::Overview => "Overview, Objectives, Process, and Results",
            Section::CustomModelBuilder => "Custom Machine Learning Model Builder",
            Section::Leaderboard => "Leaderboard",
            Section::Dictionary => "Dictionary",
        }
    }
}

/// Choices from the most recent builder run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderChoices {
    pub config: Option<PipelineConfig>,
    pub cv_folds: usize,
}

impl Default for BuilderChoices {
    fn default() -> Self {
        Self {
            config: None,
            cv_folds: 5,
        }
    }
}

/// One cross-validated run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub model: String,
    pub feature_create: String,
    pub feature_select: String,
    pub n_features: usize,
    pub cv_folds: usize,
    pub mean_test_score: f64,
    pub std_test_score: f64,
    pub holdout_profit: f64,
}

/// Runs of the current session, best mean CV profit first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn record(&mut self, report: &SessionReport) {
        let estimator = |slot: &str| {
            report
                .steps
                .iter()
                .find(|s| s.step == slot)
                .map(|s| s.estimator.clone())
                .unwrap_or_else(|| "passthrough".to_string())
        };
        self.entries.push(LeaderboardEntry {
            model: report.config.model.menu_name().to_string(),
            feature_create: estimator("feature_create"),
            feature_select: estimator("feature_select"),
            n_features: report.config.numeric_features.len() + report.config.categorical_features.len(),
            cv_folds: report.cross_validation.folds.len(),
            mean_test_score: report.cross_validation.mean_test_score(),
            std_test_score: report.cross_validation.std_test_score(),
            holdout_profit: report.holdout_profit,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by descending mean test score; earlier runs win ties
    pub fn ranked(&self) -> Vec<&LeaderboardEntry> {
        let mut ranked: Vec<&LeaderboardEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.mean_test_score.total_cmp(&a.mean_test_score));
        ranked
    }
}

/// Everything the dashboard shows between interactions
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub section: Section,
    pub builder: BuilderChoices,
    pub leaderboard: Leaderboard,
    /// Last builder failure, shown as a notice
    pub last_error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Text for the current section
pub fn render(state: &AppState, report: Option<&SessionReport>) -> String {
    let mut lines = vec![TITLE.to_string(), String::new(), heading(state.section.title())];
    match state.section {
        Section::Overview => lines.extend(OVERVIEW.lines().map(str::to_string)),
        Section::CustomModelBuilder => render_builder(&mut lines, state, report),
        Section::Leaderboard => render_leaderboard(&mut lines, &state.leaderboard),
        Section::Dictionary => {
            lines.push("Numerical Features:".to_string());
            for (name, description) in DICTIONARY {
                lines.push(String::new());
                lines.push(format!("  {}", name));
                lines.push(format!("    {}", description));
            }
        }
    }
    lines.join("\n")
}

fn heading(title: &str) -> String {
    format!("{}\n{}", title, "=".repeat(title.chars().count()))
}

fn render_builder(lines: &mut Vec<String>, state: &AppState, report: Option<&SessionReport>) {
    if let Some(err) = &state.last_error {
        lines.push(format!("Error: {}", err));
        lines.push(String::new());
    }

    let report = match report {
        Some(r) => r,
        None => {
            lines.push(
                "Choose features, a model, a feature-selection method and a feature-creation method to build a pipeline."
                    .to_string(),
            );
            return;
        }
    };

    let config = &report.config;
    lines.push(format!("Selected Model: {}", config.model));
    lines.push(format!("Numerical Features: {}", config.numeric_features.join(", ")));
    lines.push(format!("Categorical Features: {}", config.categorical_features.join(", ")));
    lines.push(String::new());
    lines.push("Pipeline:".to_string());
    for step in &report.steps {
        lines.push(format!("  {}", step));
    }
    lines.push(String::new());

    match &report.diagnostics {
        Diagnostics::Classification(r) => render_classification(lines, r),
        Diagnostics::Regression(r) => render_regression(lines, r),
    }
    lines.push(String::new());

    let cv = &report.cross_validation;
    lines.push(format!("Holdout Profit Score: {:.4}", report.holdout_profit));
    lines.push(format!("Cross-Validation ({} folds):", cv.folds.len()));
    lines.push(format!("  Mean Test Score: {:.4}", cv.mean_test_score()));
    lines.push(format!("  Standard Deviation Test Score: {:.4}", cv.std_test_score()));
    lines.push(format!("  Standard Deviation Fit Time: {:.4}s", cv.std_fit_time()));
    lines.push(format!("  Mean Score Time: {:.4}s", cv.mean_score_time()));
}

fn render_classification(lines: &mut Vec<String>, report: &ClassificationReport) {
    lines.push("Classification Report (Train Data):".to_string());
    lines.push(String::new());
    lines.push("|          | Precision | Recall | F1-Score | Support |".to_string());
    lines.push("|----------|-----------|--------|----------|---------|".to_string());
    for (name, m) in [("False", &report.negative), ("True", &report.positive)] {
        lines.push(format!(
            "| {:<8} | {:^9.2} | {:^6.2} | {:^8.2} | {:>7} |",
            name, m.precision, m.recall, m.f1, m.support
        ));
    }
    lines.push("|----------|-----------|--------|----------|---------|".to_string());
    lines.push(format!(
        "| {:<8} | {:9} | {:6} | {:^8.2} | {:7} |",
        "Accuracy", "", "", report.accuracy, ""
    ));
    lines.push(String::new());

    let [[tn, fp], [fn_, tp]] = report.confusion.as_rows();
    lines.push("Confusion Matrix (Train Data):".to_string());
    lines.push(format!("  {:<12} {:>10} {:>10}", "", "Pred False", "Pred True"));
    lines.push(format!("  {:<12} {:>10} {:>10}", "True False", tn, fp));
    lines.push(format!("  {:<12} {:>10} {:>10}", "True True", fn_, tp));
}

fn render_regression(lines: &mut Vec<String>, report: &RegressionReport) {
    lines.push("Regression Report (Train Data):".to_string());
    lines.push(String::new());
    lines.push(format!("  Mean Squared Error: {:.4}", report.mse));
    lines.push(format!("  Root Mean Squared Error: {:.4}", report.rmse));
    lines.push(format!("  R-squared: {:.4}", report.r2));
    lines.push(String::new());
    lines.push("Residuals by predicted value:".to_string());
    lines.push(format!("  {:>21} {:>14} {:>8}", "Predicted", "Mean residual", "Count"));
    for bin in &report.residuals {
        lines.push(format!(
            "  {:>10.3} .. {:>7.3} {:>14.4} {:>8}",
            bin.pred_low, bin.pred_high, bin.mean_residual, bin.count
        ));
    }
}

fn render_leaderboard(lines: &mut Vec<String>, leaderboard: &Leaderboard) {
    if leaderboard.is_empty() {
        lines.push("No models built yet. Runs from the Custom Model Builder appear here.".to_string());
        return;
    }
    lines.push(format!(
        "{:>4}  {:<30} {:<20} {:<26} {:>5} {:>12} {:>10} {:>10}",
        "Rank", "Model", "Feature creation", "Feature selection", "Cols", "Mean profit", "Std", "Holdout"
    ));
    for (rank, entry) in leaderboard.ranked().into_iter().enumerate() {
        lines.push(format!(
            "{:>4}  {:<30} {:<20} {:<26} {:>5} {:>12.4} {:>10.4} {:>10.4}",
            rank + 1,
            entry.model,
            entry.feature_create,
            entry.feature_select,
            entry.n_features,
            entry.mean_test_score,
            entry.std_test_score,
            entry.holdout_profit
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{CrossValidateReport, FoldResult};
    use crate::pipeline::{ModelChoice, StepDescription};
    use crate::training::CVStrategy;
    use ndarray::array;

    fn report(mean: f64) -> SessionReport {
        let config = PipelineConfig::new(ModelChoice::LogisticRegression { c_range: None })
            .with_features(vec!["dti".into()], vec!["grade".into()]);
        SessionReport {
            config,
            steps: vec![StepDescription {
                step: "clf",
                estimator: "LogisticRegression".to_string(),
                params: serde_json::json!({ "C": 1.0 }),
            }],
            diagnostics: Diagnostics::Classification(ClassificationReport::compute(
                &array![0.0, 1.0, 1.0, 0.0],
                &array![0.0, 1.0, 0.0, 0.0],
            )),
            holdout_profit: 0.1,
            cross_validation: CrossValidateReport {
                strategy: CVStrategy::StratifiedKFold { n_splits: 2 },
                folds: (0..2)
                    .map(|fold| FoldResult {
                        fold,
                        test_score: mean,
                        train_score: mean,
                        fit_time: 0.01,
                        score_time: 0.001,
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn test_render_static_sections() {
        let mut state = AppState::new();
        assert!(render(&state, None).contains("Overview"));

        state.section = Section::Dictionary;
        let text = render(&state, None);
        assert!(text.contains("annual_inc"));
        assert!(text.contains("mort_acc"));

        state.section = Section::Leaderboard;
        assert!(render(&state, None).contains("No models built yet"));
    }

    #[test]
    fn test_render_builder_report() {
        let state = AppState {
            section: Section::CustomModelBuilder,
            ..AppState::default()
        };
        let text = render(&state, Some(&report(0.5)));
        assert!(text.contains("Classification Report (Train Data):"));
        assert!(text.contains("Confusion Matrix (Train Data):"));
        assert!(text.contains("Mean Test Score: 0.5000"));
        assert!(text.contains("clf: LogisticRegression"));
    }

    #[test]
    fn test_render_error_notice() {
        let state = AppState {
            section: Section::CustomModelBuilder,
            last_error: Some("Invalid model: Random Forest".to_string()),
            ..AppState::default()
        };
        let text = render(&state, None);
        assert!(text.contains("Error: Invalid model: Random Forest"));
    }

    #[test]
    fn test_leaderboard_ranking() {
        let mut board = Leaderboard::default();
        board.record(&report(0.2));
        board.record(&report(1.5));
        board.record(&report(-0.4));

        let ranked = board.ranked();
        assert_eq!(board.len(), 3);
        assert_eq!(ranked[0].mean_test_score, 1.5);
        assert_eq!(ranked[2].mean_test_score, -0.4);
        assert_eq!(ranked[0].feature_select, "passthrough");
        assert_eq!(ranked[0].n_features, 2);
    }
}
