//! User-facing pipeline choices
//!
//! Menu strings are parsed once into these enums; the builder only ever
//! sees typed values.

use crate::error::{LoanfitError, Result};
use crate::feature_engineering::MAX_DEGREE;
use crate::feature_selection::{DEFAULT_K, DEFAULT_N_FEATURES, DEFAULT_RFECV_CV, DEFAULT_SFS_CV, DEFAULT_THRESHOLD};
use crate::training::ClassWeight;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Model menu, in display order
pub const MODEL_MENU: [&str; 5] = [
    "Logistic Regression",
    "HistGradientBoostingRegressor",
    "Lasso",
    "Ridge",
    "Linear SVC",
];

/// Feature-selection menu, in display order
pub const SELECTION_MENU: [&str; 9] = [
    "passthrough",
    "PCA(5)",
    "PCA(10)",
    "PCA(15)",
    "SelectKBest(f_classif)",
    "SelectFromModel(LassoCV())",
    "SelectFromModel(LinearSVC(penalty=\"l1\", dual=False))",
    "RFECV(LogisticRegression, scoring=prof_score)",
    "SequentialFeatureSelector(LogisticRegression, scoring=prof_score)",
];

/// Feature-creation menu, in display order
pub const CREATION_MENU: [&str; 4] = ["passthrough", "PolynomialFeatures", "MinMaxScaler", "MaxAbsScaler"];

pub const MIN_CV: usize = 2;
pub const MAX_CV: usize = 10;

/// Evenly spaced alpha grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaRange {
    pub min: f64,
    pub max: f64,
    pub points: usize,
}

impl AlphaRange {
    pub fn new(min: f64, max: f64, points: usize) -> Self {
        Self { min, max, points }
    }

    fn validate(&self) -> Result<()> {
        if !(self.min > 0.0 && self.min <= self.max) {
            return Err(LoanfitError::invalid_param(
                "alpha_range",
                format!("({}, {})", self.min, self.max),
                "requires 0 < min <= max",
            ));
        }
        if self.points == 0 {
            return Err(LoanfitError::invalid_param("alpha_points", self.points, "must be at least 1"));
        }
        Ok(())
    }
}

/// Estimator at the end of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ModelChoice {
    /// C range is recorded for display only
    LogisticRegression { c_range: Option<(f64, f64)> },
    /// A learning-rate range builds a voting ensemble over the range
    HistGradientBoosting { lr_range: Option<(f64, f64)> },
    Lasso { alpha_range: Option<AlphaRange> },
    Ridge { alpha_range: Option<AlphaRange> },
    /// C range is recorded for display only
    LinearSvc { c_range: Option<(f64, f64)> },
}

impl ModelChoice {
    pub fn menu_name(&self) -> &'static str {
        match self {
            ModelChoice::LogisticRegression { .. } => MODEL_MENU[0],
            ModelChoice::HistGradientBoosting { .. } => MODEL_MENU[1],
            ModelChoice::Lasso { .. } => MODEL_MENU[2],
            ModelChoice::Ridge { .. } => MODEL_MENU[3],
            ModelChoice::LinearSvc { .. } => MODEL_MENU[4],
        }
    }

    /// Classifiers predict 0/1; the rest regress on the 0/1 label
    pub fn is_classifier(&self) -> bool {
        matches!(
            self,
            ModelChoice::LogisticRegression { .. } | ModelChoice::LinearSvc { .. }
        )
    }

    fn validate(&self) -> Result<()> {
        match self {
            ModelChoice::LogisticRegression { c_range: Some((min, max)) }
            | ModelChoice::LinearSvc { c_range: Some((min, max)) } => {
                if !(*min > 0.0 && min <= max) {
                    return Err(LoanfitError::invalid_param(
                        "c_range",
                        format!("({}, {})", min, max),
                        "requires 0 < min <= max",
                    ));
                }
            }
            ModelChoice::HistGradientBoosting { lr_range: Some((min, max)) } => {
                if !(*min > 0.0 && min <= max && *max <= 1.0) {
                    return Err(LoanfitError::invalid_param(
                        "learning_rate_range",
                        format!("({}, {})", min, max),
                        "requires 0 < min <= max <= 1",
                    ));
                }
            }
            ModelChoice::Lasso { alpha_range: Some(range) } | ModelChoice::Ridge { alpha_range: Some(range) } => {
                range.validate()?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl FromStr for ModelChoice {
    type Err = LoanfitError;

    /// Parse a menu name; ranges start unset
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Logistic Regression" => Ok(ModelChoice::LogisticRegression { c_range: None }),
            "HistGradientBoostingRegressor" => Ok(ModelChoice::HistGradientBoosting { lr_range: None }),
            "Lasso" => Ok(ModelChoice::Lasso { alpha_range: None }),
            "Ridge" => Ok(ModelChoice::Ridge { alpha_range: None }),
            "Linear SVC" => Ok(ModelChoice::LinearSvc { c_range: None }),
            other => Err(LoanfitError::InvalidModel(other.to_string())),
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.menu_name())
    }
}

/// Sub-model of `SelectFromModel`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SelectorModel {
    LassoCv,
    /// L1-penalized linear SVC
    LinearSvcL1 { class_weight: ClassWeight },
}

/// Feature-selection stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeatureSelection {
    Passthrough,
    /// Truncated SVD to `n_components`
    Pca { n_components: usize },
    SelectKBest { k: usize },
    SelectFromModel { estimator: SelectorModel, threshold: f64 },
    /// Recursive elimination around a logistic regression
    Rfecv { cv: usize, class_weight: ClassWeight },
    /// Forward selection around a logistic regression
    Sequential {
        n_features: usize,
        cv: usize,
        class_weight: ClassWeight,
    },
}

fn pca_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^PCA\(\s*(\d+)\s*\)$").expect("valid regex"))
}

fn cv_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"cv\s*=\s*(\d+)").expect("valid regex"))
}

impl FeatureSelection {
    /// Parse a menu entry. Parameters the entry does not carry take their
    /// defaults and may be overridden by the caller afterwards.
    pub fn parse_menu(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        let invalid = |reason: &str| LoanfitError::InvalidFeatureSelection(format!("{}: {}", entry, reason));

        if entry == "passthrough" {
            return Ok(FeatureSelection::Passthrough);
        }
        if entry.starts_with("PCA") {
            let caps = pca_pattern()
                .captures(entry)
                .ok_or_else(|| invalid("expected PCA(n)"))?;
            let n_components = caps[1].parse().map_err(|_| invalid("component count out of range"))?;
            return Ok(FeatureSelection::Pca { n_components });
        }
        if entry.starts_with("SelectKBest") {
            return Ok(FeatureSelection::SelectKBest { k: DEFAULT_K });
        }
        if entry.starts_with("SelectFromModel") {
            let estimator = if entry.contains("LassoCV") {
                SelectorModel::LassoCv
            } else if entry.contains("LinearSVC") {
                SelectorModel::LinearSvcL1 {
                    class_weight: ClassWeight::Balanced,
                }
            } else {
                return Err(invalid("inner model must be LassoCV or LinearSVC"));
            };
            return Ok(FeatureSelection::SelectFromModel {
                estimator,
                threshold: DEFAULT_THRESHOLD,
            });
        }
        if entry.starts_with("RFECV") {
            if !entry.contains("LogisticRegression") {
                return Err(invalid("inner model must be LogisticRegression"));
            }
            return Ok(FeatureSelection::Rfecv {
                cv: Self::explicit_cv(entry).unwrap_or(DEFAULT_RFECV_CV),
                class_weight: ClassWeight::Balanced,
            });
        }
        if entry.starts_with("SequentialFeatureSelector") {
            if !entry.contains("LogisticRegression") {
                return Err(invalid("inner model must be LogisticRegression"));
            }
            return Ok(FeatureSelection::Sequential {
                n_features: DEFAULT_N_FEATURES,
                cv: DEFAULT_SFS_CV,
                class_weight: ClassWeight::Balanced,
            });
        }
        Err(invalid("unknown method"))
    }

    /// Fold count written into an entry as `cv=N`
    pub fn explicit_cv(entry: &str) -> Option<usize> {
        cv_pattern()
            .captures(entry)
            .and_then(|caps| caps[1].parse().ok())
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, FeatureSelection::Passthrough)
    }

    fn validate(&self) -> Result<()> {
        match *self {
            FeatureSelection::Pca { n_components } if n_components == 0 => {
                Err(LoanfitError::invalid_param("n_components", n_components, "must be at least 1"))
            }
            FeatureSelection::SelectKBest { k } if k == 0 => {
                Err(LoanfitError::invalid_param("k", k, "must be at least 1"))
            }
            FeatureSelection::SelectFromModel { threshold, .. } if !(0.0..=1.0).contains(&threshold) => {
                Err(LoanfitError::invalid_param("threshold", threshold, "must be in [0, 1]"))
            }
            FeatureSelection::Rfecv { cv, .. } | FeatureSelection::Sequential { cv, .. }
                if !(MIN_CV..=MAX_CV).contains(&cv) =>
            {
                Err(LoanfitError::invalid_param("cv", cv, "must be between 2 and 10"))
            }
            FeatureSelection::Sequential { n_features, .. } if n_features == 0 => {
                Err(LoanfitError::invalid_param("n_features_to_select", n_features, "must be at least 1"))
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for FeatureSelection {
    type Err = LoanfitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_menu(s)
    }
}

/// Feature-creation stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeatureCreation {
    Passthrough,
    Polynomial { degree: usize, interaction_only: bool },
    MinMaxScaler,
    MaxAbsScaler,
}

pub const DEFAULT_DEGREE: usize = 2;

impl FeatureCreation {
    pub fn parse_menu(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        match entry {
            "passthrough" => Ok(FeatureCreation::Passthrough),
            "MinMaxScaler" => Ok(FeatureCreation::MinMaxScaler),
            "MaxAbsScaler" => Ok(FeatureCreation::MaxAbsScaler),
            _ if entry.starts_with("PolynomialFeatures") => Ok(FeatureCreation::Polynomial {
                degree: DEFAULT_DEGREE,
                interaction_only: entry.contains("interaction_only"),
            }),
            _ => Err(LoanfitError::InvalidFeatureCreation(entry.to_string())),
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, FeatureCreation::Passthrough)
    }

    fn validate(&self) -> Result<()> {
        match *self {
            FeatureCreation::Polynomial { degree, .. } if !(1..=MAX_DEGREE).contains(&degree) => {
                Err(LoanfitError::invalid_param("degree", degree, "must be between 1 and 5"))
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for FeatureCreation {
    type Err = LoanfitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_menu(s)
    }
}

/// Everything needed to build one pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub model: ModelChoice,
    pub feature_selection: FeatureSelection,
    pub feature_creation: FeatureCreation,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
}

impl PipelineConfig {
    /// Config with passthrough selection and creation and no features
    pub fn new(model: ModelChoice) -> Self {
        Self {
            model,
            feature_selection: FeatureSelection::Passthrough,
            feature_creation: FeatureCreation::Passthrough,
            numeric_features: Vec::new(),
            categorical_features: Vec::new(),
        }
    }

    pub fn with_features(mut self, numeric: Vec<String>, categorical: Vec<String>) -> Self {
        self.numeric_features = numeric;
        self.categorical_features = categorical;
        self
    }

    pub fn with_selection(mut self, selection: FeatureSelection) -> Self {
        self.feature_selection = selection;
        self
    }

    pub fn with_creation(mut self, creation: FeatureCreation) -> Self {
        self.feature_creation = creation;
        self
    }

    /// Check parameter ranges and the feature lists
    pub fn validate(&self) -> Result<()> {
        if self.numeric_features.is_empty() && self.categorical_features.is_empty() {
            return Err(LoanfitError::ValidationError(
                "Select at least one numeric or categorical feature".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in self.numeric_features.iter().chain(&self.categorical_features) {
            if !seen.insert(name.as_str()) {
                return Err(LoanfitError::ValidationError(format!(
                    "Feature '{}' is listed more than once",
                    name
                )));
            }
        }

        self.model.validate()?;
        self.feature_selection.validate()?;
        self.feature_creation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_names_round_trip() {
        for name in MODEL_MENU {
            let choice: ModelChoice = name.parse().unwrap();
            assert_eq!(choice.menu_name(), name);
        }
        assert!(matches!(
            "Random Forest".parse::<ModelChoice>(),
            Err(LoanfitError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_every_selection_entry_parses() {
        for entry in SELECTION_MENU {
            assert!(FeatureSelection::parse_menu(entry).is_ok(), "{}", entry);
        }
    }

    #[test]
    fn test_selection_parsing() {
        assert_eq!(
            FeatureSelection::parse_menu("PCA(10)").unwrap(),
            FeatureSelection::Pca { n_components: 10 }
        );
        assert_eq!(
            FeatureSelection::parse_menu("SelectFromModel(LassoCV())").unwrap(),
            FeatureSelection::SelectFromModel {
                estimator: SelectorModel::LassoCv,
                threshold: 0.5
            }
        );
        assert_eq!(
            FeatureSelection::parse_menu("RFECV(LogisticRegression, cv=4, scoring=prof_score)").unwrap(),
            FeatureSelection::Rfecv {
                cv: 4,
                class_weight: ClassWeight::Balanced
            }
        );
    }

    #[test]
    fn test_selection_errors() {
        for entry in ["PCA(x)", "VarianceThreshold()", "SelectFromModel(Ridge())", "RFECV(cv=3)"] {
            assert!(
                matches!(
                    FeatureSelection::parse_menu(entry),
                    Err(LoanfitError::InvalidFeatureSelection(_))
                ),
                "{}",
                entry
            );
        }
    }

    #[test]
    fn test_creation_parsing() {
        assert_eq!(
            FeatureCreation::parse_menu("PolynomialFeatures(interaction_only=True)").unwrap(),
            FeatureCreation::Polynomial {
                degree: 2,
                interaction_only: true
            }
        );
        assert!(matches!(
            "Normalizer".parse::<FeatureCreation>(),
            Err(LoanfitError::InvalidFeatureCreation(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let base = PipelineConfig::new(ModelChoice::Ridge { alpha_range: None });
        assert!(base.validate().is_err());

        let ok = base
            .clone()
            .with_features(vec!["dti".into()], vec!["grade".into()]);
        assert!(ok.validate().is_ok());

        let dup = base.clone().with_features(vec!["dti".into()], vec!["dti".into()]);
        assert!(dup.validate().is_err());

        let bad_range = PipelineConfig::new(ModelChoice::Lasso {
            alpha_range: Some(AlphaRange::new(1.0, 0.5, 10)),
        })
        .with_features(vec!["dti".into()], Vec::new());
        assert!(bad_range.validate().is_err());

        let bad_degree = ok.with_creation(FeatureCreation::Polynomial {
            degree: 6,
            interaction_only: false,
        });
        assert!(bad_degree.validate().is_err());
    }
}
