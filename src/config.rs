//! Application configuration

use crate::error::{LoanfitError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the loan sample shipped with the dashboard
pub const DEFAULT_DATA_PATH: &str = "inputs/final_2013_subsample.csv";
/// Loan status column the label is derived from
pub const DEFAULT_LABEL_COLUMN: &str = "loan_status";

/// Settings shared by the loader, the scorer and the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV file with the loan records
    pub data_path: PathBuf,
    /// Column holding the loan outcome
    pub label_column: String,
    /// Outcome value that marks a defaulted loan
    pub positive_status: String,
    /// Fraction of rows held out for diagnostics
    pub test_size: f64,
    /// Seed for the holdout split
    pub random_state: u64,
    /// Return earned on each correctly identified safe loan
    pub roa: f64,
    /// Loss taken on each defaulted loan predicted safe
    pub haircut: f64,
    /// Default number of cross-validation folds
    pub cv_folds: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: std::env::var("LOANFIT_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH)),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            positive_status: "Charged Off".to_string(),
            test_size: 0.2,
            random_state: 0,
            roa: std::env::var("LOANFIT_ROA")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.02),
            haircut: std::env::var("LOANFIT_HAIRCUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.20),
            cv_folds: 5,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_profit(mut self, roa: f64, haircut: f64) -> Self {
        self.roa = roa;
        self.haircut = haircut;
        self
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Load a JSON config; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(LoanfitError::ConfigError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if !(2..=10).contains(&self.cv_folds) {
            return Err(LoanfitError::ConfigError(format!(
                "cv_folds must be between 2 and 10, got {}",
                self.cv_folds
            )));
        }
        if self.label_column.is_empty() {
            return Err(LoanfitError::ConfigError("label_column is empty".to_string()));
        }
        Ok(())
    }
}
