//! CSV loading and label derivation

use super::Dataset;
use crate::config::AppConfig;
use crate::error::{LoanfitError, Result};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Read a headered CSV file into a DataFrame
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(LoanfitError::DataError(format!(
            "data file not found: {}",
            path.display()
        )));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(df)
}

/// Loads the loan sample and turns it into a labelled [`Dataset`]
#[derive(Debug, Clone)]
pub struct LoanDataLoader {
    label_column: String,
    positive_status: String,
}

impl Default for LoanDataLoader {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl LoanDataLoader {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            label_column: config.label_column.clone(),
            positive_status: config.positive_status.clone(),
        }
    }

    pub fn load(&self, path: &Path) -> Result<Dataset> {
        let start = Instant::now();
        let df = read_csv(path)?;
        let dataset = self.from_frame(df)?;

        info!(
            path = %path.display(),
            rows = dataset.n_rows(),
            numeric = dataset.numeric_features.len(),
            categorical = dataset.categorical_features.len(),
            positives = dataset.n_positive(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded loan data"
        );

        Ok(dataset)
    }

    /// Derive the label from the status column and drop that column
    pub fn from_frame(&self, df: DataFrame) -> Result<Dataset> {
        let status = df
            .column(&self.label_column)
            .map_err(|_| LoanfitError::FeatureNotFound(self.label_column.clone()))?
            .as_materialized_series()
            .cast(&DataType::String)?;

        let labels: Vec<bool> = status
            .str()?
            .into_iter()
            .map(|v| v == Some(self.positive_status.as_str()))
            .collect();

        let features = df.drop(&self.label_column)?;
        Dataset::new(features, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df!(
            "loan_amnt" => [1000.0, 2500.0, 1200.0, 800.0],
            "term" => ["36 months", "60 months", "36 months", "36 months"],
            "loan_status" => ["Fully Paid", "Charged Off", "Fully Paid", "Charged Off"],
            "id" => [1i64, 2, 3, 4]
        )
        .unwrap()
    }

    #[test]
    fn test_label_derivation() {
        let loader = LoanDataLoader::default();
        let dataset = loader.from_frame(sample_frame()).unwrap();
        assert_eq!(dataset.labels, vec![false, true, false, true]);
        assert!(dataset.features.column("loan_status").is_err());
    }

    #[test]
    fn test_missing_label_column() {
        let loader = LoanDataLoader::default();
        let df = df!("loan_amnt" => [1.0, 2.0]).unwrap();
        assert!(matches!(
            loader.from_frame(df),
            Err(LoanfitError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_load_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loans.csv");
        std::fs::write(
            &path,
            "loan_amnt,grade,loan_status\n1000.5,A,Fully Paid\n2000.0,B,Charged Off\n1500.25,A,Fully Paid\n",
        )
        .unwrap();

        let dataset = LoanDataLoader::default().load(&path).unwrap();
        assert_eq!(dataset.n_rows(), 3);
        assert_eq!(dataset.numeric_features, vec!["loan_amnt".to_string()]);
        assert_eq!(dataset.categorical_features, vec!["grade".to_string()]);
    }

    #[test]
    fn test_missing_file() {
        let result = read_csv(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(LoanfitError::DataError(_))));
    }
}
