//! Loan data: loading, column grouping and holdout splits

mod loader;
mod split;

pub use loader::{read_csv, LoanDataLoader};
pub use split::{stratified_holdout, SplitIndices};

use crate::error::{LoanfitError, Result};
use ndarray::Array1;
use polars::prelude::*;

/// Feature frame plus binary label (`true` = charged off)
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: DataFrame,
    pub labels: Vec<bool>,
    /// Float columns, in frame order
    pub numeric_features: Vec<String>,
    /// String columns, in frame order
    pub categorical_features: Vec<String>,
}

/// Train and test parts of a holdout split
#[derive(Debug, Clone)]
pub struct HoldoutSplit {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    pub fn new(features: DataFrame, labels: Vec<bool>) -> Result<Self> {
        if features.height() != labels.len() {
            return Err(LoanfitError::ShapeError {
                expected: format!("{} labels", features.height()),
                actual: format!("{} labels", labels.len()),
            });
        }

        let mut numeric_features = Vec::new();
        let mut categorical_features = Vec::new();
        for column in features.get_columns() {
            match column.dtype() {
                DataType::Float32 | DataType::Float64 => {
                    numeric_features.push(column.name().to_string())
                }
                DataType::String => categorical_features.push(column.name().to_string()),
                _ => {}
            }
        }

        Ok(Self {
            features,
            labels,
            numeric_features,
            categorical_features,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn n_positive(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }

    /// Label as 0/1 floats for model fitting
    pub fn target(&self) -> Array1<f64> {
        self.labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect()
    }

    /// Rows at `indices`, in that order
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        let idx = IdxCa::from_vec(
            "idx".into(),
            indices.iter().map(|&i| i as IdxSize).collect(),
        );
        let features = self.features.take(&idx)?;
        let labels = indices.iter().map(|&i| self.labels[i]).collect();

        Ok(Self {
            features,
            labels,
            numeric_features: self.numeric_features.clone(),
            categorical_features: self.categorical_features.clone(),
        })
    }

    /// Stratified train/test split
    pub fn holdout(&self, test_size: f64, seed: u64) -> Result<HoldoutSplit> {
        let split = stratified_holdout(&self.labels, test_size, seed)?;
        Ok(HoldoutSplit {
            train: self.take(&split.train)?,
            test: self.take(&split.test)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let n = 40;
        let amounts: Vec<f64> = (0..n).map(|i| 1000.0 + i as f64 * 10.0).collect();
        let counts: Vec<i64> = (0..n).map(|i| i as i64).collect();
        let grades: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "A" } else { "B" }).collect();
        let df = df!(
            "loan_amnt" => amounts,
            "open_acc" => counts,
            "grade" => grades
        )
        .unwrap();
        let labels = (0..n).map(|i| i % 4 == 0).collect();
        Dataset::new(df, labels).unwrap()
    }

    #[test]
    fn test_column_groups_are_disjoint() {
        let ds = dataset();
        assert_eq!(ds.numeric_features, vec!["loan_amnt"]);
        assert_eq!(ds.categorical_features, vec!["grade"]);
        assert!(ds
            .numeric_features
            .iter()
            .all(|c| !ds.categorical_features.contains(c)));
    }

    #[test]
    fn test_holdout_keeps_rows_aligned() {
        let ds = dataset();
        let split = ds.holdout(0.2, 0).unwrap();
        assert_eq!(split.test.n_rows(), 8);
        assert_eq!(split.train.n_rows(), 32);
        assert_eq!(split.test.features.height(), 8);
        assert_eq!(split.test.n_positive(), 2);
    }

    #[test]
    fn test_label_length_mismatch() {
        let df = df!("a" => [1.0, 2.0]).unwrap();
        assert!(Dataset::new(df, vec![true]).is_err());
    }
}
