//! One-hot encoding of categorical columns

use crate::error::{LoanfitError, Result};
use ndarray::Array2;
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// Label used for the missing-value category in output names
pub const MISSING_CATEGORY: &str = "nan";

#[derive(Debug, Clone)]
struct ColumnCategories {
    column: String,
    /// Sorted values; `None` (missing) sorts last
    categories: Vec<Option<String>>,
    index: HashMap<Option<String>, usize>,
}

/// One-hot encoder producing a dense block per fitted column.
///
/// Categories not seen during fitting encode as all zeros.
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    columns: Vec<ColumnCategories>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the categories of each column
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.columns = columns
            .iter()
            .map(|name| {
                let mut present = BTreeSet::new();
                let mut has_missing = false;
                for value in string_values(df, name)? {
                    match value {
                        Some(s) => {
                            present.insert(s);
                        }
                        None => has_missing = true,
                    }
                }

                let mut categories: Vec<Option<String>> = present.into_iter().map(Some).collect();
                if has_missing {
                    categories.push(None);
                }
                let index = categories
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (c.clone(), i))
                    .collect();

                Ok(ColumnCategories {
                    column: name.clone(),
                    categories,
                    index,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode the fitted columns; blocks follow the fitted column order
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(LoanfitError::ModelNotFitted);
        }

        let mut out = Array2::<f64>::zeros((df.height(), self.n_output_features()));
        let mut offset = 0;
        for col in &self.columns {
            for (row, value) in string_values(df, &col.column)?.into_iter().enumerate() {
                if let Some(&i) = col.index.get(&value) {
                    out[[row, offset + i]] = 1.0;
                }
            }
            offset += col.categories.len();
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn n_output_features(&self) -> usize {
        self.columns.iter().map(|c| c.categories.len()).sum()
    }

    /// `{column}_{category}` for every output column
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|col| {
                col.categories.iter().map(move |cat| {
                    format!("{}_{}", col.column, cat.as_deref().unwrap_or(MISSING_CATEGORY))
                })
            })
            .collect()
    }

    pub fn categories(&self, column: &str) -> Option<&[Option<String>]> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.categories.as_slice())
    }
}

fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)
        .map_err(|_| LoanfitError::FeatureNotFound(name.to_string()))?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_categories_with_missing() {
        let df = df!("term" => [Some("60 months"), None, Some("36 months"), Some("60 months")]).unwrap();
        let mut encoder = OneHotEncoder::new();
        let out = encoder.fit_transform(&df, &["term".to_string()]).unwrap();

        assert_eq!(
            encoder.feature_names(),
            vec!["term_36 months", "term_60 months", "term_nan"]
        );
        assert_eq!(out.row(0).to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(out.row(1).to_vec(), vec![0.0, 0.0, 1.0]);
        assert_eq!(out.row(2).to_vec(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_is_zero() {
        let train = df!("grade" => ["A", "B"]).unwrap();
        let test = df!("grade" => ["C", "A"]).unwrap();
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&train, &["grade".to_string()]).unwrap();

        let out = encoder.transform(&test).unwrap();
        assert_eq!(out.row(0).sum(), 0.0);
        assert_eq!(out.row(1).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_numeric_column_as_categories() {
        let df = df!("mort_acc" => [1i64, 0, 1]).unwrap();
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["mort_acc".to_string()]).unwrap();
        assert_eq!(encoder.n_output_features(), 2);
        assert_eq!(encoder.feature_names(), vec!["mort_acc_0", "mort_acc_1"]);
    }

    #[test]
    fn test_missing_column() {
        let df = df!("grade" => ["A"]).unwrap();
        let mut encoder = OneHotEncoder::new();
        assert!(matches!(
            encoder.fit(&df, &["purpose".to_string()]),
            Err(LoanfitError::FeatureNotFound(_))
        ));
    }
}
