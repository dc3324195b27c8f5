//! Missing value imputation for numeric columns

use crate::error::{LoanfitError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Statistic used to fill missing numeric values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with column mean
    Mean,
    /// Replace with column median
    Median,
}

/// Imputer for handling missing values. Nulls and NaN both count as missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
    fill_values: Vec<(String, f64)>,
    is_fitted: bool,
}

impl SimpleImputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    /// Fit the imputer to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.fill_values = columns
            .iter()
            .map(|name| {
                let values: Vec<f64> = float_values(df, name)?.into_iter().flatten().collect();
                Ok((name.clone(), self.compute_fill_value(values)))
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace missing entries of the fitted columns; they come back as Float64
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(LoanfitError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (name, fill) in &self.fill_values {
            let filled: Float64Chunked = float_values(df, name)?
                .into_iter()
                .map(|v| Some(v.unwrap_or(*fill)))
                .collect();
            result.with_column(filled.with_name(name.as_str().into()).into_series())?;
        }
        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.fill_values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| *v)
    }

    /// All-missing columns fall back to zero
    fn compute_fill_value(&self, mut values: Vec<f64>) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self.strategy {
            ImputeStrategy::Mean => values.iter().sum::<f64>() / values.len() as f64,
            ImputeStrategy::Median => {
                values.sort_by(f64::total_cmp);
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            }
        }
    }
}

/// Column values as `f64`, with nulls and NaN mapped to `None`
pub(crate) fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .map_err(|_| LoanfitError::FeatureNotFound(name.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "dti" => [Some(10.0), None, Some(20.0), Some(f64::NAN), Some(30.0)],
            "grade" => ["A", "B", "A", "C", "B"]
        )
        .unwrap()
    }

    #[test]
    fn test_mean_imputation() {
        let df = frame();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Mean);
        let out = imputer.fit_transform(&df, &["dti".to_string()]).unwrap();

        assert_eq!(imputer.fill_value("dti"), Some(20.0));
        let values: Vec<Option<f64>> = out.column("dti").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(10.0), Some(20.0), Some(20.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn test_median_imputation() {
        let df = df!("x" => [Some(1.0), Some(2.0), None, Some(10.0)]).unwrap();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Median);
        imputer.fit(&df, &["x".to_string()]).unwrap();
        assert_eq!(imputer.fill_value("x"), Some(2.0));
    }

    #[test]
    fn test_missing_column() {
        let df = frame();
        let mut imputer = SimpleImputer::new(ImputeStrategy::Mean);
        assert!(matches!(
            imputer.fit(&df, &["nope".to_string()]),
            Err(LoanfitError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_transform_before_fit() {
        let imputer = SimpleImputer::new(ImputeStrategy::Mean);
        assert!(matches!(imputer.transform(&frame()), Err(LoanfitError::ModelNotFitted)));
    }
}
