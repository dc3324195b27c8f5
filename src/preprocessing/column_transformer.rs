//! Column-group preprocessing: the first step of every pipeline

use super::encoder::OneHotEncoder;
use super::imputer::{float_values, ImputeStrategy, SimpleImputer};
use super::scaler::{Scaler, ScalerType};
use crate::error::{LoanfitError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde_json::json;
use tracing::debug;

/// Numeric columns are mean-imputed then standardized, categorical columns
/// are one-hot encoded. Output holds the numeric block followed by the
/// one-hot blocks, each in listed order. Unlisted columns are dropped.
#[derive(Debug, Clone)]
pub struct ColumnTransformer {
    numeric: Vec<String>,
    categorical: Vec<String>,
    imputer: SimpleImputer,
    scaler: Scaler,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl ColumnTransformer {
    pub fn new(numeric: Vec<String>, categorical: Vec<String>) -> Self {
        Self {
            numeric,
            categorical,
            imputer: SimpleImputer::new(ImputeStrategy::Mean),
            scaler: Scaler::new(ScalerType::Standard),
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        }
    }

    pub fn numeric_features(&self) -> &[String] {
        &self.numeric
    }

    pub fn categorical_features(&self) -> &[String] {
        &self.categorical
    }

    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        if self.numeric.is_empty() && self.categorical.is_empty() {
            return Err(LoanfitError::ValidationError(
                "At least one numeric or categorical feature is required".to_string(),
            ));
        }

        let imputed = self.imputer.fit_transform(df, &self.numeric)?;
        let numeric = numeric_matrix(&imputed, &self.numeric)?;
        if !self.numeric.is_empty() {
            self.scaler.fit(&numeric)?;
        }
        self.encoder.fit(df, &self.categorical)?;
        self.is_fitted = true;

        debug!(
            numeric = self.numeric.len(),
            categorical = self.categorical.len(),
            output_features = self.n_output_features(),
            "ColumnTransformer fitted"
        );
        Ok(self)
    }

    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(LoanfitError::ModelNotFitted);
        }

        let imputed = self.imputer.transform(df)?;
        let numeric = numeric_matrix(&imputed, &self.numeric)?;
        let numeric = if self.numeric.is_empty() {
            numeric
        } else {
            self.scaler.transform(&numeric)?
        };
        let onehot = self.encoder.transform(df)?;

        ndarray::concatenate(ndarray::Axis(1), &[numeric.view(), onehot.view()]).map_err(Into::into)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    pub fn n_output_features(&self) -> usize {
        self.numeric.len() + self.encoder.n_output_features()
    }

    /// Output column names, numeric first
    pub fn feature_names(&self) -> Vec<String> {
        self.numeric
            .iter()
            .cloned()
            .chain(self.encoder.feature_names())
            .collect()
    }

    pub fn params(&self) -> serde_json::Value {
        json!({
            "num": {
                "columns": self.numeric,
                "steps": ["SimpleImputer(strategy=\"mean\")", "StandardScaler()"],
            },
            "cat": {
                "columns": self.categorical,
                "steps": ["OneHotEncoder(handle_unknown=\"ignore\")"],
            },
        })
    }
}

/// Dense matrix of the given columns, missing values as NaN
fn numeric_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let mut out = Array2::<f64>::zeros((df.height(), columns.len()));
    for (j, name) in columns.iter().enumerate() {
        for (i, v) in float_values(df, name)?.into_iter().enumerate() {
            out[[i, j]] = v.unwrap_or(f64::NAN);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "loan_amnt" => [Some(1000.0), Some(3000.0), None, Some(2000.0)],
            "dti" => [10.0, 10.0, 10.0, 10.0],
            "grade" => ["B", "A", "B", "C"],
            "ignored" => [1, 2, 3, 4]
        )
        .unwrap()
    }

    fn transformer() -> ColumnTransformer {
        ColumnTransformer::new(
            vec!["loan_amnt".to_string(), "dti".to_string()],
            vec!["grade".to_string()],
        )
    }

    #[test]
    fn test_output_layout() {
        let mut ct = transformer();
        let out = ct.fit_transform(&frame()).unwrap();

        assert_eq!(out.dim(), (4, 5));
        assert_eq!(
            ct.feature_names(),
            vec!["loan_amnt", "dti", "grade_A", "grade_B", "grade_C"]
        );
        // Imputed row sits at the column mean, which standardizes to zero
        assert!(out[[2, 0]].abs() < 1e-12);
        // Constant column standardizes to zero
        assert!(out.column(1).iter().all(|&v| v == 0.0));
        assert_eq!(out.row(1).slice(ndarray::s![2..]).to_vec(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_categorical_only() {
        let mut ct = ColumnTransformer::new(Vec::new(), vec!["grade".to_string()]);
        let out = ct.fit_transform(&frame()).unwrap();
        assert_eq!(out.ncols(), 3);
    }

    #[test]
    fn test_no_features() {
        let mut ct = ColumnTransformer::new(Vec::new(), Vec::new());
        assert!(ct.fit(&frame()).is_err());
    }

    #[test]
    fn test_unknown_grade_matches_params() {
        let mut ct = transformer();
        ct.fit(&frame()).unwrap();
        assert_eq!(
            ct.params()["cat"]["steps"][0],
            "OneHotEncoder(handle_unknown=\"ignore\")"
        );

        let unseen = df!(
            "loan_amnt" => [1500.0],
            "dti" => [10.0],
            "grade" => ["G"]
        )
        .unwrap();
        let out = ct.transform(&unseen).unwrap();
        assert_eq!(out.row(0).slice(ndarray::s![2..]).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_column_at_transform() {
        let mut ct = transformer();
        ct.fit(&frame()).unwrap();
        let other = df!("loan_amnt" => [1.0]).unwrap();
        assert!(matches!(ct.transform(&other), Err(LoanfitError::FeatureNotFound(_))));
    }
}
