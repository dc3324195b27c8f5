//! Fitted preprocessing → feature creation → feature selection → model chain

use super::options::ModelChoice;
use super::stage::PipelineStage;
use crate::error::{LoanfitError, Result};
use crate::preprocessing::ColumnTransformer;
use crate::training::Model;
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::Serialize;
use serde_json::json;
use std::time::Instant;
use tracing::debug;

/// Name and parameters of one pipeline step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepDescription {
    /// Step slot: `columntransformer`, `feature_create`, `feature_select`, `clf`
    pub step: &'static str,
    /// Estimator in the slot, or `passthrough`
    pub estimator: String,
    pub params: serde_json::Value,
}

impl std::fmt::Display for StepDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.params.is_null() {
            write!(f, "{}: {}", self.step, self.estimator)
        } else {
            write!(f, "{}: {}({})", self.step, self.estimator, self.params)
        }
    }
}

/// A pipeline in the fixed four-slot order. Empty slots pass data through.
#[derive(Debug)]
pub struct Pipeline {
    preprocessor: ColumnTransformer,
    feature_create: Option<Box<dyn PipelineStage>>,
    feature_select: Option<Box<dyn PipelineStage>>,
    model: Box<dyn Model>,
    choice: ModelChoice,
    is_fitted: bool,
}

impl Pipeline {
    pub fn new(
        preprocessor: ColumnTransformer,
        feature_create: Option<Box<dyn PipelineStage>>,
        feature_select: Option<Box<dyn PipelineStage>>,
        model: Box<dyn Model>,
        choice: ModelChoice,
    ) -> Self {
        Self {
            preprocessor,
            feature_create,
            feature_select,
            model,
            choice,
            is_fitted: false,
        }
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn model_choice(&self) -> ModelChoice {
        self.choice
    }

    pub fn is_classifier(&self) -> bool {
        self.choice.is_classifier()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fit every stage in order, then the model
    pub fn fit(&mut self, df: &DataFrame, y: &Array1<f64>) -> Result<&mut Self> {
        if df.height() != y.len() {
            return Err(LoanfitError::ShapeError {
                expected: format!("{} labels", df.height()),
                actual: format!("{} labels", y.len()),
            });
        }

        let start = Instant::now();
        let mut x = self.preprocessor.fit_transform(df)?;
        for stage in [&mut self.feature_create, &mut self.feature_select]
            .into_iter()
            .flatten()
        {
            x = stage.fit_transform(&x, y)?;
        }
        self.model.fit(&x, y)?;
        self.is_fitted = true;

        debug!(
            model = self.model.name(),
            rows = df.height(),
            model_features = x.ncols(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline fitted"
        );
        Ok(self)
    }

    /// Matrix handed to the model for `df`
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(LoanfitError::ModelNotFitted);
        }
        let mut x = self.preprocessor.transform(df)?;
        for stage in [&self.feature_create, &self.feature_select].into_iter().flatten() {
            x = stage.transform(&x)?;
        }
        Ok(x)
    }

    /// Raw model output: 0/1 for classifiers, continuous for regressors
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.transform(df)?;
        self.model.predict(&x)
    }

    /// Charged-off predictions. Regressor outputs are cut at 0.5.
    pub fn predict_labels(&self, df: &DataFrame) -> Result<Vec<bool>> {
        let predictions = self.predict(df)?;
        let classifier = self.is_classifier();
        Ok(predictions
            .iter()
            .map(|&p| if classifier { p == 1.0 } else { p >= 0.5 })
            .collect())
    }

    /// Step names and parameters, stable for a given configuration
    pub fn steps(&self) -> Vec<StepDescription> {
        let slot = |step: &'static str, stage: &Option<Box<dyn PipelineStage>>| match stage {
            Some(stage) => StepDescription {
                step,
                estimator: stage.name().to_string(),
                params: stage.params(),
            },
            None => StepDescription {
                step,
                estimator: "passthrough".to_string(),
                params: serde_json::Value::Null,
            },
        };

        let mut model_params = self.model.params();
        if let ModelChoice::LogisticRegression { c_range: Some(range) } | ModelChoice::LinearSvc { c_range: Some(range) } =
            self.choice
        {
            model_params["c_range"] = json!([range.0, range.1]);
        }

        vec![
            StepDescription {
                step: "columntransformer",
                estimator: "ColumnTransformer".to_string(),
                params: self.preprocessor.params(),
            },
            slot("feature_create", &self.feature_create),
            slot("feature_select", &self.feature_select),
            StepDescription {
                step: "clf",
                estimator: self.model.name().to_string(),
                params: model_params,
            },
        ]
    }

    /// Transformation steps that are not passthrough
    pub fn active_stages(&self) -> Vec<&'static str> {
        let mut stages = vec!["columntransformer"];
        if self.feature_create.is_some() {
            stages.push("feature_create");
        }
        if self.feature_select.is_some() {
            stages.push("feature_select");
        }
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_selection::SelectKBest;
    use crate::training::{ClassWeight, LogisticRegression, RidgeRegression};
    use polars::prelude::*;

    fn frame() -> (DataFrame, Array1<f64>) {
        let amount: Vec<f64> = (0..30).map(|i| if i % 3 == 0 { 30.0 + i as f64 } else { i as f64 }).collect();
        let grade: Vec<&str> = (0..30).map(|i| if i % 2 == 0 { "A" } else { "B" }).collect();
        let y = Array1::from_iter((0..30).map(|i| if i % 3 == 0 { 1.0 } else { 0.0 }));
        (df!("loan_amnt" => amount, "grade" => grade).unwrap(), y)
    }

    fn logistic_pipeline() -> Pipeline {
        Pipeline::new(
            ColumnTransformer::new(vec!["loan_amnt".into()], vec!["grade".into()]),
            None,
            None,
            Box::new(LogisticRegression::new().with_class_weight(ClassWeight::Balanced)),
            ModelChoice::LogisticRegression { c_range: None },
        )
    }

    #[test]
    fn test_fit_predict_labels() {
        let (df, y) = frame();
        let mut pipe = logistic_pipeline();
        pipe.fit(&df, &y).unwrap();

        let labels = pipe.predict_labels(&df).unwrap();
        assert_eq!(labels.len(), 30);
        let hits = labels.iter().zip(y.iter()).filter(|&(&l, &t)| l == (t == 1.0)).count();
        assert!(hits >= 27);
    }

    #[test]
    fn test_predict_before_fit() {
        let (df, _) = frame();
        assert!(matches!(logistic_pipeline().predict(&df), Err(LoanfitError::ModelNotFitted)));
    }

    #[test]
    fn test_regressor_labels_cut_at_half() {
        let (df, y) = frame();
        let mut pipe = Pipeline::new(
            ColumnTransformer::new(vec!["loan_amnt".into()], Vec::new()),
            None,
            None,
            Box::new(RidgeRegression::new(1.0)),
            ModelChoice::Ridge { alpha_range: None },
        );
        pipe.fit(&df, &y).unwrap();
        let raw = pipe.predict(&df).unwrap();
        let labels = pipe.predict_labels(&df).unwrap();
        for (p, l) in raw.iter().zip(labels) {
            assert_eq!(*p >= 0.5, l);
        }
    }

    #[test]
    fn test_steps_and_active_stages() {
        let mut pipe = logistic_pipeline();
        assert_eq!(pipe.active_stages(), vec!["columntransformer"]);

        pipe.feature_select = Some(Box::new(SelectKBest::new(1)));
        assert_eq!(pipe.active_stages(), vec!["columntransformer", "feature_select"]);

        let steps = pipe.steps();
        let names: Vec<&str> = steps.iter().map(|s| s.step).collect();
        assert_eq!(names, vec!["columntransformer", "feature_create", "feature_select", "clf"]);
        assert_eq!(steps[1].estimator, "passthrough");
        assert_eq!(steps[2].estimator, "SelectKBest");
        assert_eq!(steps[3].estimator, "LogisticRegression");
    }

    #[test]
    fn test_label_length_mismatch() {
        let (df, _) = frame();
        let mut pipe = logistic_pipeline();
        assert!(pipe.fit(&df, &Array1::zeros(3)).is_err());
    }
}
