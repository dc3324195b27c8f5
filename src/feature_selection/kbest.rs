//! Univariate selection by ANOVA F statistic

use crate::error::{LoanfitError, Result};
use crate::pipeline::PipelineStage;
use crate::training::linear_models::check_features;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::warn;

pub const DEFAULT_K: usize = 5;

/// ANOVA F statistic of every column against the class labels.
///
/// Constant columns score NaN; columns that separate the classes
/// perfectly score +inf.
pub fn f_classif(x: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
    if x.nrows() != y.len() {
        return Err(LoanfitError::ShapeError {
            expected: format!("{} labels", x.nrows()),
            actual: format!("{} labels", y.len()),
        });
    }

    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        groups.entry(label.round() as i64).or_default().push(i);
    }
    let n = x.nrows() as f64;
    let k = groups.len() as f64;
    if groups.len() < 2 || n <= k {
        return Err(LoanfitError::ValidationError(
            "f_classif needs at least two classes and more samples than classes".to_string(),
        ));
    }

    let grand_mean = x.mean_axis(Axis(0)).ok_or_else(|| {
        LoanfitError::ComputationError("Failed to compute column means".to_string())
    })?;
    let mut between = Array1::<f64>::zeros(x.ncols());
    let mut within = Array1::<f64>::zeros(x.ncols());
    for rows in groups.values() {
        let group = x.select(Axis(0), rows);
        let mean = group.mean_axis(Axis(0)).ok_or_else(|| {
            LoanfitError::ComputationError("Empty class group".to_string())
        })?;
        let diff = &mean - &grand_mean;
        between += &(diff.mapv(|d| d * d) * rows.len() as f64);
        within += &(&group - &mean).mapv(|d| d * d).sum_axis(Axis(0));
    }

    let df_between = k - 1.0;
    let df_within = n - k;
    Ok(ndarray::Zip::from(&between)
        .and(&within)
        .map_collect(|&b, &w| (b / df_between) / (w / df_within)))
}

/// Keep the `k` highest scoring columns in their original order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectKBest {
    k: usize,
    pub scores: Option<Array1<f64>>,
    selected: Vec<usize>,
}

impl Default for SelectKBest {
    fn default() -> Self {
        Self::new(DEFAULT_K)
    }
}

impl SelectKBest {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            scores: None,
            selected: Vec::new(),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn selected_features(&self) -> &[usize] {
        &self.selected
    }
}

/// NaN ranks below every number
fn score_order(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.total_cmp(&b),
    }
}

impl PipelineStage for SelectKBest {
    fn name(&self) -> &'static str {
        "SelectKBest"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if self.k == 0 {
            return Err(LoanfitError::invalid_param("k", self.k, "must be at least 1"));
        }

        let scores = f_classif(x, y)?;
        let n_features = scores.len();
        if self.k > n_features {
            warn!(k = self.k, n_features, "k exceeds feature count; keeping all features");
        }
        let keep = self.k.min(n_features);

        let mut order: Vec<usize> = (0..n_features).collect();
        // Ascending stable sort, so on ties the later column ranks higher
        order.sort_by(|&a, &b| score_order(scores[a], scores[b]));
        let mut selected = order.split_off(n_features - keep);
        selected.sort_unstable();

        self.selected = selected;
        self.scores = Some(scores);
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let scores = self.scores.as_ref().ok_or(LoanfitError::ModelNotFitted)?;
        check_features(scores.len(), x)?;
        Ok(x.select(Axis(1), &self.selected))
    }

    fn params(&self) -> serde_json::Value {
        json!({ "score_func": "f_classif", "k": self.k })
    }
}
