//! Polynomial feature generation

use crate::error::{LoanfitError, Result};
use crate::pipeline::PipelineStage;
use crate::training::linear_models::check_features;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const MAX_DEGREE: usize = 5;

/// Products of input features up to `degree`, ordered by degree then by
/// feature index. The first output column is the constant 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolynomialFeatures {
    degree: usize,
    /// Drop terms that repeat a feature (`x0^2`)
    interaction_only: bool,
    include_bias: bool,
    n_features_in: Option<usize>,
    /// Each term as the sorted input indices multiplied together
    terms: Vec<Vec<usize>>,
}

impl Default for PolynomialFeatures {
    fn default() -> Self {
        Self::new(2)
    }
}

impl PolynomialFeatures {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            interaction_only: false,
            include_bias: true,
            n_features_in: None,
            terms: Vec::new(),
        }
    }

    pub fn with_interaction_only(mut self, interaction_only: bool) -> Self {
        self.interaction_only = interaction_only;
        self
    }

    pub fn with_bias(mut self, include_bias: bool) -> Self {
        self.include_bias = include_bias;
        self
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn n_output_features(&self) -> usize {
        self.terms.len()
    }

    /// Enumerate index multisets (or sets, for interaction-only) by degree
    fn build_terms(&self, n_features: usize) -> Vec<Vec<usize>> {
        let mut terms = Vec::new();
        if self.include_bias {
            terms.push(Vec::new());
        }

        let mut frontier: Vec<Vec<usize>> = vec![Vec::new()];
        for _ in 0..self.degree {
            let mut next = Vec::new();
            for term in &frontier {
                let start = match term.last() {
                    Some(&last) if self.interaction_only => last + 1,
                    Some(&last) => last,
                    None => 0,
                };
                for j in start..n_features {
                    let mut extended = term.clone();
                    extended.push(j);
                    next.push(extended);
                }
            }
            terms.extend(next.iter().cloned());
            frontier = next;
        }
        terms
    }

    /// Names such as `x0`, `x0^2`, `x0 x1`
    pub fn feature_names(&self, input_names: &[String]) -> Vec<String> {
        self.terms
            .iter()
            .map(|term| {
                if term.is_empty() {
                    return "1".to_string();
                }
                let mut parts: Vec<String> = Vec::new();
                let mut i = 0;
                while i < term.len() {
                    let idx = term[i];
                    let power = term[i..].iter().take_while(|&&j| j == idx).count();
                    let name = input_names
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| format!("x{}", idx));
                    parts.push(if power == 1 { name } else { format!("{}^{}", name, power) });
                    i += power;
                }
                parts.join(" ")
            })
            .collect()
    }
}

impl PipelineStage for PolynomialFeatures {
    fn name(&self) -> &'static str {
        "PolynomialFeatures"
    }

    fn fit(&mut self, x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
        if !(1..=MAX_DEGREE).contains(&self.degree) {
            return Err(LoanfitError::invalid_param(
                "degree",
                self.degree,
                "must be between 1 and 5",
            ));
        }
        self.terms = self.build_terms(x.ncols());
        self.n_features_in = Some(x.ncols());
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let n_in = self.n_features_in.ok_or(LoanfitError::ModelNotFitted)?;
        check_features(n_in, x)?;

        let mut out = Array2::<f64>::zeros((x.nrows(), self.terms.len()));
        for (row, mut out_row) in x.rows().into_iter().zip(out.rows_mut()) {
            for (value, term) in out_row.iter_mut().zip(&self.terms) {
                *value = term.iter().map(|&j| row[j]).product();
            }
        }
        Ok(out)
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "degree": self.degree,
            "interaction_only": self.interaction_only,
            "include_bias": self.include_bias,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn y(n: usize) -> Array1<f64> {
        Array1::zeros(n)
    }

    #[test]
    fn test_degree_two() {
        let x = array![[2.0, 3.0], [1.0, -1.0]];
        let mut poly = PolynomialFeatures::new(2);
        let out = poly.fit_transform(&x, &y(2)).unwrap();

        // 1, x0, x1, x0^2, x0 x1, x1^2
        assert_eq!(out.row(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0, 6.0, 9.0]);
        assert_eq!(out.row(1).to_vec(), vec![1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_without_bias() {
        let x = array![[2.0, 3.0]];
        let mut poly = PolynomialFeatures::new(2).with_bias(false);
        let out = poly.fit_transform(&x, &y(1)).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![2.0, 3.0, 4.0, 6.0, 9.0]);
        assert_eq!(poly.n_output_features(), 5);
    }

    #[test]
    fn test_interaction_only() {
        let x = array![[1.0, 2.0, 3.0]];
        let mut poly = PolynomialFeatures::new(3).with_interaction_only(true);
        let out = poly.fit_transform(&x, &y(1)).unwrap();
        // 1, three singles, three pairs, one triple
        assert_eq!(out.ncols(), 8);
        assert_eq!(out[[0, 7]], 6.0);
    }

    #[test]
    fn test_feature_names() {
        let x = array![[1.0, 2.0]];
        let mut poly = PolynomialFeatures::new(2);
        poly.fit(&x, &y(1)).unwrap();
        let names = poly.feature_names(&["a".to_string(), "b".to_string()]);
        assert_eq!(names, vec!["1", "a", "b", "a^2", "a b", "b^2"]);
    }

    #[test]
    fn test_degree_out_of_range() {
        let x = array![[1.0]];
        assert!(PolynomialFeatures::new(0).fit(&x, &y(1)).is_err());
        assert!(PolynomialFeatures::new(6).fit(&x, &y(1)).is_err());
    }

    #[test]
    fn test_transform_shape_mismatch() {
        let mut poly = PolynomialFeatures::new(2);
        poly.fit(&array![[1.0, 2.0]], &y(1)).unwrap();
        assert!(poly.transform(&array![[1.0]]).is_err());
    }
}
