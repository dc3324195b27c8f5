//! Truncated SVD
//!
//! Projects the uncentered matrix onto its top right-singular vectors.
//! The vectors are the leading eigenvectors of `XᵀX`, extracted one at a
//! time by power iteration with deflation.

use crate::error::{LoanfitError, Result};
use crate::pipeline::PipelineStage;
use crate::training::linear_models::check_features;
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

const MAX_ITER: usize = 300;
const TOL: f64 = 1e-9;

/// Truncated singular value decomposition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruncatedSvd {
    n_components: usize,
    random_state: u64,
    /// n_components x n_features
    components: Option<Array2<f64>>,
    pub singular_values: Vec<f64>,
}

impl TruncatedSvd {
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            random_state: 0,
            components: None,
            singular_values: Vec::new(),
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }

    pub fn components(&self) -> Option<&Array2<f64>> {
        self.components.as_ref()
    }

    fn leading_eigenvector(gram: &Array2<f64>, rng: &mut Xoshiro256PlusPlus) -> (f64, Array1<f64>) {
        let d = gram.nrows();
        let mut v = Array1::from_shape_fn(d, |_| rng.gen_range(-1.0f64..1.0));
        let norm = v.dot(&v).sqrt().max(1e-12);
        v /= norm;

        for _ in 0..MAX_ITER {
            let w = gram.dot(&v);
            let w_norm = w.dot(&w).sqrt();
            if w_norm < 1e-300 {
                // Remaining spectrum is zero
                return (0.0, v);
            }
            let next = w / w_norm;
            let change = (&next - &v).mapv(f64::abs).sum();
            v = next;
            if change < TOL {
                break;
            }
        }
        let eigenvalue = v.dot(&gram.dot(&v));

        // Sign convention: largest-magnitude loading is positive
        let pivot = v
            .iter()
            .copied()
            .fold(0.0f64, |m, x| if x.abs() > m.abs() { x } else { m });
        if pivot < 0.0 {
            v.mapv_inplace(|x| -x);
        }
        (eigenvalue.max(0.0), v)
    }
}

impl PipelineStage for TruncatedSvd {
    fn name(&self) -> &'static str {
        "TruncatedSVD"
    }

    fn fit(&mut self, x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
        let d = x.ncols();
        if self.n_components == 0 || self.n_components > d {
            return Err(LoanfitError::invalid_param(
                "n_components",
                self.n_components,
                &format!("must be between 1 and the number of features ({})", d),
            ));
        }

        let mut gram = x.t().dot(x);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.random_state);
        let mut components = Array2::<f64>::zeros((self.n_components, d));
        self.singular_values.clear();

        for k in 0..self.n_components {
            let (eigenvalue, v) = Self::leading_eigenvector(&gram, &mut rng);
            // Deflate: A ← A - λ v vᵀ
            let outer = v
                .view()
                .insert_axis(Axis(1))
                .dot(&v.view().insert_axis(Axis(0)));
            gram.scaled_add(-eigenvalue, &outer);

            components.row_mut(k).assign(&v);
            self.singular_values.push(eigenvalue.sqrt());
        }

        debug!(n_components = self.n_components, "TruncatedSVD fitted");
        self.components = Some(components);
        Ok(())
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let components = self.components.as_ref().ok_or(LoanfitError::ModelNotFitted)?;
        check_features(components.ncols(), x)?;
        Ok(x.dot(&components.t()))
    }

    fn params(&self) -> serde_json::Value {
        json!({ "n_components": self.n_components, "random_state": self.random_state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn y(n: usize) -> Array1<f64> {
        Array1::zeros(n)
    }

    #[test]
    fn test_seed_does_not_change_components() {
        let x = ndarray::array![[3.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0, 1.0]];
        let mut a = TruncatedSvd::new(2);
        let mut b = TruncatedSvd::new(2).with_random_state(11);
        let ta = a.fit_transform(&x, &y(4)).unwrap();
        let tb = b.fit_transform(&x, &y(4)).unwrap();
        for (u, v) in ta.iter().zip(tb.iter()) {
            assert!((u - v).abs() < 1e-6);
        }
        assert_eq!(b.params()["random_state"], 11);
    }

    #[test]
    fn test_recovers_dominant_direction() {
        // Rows lie along (1, 1, 0) with a small spread along (0, 0, 1)
        let x = Array2::from_shape_fn((20, 3), |(i, j)| match j {
            0 | 1 => i as f64,
            _ => (i % 2) as f64 * 0.1,
        });
        let mut svd = TruncatedSvd::new(1);
        svd.fit(&x, &y(20)).unwrap();

        let c = svd.components().unwrap().row(0).to_owned();
        let expected = 1.0 / 2f64.sqrt();
        assert!((c[0] - expected).abs() < 1e-3);
        assert!((c[1] - expected).abs() < 1e-3);
        assert!(c[2].abs() < 1e-2);
    }

    #[test]
    fn test_components_orthonormal() {
        // Orthogonal Walsh columns with distinct scales
        let scales = [10.0, 5.0, 2.0, 1.0];
        let x = Array2::from_shape_fn((32, 4), |(i, j)| {
            let sign = if j == 0 || (i >> (j - 1)) % 2 == 0 { 1.0 } else { -1.0 };
            scales[j] * sign
        });
        let mut svd = TruncatedSvd::new(3);
        let out = svd.fit_transform(&x, &y(32)).unwrap();
        assert_eq!(out.dim(), (32, 3));

        let c = svd.components().unwrap();
        let gram = c.dot(&c.t());
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((gram[[i, j]] - expected).abs() < 1e-4, "{:?}", gram);
            }
        }
        assert!(svd.singular_values.windows(2).all(|w| w[0] >= w[1] - 1e-9));
    }

    #[test]
    fn test_too_many_components() {
        let x = Array2::<f64>::ones((5, 2));
        assert!(TruncatedSvd::new(3).fit(&x, &y(5)).is_err());
    }

    #[test]
    fn test_deterministic() {
        let x = Array2::from_shape_fn((10, 3), |(i, j)| (i + j * j) as f64);
        let a = TruncatedSvd::new(2).fit_transform(&x, &y(10)).unwrap();
        let b = TruncatedSvd::new(2).fit_transform(&x, &y(10)).unwrap();
        assert_eq!(a, b);
    }
}
