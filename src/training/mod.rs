//! Estimators and the resampling helpers used to evaluate them

pub mod cross_validation;
pub mod gradient_boosting;
pub mod linear_models;
pub mod models;
pub mod svm;
pub mod tree;
pub mod voting;

pub use cross_validation::{cross_val_score, mean_std, take_rows, CVResults, CVSplit, CVStrategy, CrossValidator};
pub use gradient_boosting::{EarlyStopping, HistGradientBoostingConfig, HistGradientBoostingRegressor};
pub use linear_models::{LassoCV, LassoRegression, LogisticRegression, RidgeCV, RidgeRegression};
pub use models::{balanced_sample_weights, ClassWeight, Model};
pub use svm::{LinearSVC, Penalty};
pub use tree::{BinMapper, HistogramTree};
pub use voting::VotingRegressor;

use ndarray::{Array1, Array2};

/// `num` evenly spaced values from `start` to `stop`, both included
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num)
                .map(|i| if i == num - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Upper estimate of the largest eigenvalue of `xᵀx`, by power iteration
pub(crate) fn spectral_norm_sq(x: &Array2<f64>) -> f64 {
    let d = x.ncols();
    if d == 0 || x.nrows() == 0 {
        return 0.0;
    }

    let mut v = Array1::from_elem(d, 1.0 / (d as f64).sqrt());
    let mut lambda = 0.0;
    for _ in 0..50 {
        let w = x.t().dot(&x.dot(&v));
        let norm = w.dot(&w).sqrt();
        if norm < 1e-300 {
            return 0.0;
        }
        lambda = norm;
        v = w / norm;
    }
    // Power iteration approaches from below
    lambda * 1.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(0.3, 0.9, 1), vec![0.3]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.01, 0.2, 10).len(), 10);
    }

    #[test]
    fn test_spectral_norm() {
        let x = array![[3.0, 0.0], [0.0, 1.0]];
        let s = spectral_norm_sq(&x);
        assert!(s >= 9.0 && s <= 9.0 * 1.1 + 1e-9);
    }
}
