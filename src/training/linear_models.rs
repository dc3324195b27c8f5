//! Linear model implementations

use super::cross_validation::{take_rows, CVStrategy, CrossValidator};
use super::models::{ClassWeight, Model};
use super::spectral_norm_sq;
use crate::error::{LoanfitError, Result};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

pub(crate) fn check_rows(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(LoanfitError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(LoanfitError::ValidationError("cannot fit on zero rows".to_string()));
    }
    Ok(())
}

pub(crate) fn check_features(expected: usize, x: &Array2<f64>) -> Result<()> {
    if x.ncols() != expected {
        return Err(LoanfitError::ShapeError {
            expected: format!("{} features", expected),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}

/// Column means and the centered copies of `x` and `y`
fn center(x: &Array2<f64>, y: &Array1<f64>) -> (Array2<f64>, Array1<f64>, Array1<f64>, f64) {
    let x_mean = x
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(x.ncols()));
    let y_mean = y.mean().unwrap_or(0.0);
    let x_c = x - &x_mean.view().insert_axis(Axis(0));
    let y_c = y - y_mean;
    (x_c, y_c, x_mean, y_mean)
}

/// Solve the symmetric positive-definite system `a x = b` by Cholesky
/// decomposition, adding a small diagonal jitter once if `a` is not PD.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let jitter = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64;
    for ridge in [0.0, jitter] {
        let mut l = Array2::<f64>::zeros((n, n));
        let mut positive_definite = true;
        'outer: for i in 0..n {
            for j in 0..=i {
                let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
                if i == j {
                    let diag = a[[i, i]] + ridge - sum;
                    if diag <= 0.0 {
                        positive_definite = false;
                        break 'outer;
                    }
                    l[[i, j]] = diag.sqrt();
                } else {
                    l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
                }
            }
        }
        if !positive_definite {
            continue;
        }

        // Forward substitution: L * z = b
        let mut z = Array1::<f64>::zeros(n);
        for i in 0..n {
            let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
            z[i] = (b[i] - sum) / l[[i, i]];
        }
        // Backward substitution: L^T * x = z
        let mut x = Array1::<f64>::zeros(n);
        for i in (0..n).rev() {
            let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
            x[i] = (z[i] - sum) / l[[i, i]];
        }
        return Some(x);
    }
    None
}

/// Gauss-Jordan inverse with partial pivoting
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    let mut aug = Array2::<f64>::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| aug[[a, col]].abs().total_cmp(&aug[[b, col]].abs()))?;
        if aug[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for j in 0..2 * n {
                aug.swap([col, j], [pivot, j]);
            }
        }

        let p = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= p;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                if factor != 0.0 {
                    for j in 0..2 * n {
                        aug[[row, j]] -= factor * aug[[col, j]];
                    }
                }
            }
        }
    }

    Some(aug.slice(ndarray::s![.., n..]).to_owned())
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn mse(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    (a - b).mapv(|v| v * v).mean().unwrap_or(0.0)
}

/// Logistic regression for binary classification (L2 penalty)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: f64,
    /// Inverse regularization strength
    pub c: f64,
    /// Sample weighting by class
    pub class_weight: ClassWeight,
    /// Maximum iterations
    pub max_iter: usize,
    /// Gradient-norm tolerance
    pub tol: f64,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            c: 1.0,
            class_weight: ClassWeight::Uniform,
            max_iter: 1000,
            tol: 1e-6,
            is_fitted: false,
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fit by gradient descent on the weighted log-loss with step `1 / L`,
    /// `L` being the Lipschitz constant of the gradient.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_rows(x, y)?;
        if self.c <= 0.0 {
            return Err(LoanfitError::invalid_param("C", self.c, "must be positive"));
        }

        let n = x.nrows() as f64;
        let sw = self.class_weight.sample_weights(y);
        let max_w = sw.iter().copied().fold(0.0f64, f64::max);
        let penalty = 1.0 / (self.c * n);
        let lipschitz = 0.25 * max_w * (spectral_norm_sq(x) + n) / n + penalty;
        let step = 1.0 / lipschitz;

        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            iterations = iter + 1;
            let p = (x.dot(&w) + b).mapv(sigmoid);
            let err = (&p - y) * &sw;
            let dw = x.t().dot(&err) / n + &w * penalty;
            let db = err.sum() / n;

            let grad_norm = (dw.dot(&dw) + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            w.scaled_add(-step, &dw);
            b -= step * db;
        }

        debug!(iterations, n_features = x.ncols(), "LogisticRegression fitted");
        self.coefficients = Some(w);
        self.intercept = b;
        self.is_fitted = true;
        Ok(self)
    }

    fn fitted_coef(&self) -> Result<&Array1<f64>> {
        match (&self.coefficients, self.is_fitted) {
            (Some(coef), true) => Ok(coef),
            _ => Err(LoanfitError::ModelNotFitted),
        }
    }

    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coef = self.fitted_coef()?;
        check_features(coef.len(), x)?;
        Ok(x.dot(coef) + self.intercept)
    }

    /// Probability of the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self
            .decision_function(x)?
            .mapv(|z| if z > 0.0 { 1.0 } else { 0.0 }))
    }
}

impl Model for LogisticRegression {
    fn name(&self) -> &'static str {
        "LogisticRegression"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        LogisticRegression::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        LogisticRegression::predict(self, x)
    }

    fn is_classifier(&self) -> bool {
        true
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.coefficients.as_ref().map(|c| c.mapv(f64::abs))
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "penalty": "l2",
            "C": self.c,
            "class_weight": self.class_weight.to_string(),
            "max_iter": self.max_iter,
        })
    }
}

/// Ridge Regression (L2-regularized linear regression)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
    /// L2 regularization strength
    pub alpha: f64,
    pub is_fitted: bool,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            alpha,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_rows(x, y)?;
        if self.alpha < 0.0 {
            return Err(LoanfitError::invalid_param("alpha", self.alpha, "must be non-negative"));
        }

        let (x_c, y_c, x_mean, y_mean) = center(x, y);
        let mut xtx = x_c.t().dot(&x_c);
        for i in 0..x.ncols() {
            xtx[[i, i]] += self.alpha;
        }
        let xty = x_c.t().dot(&y_c);

        let coefficients = match cholesky_solve(&xtx, &xty) {
            Some(result) => result,
            None => matrix_inverse(&xtx)
                .map(|inv| inv.dot(&xty))
                .ok_or_else(|| LoanfitError::ComputationError("Singular matrix".to_string()))?,
        };

        self.intercept = y_mean - coefficients.dot(&x_mean);
        self.coefficients = Some(coefficients);
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match &self.coefficients {
            Some(coef) if self.is_fitted => {
                check_features(coef.len(), x)?;
                Ok(x.dot(coef) + self.intercept)
            }
            _ => Err(LoanfitError::ModelNotFitted),
        }
    }
}

impl Model for RidgeRegression {
    fn name(&self) -> &'static str {
        "Ridge"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        RidgeRegression::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        RidgeRegression::predict(self, x)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.coefficients.as_ref().map(|c| c.mapv(f64::abs))
    }

    fn params(&self) -> serde_json::Value {
        json!({ "alpha": self.alpha })
    }
}

/// Ridge with alpha chosen by efficient leave-one-out error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeCV {
    pub alphas: Vec<f64>,
    /// Alpha picked on the last fit
    pub alpha: Option<f64>,
    /// Leave-one-out MSE per candidate alpha
    pub loo_mse: Vec<f64>,
    inner: Option<RidgeRegression>,
}

impl RidgeCV {
    pub fn new(alphas: Vec<f64>) -> Self {
        Self {
            alphas,
            alpha: None,
            loo_mse: Vec::new(),
            inner: None,
        }
    }

    /// For each alpha the hat-matrix diagonal gives the leave-one-out
    /// residual `(y_i - ŷ_i) / (1 - h_ii)` without refitting.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_rows(x, y)?;
        if self.alphas.is_empty() || self.alphas.iter().any(|&a| a <= 0.0) {
            return Err(LoanfitError::invalid_param(
                "alphas",
                format!("{:?}", self.alphas),
                "must be a non-empty list of positive values",
            ));
        }

        let n = x.nrows() as f64;
        let (x_c, y_c, _, _) = center(x, y);
        let xtx = x_c.t().dot(&x_c);
        let xty = x_c.t().dot(&y_c);

        let loo_mse = self
            .alphas
            .iter()
            .map(|&alpha| {
                let mut a = xtx.clone();
                for i in 0..a.nrows() {
                    a[[i, i]] += alpha;
                }
                let inv = matrix_inverse(&a).ok_or_else(|| {
                    LoanfitError::ComputationError(format!("Singular matrix at alpha={}", alpha))
                })?;
                let coef = inv.dot(&xty);
                let fitted = x_c.dot(&coef);
                let hat_diag = (&x_c.dot(&inv) * &x_c).sum_axis(Axis(1)) + 1.0 / n;
                let loo: f64 = y_c
                    .iter()
                    .zip(fitted.iter())
                    .zip(hat_diag.iter())
                    .map(|((yi, fi), hi)| ((yi - fi) / (1.0 - hi).max(1e-12)).powi(2))
                    .sum();
                Ok(loo / n)
            })
            .collect::<Result<Vec<f64>>>()?;

        let best = loo_mse
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| self.alphas[i])
            .unwrap_or(1.0);

        debug!(alpha = best, candidates = self.alphas.len(), "RidgeCV selected alpha");
        let mut inner = RidgeRegression::new(best);
        inner.fit(x, y)?;
        self.alpha = Some(best);
        self.loo_mse = loo_mse;
        self.inner = Some(inner);
        Ok(self)
    }
}

impl Model for RidgeCV {
    fn name(&self) -> &'static str {
        "RidgeCV"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        RidgeCV::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.inner
            .as_ref()
            .ok_or(LoanfitError::ModelNotFitted)?
            .predict(x)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.inner.as_ref().and_then(|m| m.feature_importances())
    }

    fn params(&self) -> serde_json::Value {
        json!({ "alphas": self.alphas })
    }
}

/// Lasso Regression (L1-regularized via coordinate descent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: f64,
    /// L1 regularization strength
    pub alpha: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub is_fitted: bool,
}

impl Default for LassoRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl LassoRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            alpha,
            max_iter: 1000,
            tol: 1e-6,
            is_fitted: false,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Soft-threshold operator for L1 proximal step
    pub(crate) fn soft_threshold(val: f64, threshold: f64) -> f64 {
        if val > threshold {
            val - threshold
        } else if val < -threshold {
            val + threshold
        } else {
            0.0
        }
    }

    /// Minimizes `||y - Xw||² / (2n) + alpha * ||w||₁`
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_rows(x, y)?;
        if self.alpha < 0.0 {
            return Err(LoanfitError::invalid_param("alpha", self.alpha, "must be non-negative"));
        }

        let n_features = x.ncols();
        let (x_c, y_c, x_mean, y_mean) = center(x, y);
        let col_norms: Vec<f64> = (0..n_features)
            .map(|j| x_c.column(j).mapv(|v| v * v).sum())
            .collect();

        let mut w = Array1::<f64>::zeros(n_features);
        let lambda = self.alpha * x.nrows() as f64;
        let mut r = y_c.clone();

        for _iter in 0..self.max_iter {
            let mut max_change = 0.0f64;
            for j in 0..n_features {
                if col_norms[j] < 1e-15 {
                    continue;
                }
                let col = x_c.column(j);
                let rho = col.dot(&r) + col_norms[j] * w[j];
                let old = w[j];
                w[j] = Self::soft_threshold(rho, lambda) / col_norms[j];
                let delta = old - w[j];
                if delta != 0.0 {
                    r.scaled_add(delta, &col);
                    max_change = max_change.max(delta.abs());
                }
            }
            if max_change < self.tol {
                break;
            }
        }

        self.intercept = y_mean - w.dot(&x_mean);
        self.coefficients = Some(w);
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match &self.coefficients {
            Some(coef) if self.is_fitted => {
                check_features(coef.len(), x)?;
                Ok(x.dot(coef) + self.intercept)
            }
            _ => Err(LoanfitError::ModelNotFitted),
        }
    }
}

impl Model for LassoRegression {
    fn name(&self) -> &'static str {
        "Lasso"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        LassoRegression::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        LassoRegression::predict(self, x)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.coefficients.as_ref().map(|c| c.mapv(f64::abs))
    }

    fn params(&self) -> serde_json::Value {
        json!({ "alpha": self.alpha })
    }
}

/// Lasso with alpha chosen by k-fold mean squared error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoCV {
    /// Candidate alphas; `None` derives a log-spaced path from the data
    pub alphas: Option<Vec<f64>>,
    pub n_alphas: usize,
    /// Ratio of the smallest to the largest alpha on a derived path
    pub eps: f64,
    pub cv: usize,
    /// Alpha picked on the last fit
    pub alpha: Option<f64>,
    /// Mean fold MSE per candidate alpha
    pub mse_path: Vec<f64>,
    inner: Option<LassoRegression>,
}

impl Default for LassoCV {
    fn default() -> Self {
        Self {
            alphas: None,
            n_alphas: 100,
            eps: 1e-3,
            cv: 5,
            alpha: None,
            mse_path: Vec::new(),
            inner: None,
        }
    }
}

impl LassoCV {
    pub fn new(alphas: Vec<f64>) -> Self {
        Self {
            alphas: Some(alphas),
            ..Self::default()
        }
    }

    /// Log-spaced path from the smallest alpha that zeroes every coefficient
    fn alpha_path(&self, x: &Array2<f64>, y: &Array1<f64>) -> Vec<f64> {
        let (x_c, y_c, _, _) = center(x, y);
        let n = x.nrows() as f64;
        let alpha_max = x_c
            .t()
            .dot(&y_c)
            .iter()
            .fold(0.0f64, |m, v| m.max(v.abs()))
            / n;
        if alpha_max <= 0.0 || self.n_alphas < 2 {
            return vec![self.eps];
        }
        let (hi, lo) = (alpha_max.ln(), (alpha_max * self.eps).ln());
        (0..self.n_alphas)
            .map(|i| (hi + (lo - hi) * i as f64 / (self.n_alphas - 1) as f64).exp())
            .collect()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_rows(x, y)?;
        let alphas = match &self.alphas {
            Some(a) if !a.is_empty() && a.iter().all(|&v| v >= 0.0) => a.clone(),
            Some(a) => {
                return Err(LoanfitError::invalid_param(
                    "alphas",
                    format!("{:?}", a),
                    "must be a non-empty list of non-negative values",
                ))
            }
            None => self.alpha_path(x, y),
        };

        let splits = CrossValidator::new(CVStrategy::KFold { n_splits: self.cv }).split(x.nrows(), None)?;
        let mse_path = alphas
            .par_iter()
            .map(|&alpha| {
                let fold_mse = splits
                    .iter()
                    .map(|split| {
                        let (x_train, y_train) = take_rows(x, y, &split.train_indices);
                        let (x_test, y_test) = take_rows(x, y, &split.test_indices);
                        let mut model = LassoRegression::new(alpha);
                        model.fit(&x_train, &y_train)?;
                        Ok(mse(&model.predict(&x_test)?, &y_test))
                    })
                    .collect::<Result<Vec<f64>>>()?;
                Ok(fold_mse.iter().sum::<f64>() / fold_mse.len() as f64)
            })
            .collect::<Result<Vec<f64>>>()?;

        let best = mse_path
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| alphas[i])
            .unwrap_or(1.0);

        debug!(alpha = best, candidates = alphas.len(), "LassoCV selected alpha");
        let mut inner = LassoRegression::new(best);
        inner.fit(x, y)?;
        self.alpha = Some(best);
        self.mse_path = mse_path;
        self.inner = Some(inner);
        Ok(self)
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.inner.as_ref().and_then(|m| m.coefficients.as_ref())
    }
}

impl Model for LassoCV {
    fn name(&self) -> &'static str {
        "LassoCV"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        LassoCV::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.inner
            .as_ref()
            .ok_or(LoanfitError::ModelNotFitted)?
            .predict(x)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.coefficients().map(|c| c.mapv(f64::abs))
    }

    fn params(&self) -> serde_json::Value {
        match &self.alphas {
            Some(alphas) => json!({ "alphas": alphas, "cv": self.cv }),
            None => json!({ "n_alphas": self.n_alphas, "eps": self.eps, "cv": self.cv }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [-2.0, 0.5],
            [-1.5, -0.3],
            [-1.0, 0.1],
            [-0.5, -0.2],
            [0.5, 0.3],
            [1.0, -0.1],
            [1.5, 0.2],
            [2.0, -0.4]
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_logistic_regression() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new().with_class_weight(ClassWeight::Balanced);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert_eq!(pred, y);
        let proba = model.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_logistic_not_fitted() {
        let model = LogisticRegression::new();
        assert!(matches!(
            model.predict(&array![[1.0, 2.0]]),
            Err(LoanfitError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_ridge_regression() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![2.0, 4.0, 6.0, 8.0, 10.0];
        let mut model = RidgeRegression::new(0.0);
        model.fit(&x, &y).unwrap();
        let coef = model.coefficients.as_ref().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-6);
        assert!(model.intercept.abs() < 1e-6);
    }

    #[test]
    fn test_ridge_cv_prefers_small_alpha_on_clean_data() {
        let x = array![[1.0, 0.3], [2.0, -0.1], [3.0, 0.4], [4.0, 0.0], [5.0, -0.2], [6.0, 0.1]];
        let y = x.column(0).mapv(|v| 3.0 * v + 1.0);
        let mut model = RidgeCV::new(vec![0.001, 10.0, 1000.0]);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.alpha, Some(0.001));
        assert_eq!(model.loo_mse.len(), 3);
    }

    #[test]
    fn test_lasso_zeroes_noise_feature() {
        let x = array![
            [1.0, 0.01],
            [2.0, -0.02],
            [3.0, 0.015],
            [4.0, -0.01],
            [5.0, 0.02],
            [6.0, -0.015]
        ];
        let y = x.column(0).mapv(|v| 2.0 * v);
        let mut model = LassoRegression::new(0.1);
        model.fit(&x, &y).unwrap();
        let coef = model.coefficients.as_ref().unwrap();
        assert!(coef[0] > 1.5);
        assert_eq!(coef[1], 0.0);
    }

    #[test]
    fn test_lasso_cv_with_grid() {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| if j == 0 { i as f64 / 10.0 } else { ((i * 7) % 5) as f64 });
        let y = x.column(0).mapv(|v| 0.5 * v);
        let mut model = LassoCV::new(vec![0.001, 0.5, 5.0]);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.alpha, Some(0.001));
        assert_eq!(model.predict(&x).unwrap().len(), 40);
    }

    #[test]
    fn test_lasso_cv_derived_path() {
        let x = Array2::from_shape_fn((30, 3), |(i, j)| ((i + 1) * (j + 2) % 7) as f64);
        let y = x.column(1).to_owned();
        let model = LassoCV::default();
        let path = model.alpha_path(&x, &y);
        assert_eq!(path.len(), 100);
        assert!(path.windows(2).all(|w| w[0] > w[1]));
    }
}
