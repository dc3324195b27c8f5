//! Holdout diagnostics: classification report, confusion matrix and
//! regression error summaries

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// 2x2 confusion matrix, rows are actual labels and columns predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    /// Count outcomes; values above 0.5 are positive
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut cm = ConfusionMatrix { tn: 0, fp: 0, fn_: 0, tp: 0 };
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => cm.tp += 1,
                (false, true) => cm.fp += 1,
                (false, false) => cm.tn += 1,
                (true, false) => cm.fn_ += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// Matrix in `[[tn, fp], [fn, tp]]` layout
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }
}

/// Per-class precision, recall, F1 and support
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: bool,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn from_counts(label: bool, true_pos: usize, false_pos: usize, false_neg: usize) -> Self {
        let precision = ratio(true_pos, true_pos + false_pos);
        let recall = ratio(true_pos, true_pos + false_neg);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            label,
            precision,
            recall,
            f1,
            support: true_pos + false_neg,
        }
    }
}

/// Classification report for a binary label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub negative: ClassMetrics,
    pub positive: ClassMetrics,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let cm = ConfusionMatrix::from_predictions(y_true, y_pred);
        Self {
            negative: ClassMetrics::from_counts(false, cm.tn, cm.fn_, cm.fp),
            positive: ClassMetrics::from_counts(true, cm.tp, cm.fp, cm.fn_),
            accuracy: ratio(cm.tn + cm.tp, cm.total()),
            confusion: cm,
        }
    }
}

/// Error metrics for continuous predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
    pub residuals: Vec<ResidualBin>,
}

/// Residual summary for one band of predicted values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualBin {
    pub pred_low: f64,
    pub pred_high: f64,
    pub mean_residual: f64,
    pub count: usize,
}

impl RegressionReport {
    /// Number of prediction bands in the residual table
    pub const RESIDUAL_BINS: usize = 10;

    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len().max(1) as f64;
        let residuals: Vec<f64> = y_true.iter().zip(y_pred.iter()).map(|(t, p)| t - p).collect();

        let mse = residuals.iter().map(|e| e * e).sum::<f64>() / n;
        let y_mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = residuals.iter().map(|e| e * e).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Self {
            mse,
            rmse: mse.sqrt(),
            r2,
            residuals: residual_bins(y_pred, &residuals, Self::RESIDUAL_BINS),
        }
    }
}

/// Group residuals into equal-count bands ordered by prediction
fn residual_bins(y_pred: &Array1<f64>, residuals: &[f64], n_bins: usize) -> Vec<ResidualBin> {
    let mut order: Vec<usize> = (0..residuals.len()).collect();
    order.sort_by(|&a, &b| y_pred[a].total_cmp(&y_pred[b]));

    let n_bins = n_bins.min(order.len());
    (0..n_bins)
        .filter_map(|b| {
            let start = b * order.len() / n_bins;
            let end = (b + 1) * order.len() / n_bins;
            let band = &order[start..end];
            let first = *band.first()?;
            let last = *band.last()?;
            Some(ResidualBin {
                pred_low: y_pred[first],
                pred_high: y_pred[last],
                mean_residual: band.iter().map(|&i| residuals[i]).sum::<f64>() / band.len() as f64,
                count: band.len(),
            })
        })
        .collect()
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classification_report() {
        let y_true = array![1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        let y_pred = array![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];

        let report = ClassificationReport::compute(&y_true, &y_pred);
        assert_eq!(report.confusion.as_rows(), [[3, 1], [1, 3]]);
        assert!((report.accuracy - 0.75).abs() < 1e-12);
        assert!((report.positive.precision - 0.75).abs() < 1e-12);
        assert!((report.positive.recall - 0.75).abs() < 1e-12);
        assert_eq!(report.positive.support, 4);
        assert_eq!(report.negative.support, 4);
    }

    #[test]
    fn test_no_positive_predictions() {
        let y_true = array![1.0, 0.0];
        let y_pred = array![0.0, 0.0];
        let report = ClassificationReport::compute(&y_true, &y_pred);
        assert_eq!(report.positive.precision, 0.0);
        assert_eq!(report.positive.f1, 0.0);
    }

    #[test]
    fn test_regression_report() {
        let y_true = array![0.0, 1.0, 0.0, 1.0];
        let y_pred = array![0.0, 1.0, 0.0, 1.0];
        let report = RegressionReport::compute(&y_true, &y_pred);
        assert_eq!(report.mse, 0.0);
        assert!((report.r2 - 1.0).abs() < 1e-12);
        assert_eq!(report.residuals.iter().map(|b| b.count).sum::<usize>(), 4);
    }

    #[test]
    fn test_residual_bins_are_ordered() {
        let y_true = Array1::from_vec((0..30).map(|i| (i % 2) as f64).collect());
        let y_pred = Array1::from_vec((0..30).map(|i| i as f64 / 30.0).collect());
        let report = RegressionReport::compute(&y_true, &y_pred);
        assert_eq!(report.residuals.len(), RegressionReport::RESIDUAL_BINS);
        for pair in report.residuals.windows(2) {
            assert!(pair[0].pred_high <= pair[1].pred_low);
        }
    }
}
