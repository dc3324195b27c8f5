//! K-fold splitting and fold scoring

use super::models::Model;
use crate::error::{LoanfitError, Result};
use crate::scoring::ProfitScorer;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Cross-validation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CVStrategy {
    /// Contiguous folds over row order
    KFold { n_splits: usize },
    /// Folds that keep the label share of every class
    StratifiedKFold { n_splits: usize },
}

impl CVStrategy {
    /// Stratified folds for classifiers, plain folds for regressors
    pub fn for_estimator(is_classifier: bool, n_splits: usize) -> Self {
        if is_classifier {
            CVStrategy::StratifiedKFold { n_splits }
        } else {
            CVStrategy::KFold { n_splits }
        }
    }

    pub fn n_splits(&self) -> usize {
        match self {
            CVStrategy::KFold { n_splits } | CVStrategy::StratifiedKFold { n_splits } => *n_splits,
        }
    }
}

/// A single train/test split
#[derive(Debug, Clone, PartialEq)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Cross-validation splitter
#[derive(Debug, Clone)]
pub struct CrossValidator {
    strategy: CVStrategy,
    shuffle_seed: Option<u64>,
}

impl CrossValidator {
    /// Create a splitter that keeps row order
    pub fn new(strategy: CVStrategy) -> Self {
        Self {
            strategy,
            shuffle_seed: None,
        }
    }

    /// Shuffle rows (within each class when stratified) with a fixed seed
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Generate train/test splits
    pub fn split(&self, n_samples: usize, y: Option<&Array1<f64>>) -> Result<Vec<CVSplit>> {
        let n_splits = self.strategy.n_splits();
        if n_splits < 2 {
            return Err(LoanfitError::invalid_param("cv", n_splits, "must be at least 2"));
        }
        if n_samples < n_splits {
            return Err(LoanfitError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, n_splits
            )));
        }

        let folds = match self.strategy {
            CVStrategy::KFold { .. } => self.k_fold(n_samples, n_splits),
            CVStrategy::StratifiedKFold { .. } => {
                let y = y.ok_or_else(|| {
                    LoanfitError::ValidationError("StratifiedKFold requires target array".to_string())
                })?;
                self.stratified_k_fold(y, n_splits)?
            }
        };

        Ok(folds
            .iter()
            .enumerate()
            .map(|(fold_idx, test)| {
                let mut test_indices = test.clone();
                test_indices.sort_unstable();
                let mut in_test = vec![false; n_samples];
                for &i in &test_indices {
                    in_test[i] = true;
                }
                CVSplit {
                    train_indices: (0..n_samples).filter(|&i| !in_test[i]).collect(),
                    test_indices,
                    fold_idx,
                }
            })
            .collect())
    }

    fn k_fold(&self, n_samples: usize, n_splits: usize) -> Vec<Vec<usize>> {
        let mut indices: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = self.shuffle_seed {
            indices.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
        }

        let base = n_samples / n_splits;
        let remainder = n_samples % n_splits;
        let mut folds = Vec::with_capacity(n_splits);
        let mut current = 0;
        for i in 0..n_splits {
            let size = if i < remainder { base + 1 } else { base };
            folds.push(indices[current..current + size].to_vec());
            current += size;
        }
        folds
    }

    /// Each fold receives the class counts of every `n_splits`-th row of
    /// the label-sorted target; each class then fills folds in row order.
    fn stratified_k_fold(&self, y: &Array1<f64>, n_splits: usize) -> Result<Vec<Vec<usize>>> {
        let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (idx, &v) in y.iter().enumerate() {
            by_class[usize::from(v > 0.5)].push(idx);
        }

        if by_class.iter().all(|c| c.len() < n_splits) {
            return Err(LoanfitError::ValidationError(format!(
                "n_splits={} cannot be greater than the number of members in each class",
                n_splits
            )));
        }

        if let Some(seed) = self.shuffle_seed {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for class in by_class.iter_mut() {
                class.shuffle(&mut rng);
            }
        }

        let n_neg = by_class[0].len();
        let n = y.len();
        let mut allocation = vec![[0usize; 2]; n_splits];
        for (fold, counts) in allocation.iter_mut().enumerate() {
            for pos in (fold..n).step_by(n_splits) {
                counts[usize::from(pos >= n_neg)] += 1;
            }
        }

        let mut folds = vec![Vec::new(); n_splits];
        for (class, members) in by_class.iter().enumerate() {
            let mut cursor = 0;
            for (fold, counts) in allocation.iter().enumerate() {
                let take = counts[class];
                folds[fold].extend_from_slice(&members[cursor..cursor + take]);
                cursor += take;
            }
        }
        Ok(folds)
    }
}

/// Cross-validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    /// Mean score across folds
    pub mean_score: f64,
    /// Population standard deviation of scores
    pub std_score: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let (mean_score, std_score) = mean_std(&scores);
        Self {
            n_folds: scores.len(),
            scores,
            mean_score,
            std_score,
        }
    }
}

/// Mean and population standard deviation
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Fit a fresh model per fold and score the held-out rows with the profit scorer
pub fn cross_val_score<F>(
    make_model: F,
    x: &Array2<f64>,
    y: &Array1<f64>,
    strategy: CVStrategy,
    scorer: &ProfitScorer,
) -> Result<CVResults>
where
    F: Fn() -> Box<dyn Model>,
{
    let splits = CrossValidator::new(strategy).split(x.nrows(), Some(y))?;
    let scores = splits
        .iter()
        .map(|split| {
            let mut model = make_model();
            let (x_train, y_train) = take_rows(x, y, &split.train_indices);
            let (x_test, y_test) = take_rows(x, y, &split.test_indices);
            model.fit(&x_train, &y_train)?;
            scorer.score_model(model.as_ref(), &x_test, &y_test)
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(CVResults::from_scores(scores))
}

/// Rows of `x` and `y` at `indices`
pub fn take_rows(x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> (Array2<f64>, Array1<f64>) {
    (x.select(Axis(0), indices), y.select(Axis(0), indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_fold() {
        let cv = CrossValidator::new(CVStrategy::KFold { n_splits: 5 });
        let splits = cv.split(100, None).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.test_indices.len(), 20);
            assert_eq!(split.train_indices.len(), 80);
        }

        let mut all_test: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
        all_test.sort();
        assert_eq!(all_test, (0..100).collect::<Vec<_>>());
        assert_eq!(splits[0].test_indices, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_stratified_k_fold() {
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);

        let cv = CrossValidator::new(CVStrategy::StratifiedKFold { n_splits: 5 });
        let splits = cv.split(10, Some(&y)).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.test_indices.len(), 2);
            let positives = split.test_indices.iter().filter(|&&i| y[i] > 0.5).count();
            assert_eq!(positives, 1);
        }
    }

    #[test]
    fn test_stratified_uneven_classes() {
        let y: Array1<f64> = (0..23).map(|i| if i % 4 == 0 { 1.0 } else { 0.0 }).collect();
        let cv = CrossValidator::new(CVStrategy::StratifiedKFold { n_splits: 3 });
        let splits = cv.split(23, Some(&y)).unwrap();

        let sizes: Vec<usize> = splits.iter().map(|s| s.test_indices.len()).collect();
        assert_eq!(sizes.iter().sum::<usize>(), 23);
        assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
        for split in &splits {
            let positives = split.test_indices.iter().filter(|&&i| y[i] > 0.5).count();
            assert!((1..=3).contains(&positives));
        }
    }

    #[test]
    fn test_too_many_splits() {
        let cv = CrossValidator::new(CVStrategy::KFold { n_splits: 5 });
        assert!(cv.split(3, None).is_err());
    }

    #[test]
    fn test_cv_results() {
        let results = CVResults::from_scores(vec![1.0, 2.0, 3.0]);
        assert!((results.mean_score - 2.0).abs() < 1e-12);
        assert!((results.std_score - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_shuffled_k_fold_is_seeded() {
        let splits = |seed| {
            CrossValidator::new(CVStrategy::KFold { n_splits: 4 })
                .with_shuffle(seed)
                .split(40, None)
                .unwrap()
        };
        let a = splits(7);
        assert_eq!(a, splits(7));
        assert_ne!(a[0].test_indices, (0..10).collect::<Vec<_>>());

        let mut covered: Vec<usize> = a.iter().flat_map(|s| s.test_indices.clone()).collect();
        covered.sort_unstable();
        assert_eq!(covered, (0..40).collect::<Vec<_>>());
    }
}
