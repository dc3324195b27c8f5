//! Stratified holdout split

use crate::error::{LoanfitError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices of a train/test partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle-split `labels` into train and test while keeping the share of
/// positives the same in both parts.
///
/// The test part holds `ceil(test_size * n)` rows. Each class receives the
/// floor of its proportional share and the leftover rows go to the classes
/// with the largest fractional remainders.
pub fn stratified_holdout(labels: &[bool], test_size: f64, seed: u64) -> Result<SplitIndices> {
    let n = labels.len();
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(LoanfitError::invalid_param("test_size", test_size, "must be in (0, 1)"));
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(LoanfitError::ValidationError(format!(
            "cannot hold out {} of {} rows",
            n_test, n
        )));
    }

    let negatives: Vec<usize> = (0..n).filter(|&i| !labels[i]).collect();
    let positives: Vec<usize> = (0..n).filter(|&i| labels[i]).collect();
    if negatives.len() < 2 || positives.len() < 2 {
        return Err(LoanfitError::ValidationError(
            "each class needs at least two rows for a stratified split".to_string(),
        ));
    }

    let mut classes = [negatives, positives];
    let exact: Vec<f64> = classes
        .iter()
        .map(|c| n_test as f64 * c.len() as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let mut leftover = n_test - alloc.iter().sum::<usize>();

    let mut by_remainder: Vec<usize> = (0..classes.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        (exact[b] - exact[b].floor()).total_cmp(&(exact[a] - exact[a].floor()))
    });
    for &c in by_remainder.iter().cycle() {
        if leftover == 0 {
            break;
        }
        if alloc[c] < classes[c].len() {
            alloc[c] += 1;
            leftover -= 1;
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (class, &take) in classes.iter_mut().zip(alloc.iter()) {
        class.shuffle(&mut rng);
        test.extend_from_slice(&class[..take]);
        train.extend_from_slice(&class[take..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize, every: usize) -> Vec<bool> {
        (0..n).map(|i| i % every == 0).collect()
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let y = labels(100, 5);
        let split = stratified_holdout(&y, 0.2, 0).unwrap();
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);

        let mut all: Vec<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_preserves_class_share() {
        let y = labels(100, 5);
        let split = stratified_holdout(&y, 0.2, 0).unwrap();
        let test_pos = split.test.iter().filter(|&&i| y[i]).count();
        let train_pos = split.train.iter().filter(|&&i| y[i]).count();
        assert_eq!(test_pos, 4);
        assert_eq!(train_pos, 16);
    }

    #[test]
    fn test_split_is_seeded() {
        let y = labels(50, 3);
        let a = stratified_holdout(&y, 0.2, 7).unwrap();
        let b = stratified_holdout(&y, 0.2, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_class_rejected() {
        let y = vec![false; 20];
        assert!(stratified_holdout(&y, 0.2, 0).is_err());
    }
}
