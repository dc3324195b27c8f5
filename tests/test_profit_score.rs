//! Integration test: profit scorer

use loanfit::scoring::{custom_prof_score, ProfitScorer};
use ndarray::array;

#[test]
fn test_worked_example() {
    let y = [false, false, true, true];
    let y_pred = [false, true, false, true];
    let score = custom_prof_score(&y, &y_pred, 0.02, 0.20);
    assert!((score - (-0.18)).abs() < 1e-12);
}

#[test]
fn test_scorer_matches_function() {
    let scorer = ProfitScorer::default();
    let y = array![0.0, 0.0, 1.0, 1.0, 0.0];
    let y_pred = array![0.0, 1.0, 0.0, 1.0, 0.0];
    let expected = custom_prof_score(
        &[false, false, true, true, false],
        &[false, true, false, true, false],
        0.02,
        0.20,
    );
    assert!((scorer.score(&y, &y_pred) - expected).abs() < 1e-12);
}

#[test]
fn test_all_declined_scores_zero() {
    let y = [false, true, false];
    let y_pred = [true, true, true];
    assert_eq!(custom_prof_score(&y, &y_pred, 0.02, 0.20), 0.0);
}

#[test]
fn test_permutation_invariance() {
    let y = [false, true, true, false, false, true, false];
    let y_pred = [false, false, true, true, false, false, false];
    let base = custom_prof_score(&y, &y_pred, 0.05, 0.3);

    let order = [6, 2, 4, 0, 5, 1, 3];
    let y_perm: Vec<bool> = order.iter().map(|&i| y[i]).collect();
    let pred_perm: Vec<bool> = order.iter().map(|&i| y_pred[i]).collect();
    assert!((custom_prof_score(&y_perm, &pred_perm, 0.05, 0.3) - base).abs() < 1e-12);
}

#[test]
fn test_custom_parameters() {
    let scorer = ProfitScorer::new(0.1, 0.5);
    // 3 repaid approvals, 1 charged-off approval
    let y = array![0.0, 0.0, 0.0, 1.0];
    let y_pred = array![0.0, 0.0, 0.0, 0.0];
    assert!((scorer.score(&y, &y_pred) - (0.3 - 0.5)).abs() < 1e-12);
}
