//! Histogram-based regression tree used by gradient boosting
//!
//! Features are bucketed once into at most 255 bins; split search then
//! works on per-bin residual sums instead of sorted raw values.

use crate::error::{LoanfitError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Maps raw feature values to bin indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinMapper {
    pub max_bins: usize,
    /// Upper edges per feature; bin `k` holds values `<= thresholds[k]`
    thresholds: Vec<Vec<f64>>,
}

impl BinMapper {
    pub fn new(max_bins: usize) -> Self {
        Self {
            max_bins: max_bins.clamp(2, 256),
            thresholds: Vec::new(),
        }
    }

    /// Midpoints between distinct values when they fit in `max_bins`,
    /// otherwise midpoints between evenly spaced quantiles.
    pub fn fit(&mut self, x: &Array2<f64>) -> &mut Self {
        self.thresholds = x
            .columns()
            .into_iter()
            .map(|col| {
                let mut values: Vec<f64> = col.iter().copied().filter(|v| v.is_finite()).collect();
                values.sort_by(f64::total_cmp);
                values.dedup();

                let distinct = if values.len() <= self.max_bins {
                    values
                } else {
                    let last = values.len() - 1;
                    let mut picked: Vec<f64> = (0..self.max_bins)
                        .map(|q| values[q * last / (self.max_bins - 1)])
                        .collect();
                    picked.dedup();
                    picked
                };
                distinct.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
            })
            .collect();
        self
    }

    pub fn n_features(&self) -> usize {
        self.thresholds.len()
    }

    pub fn n_bins(&self, feature: usize) -> usize {
        self.thresholds[feature].len() + 1
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<u8>> {
        if x.ncols() != self.thresholds.len() {
            return Err(LoanfitError::ShapeError {
                expected: format!("{} features", self.thresholds.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(Array2::from_shape_fn(x.dim(), |(i, j)| {
            let edges = &self.thresholds[j];
            edges.partition_point(|&edge| edge < x[[i, j]]) as u8
        }))
    }
}

/// Tree node stored in a flat arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HistNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        /// Rows with bin `<= bin` go left
        bin: u8,
        left: usize,
        right: usize,
        n_samples: usize,
        gain: f64,
    },
}

#[derive(Debug, Clone, Copy)]
struct SplitInfo {
    feature: usize,
    bin: u8,
    gain: f64,
}

struct GrowingLeaf {
    node: usize,
    indices: Vec<usize>,
    depth: usize,
    split: Option<SplitInfo>,
}

/// Least-squares regression tree grown best-first on binned features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramTree {
    nodes: Vec<HistNode>,
    pub max_leaf_nodes: usize,
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub l2_regularization: f64,
    feature_importances: Option<Array1<f64>>,
}

impl Default for HistogramTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HistogramTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            max_leaf_nodes: 31,
            max_depth: None,
            min_samples_leaf: 20,
            l2_regularization: 0.0,
            feature_importances: None,
        }
    }

    pub fn with_max_leaf_nodes(mut self, max_leaf_nodes: usize) -> Self {
        self.max_leaf_nodes = max_leaf_nodes.max(2);
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf.max(1);
        self
    }

    pub fn with_l2_regularization(mut self, l2: f64) -> Self {
        self.l2_regularization = l2.max(0.0);
        self
    }

    /// Fit on binned features against `target` (the boosting residuals)
    pub fn fit(&mut self, binned: &Array2<u8>, n_bins: &[usize], target: &Array1<f64>) -> Result<&mut Self> {
        if binned.nrows() != target.len() {
            return Err(LoanfitError::ShapeError {
                expected: format!("target length = {}", binned.nrows()),
                actual: format!("target length = {}", target.len()),
            });
        }

        let mut importances = vec![0.0; binned.ncols()];
        let all: Vec<usize> = (0..binned.nrows()).collect();
        let root = HistNode::Leaf {
            value: self.leaf_value(target, &all),
            n_samples: all.len(),
        };
        self.nodes = vec![root];

        let root_split = self.find_best_split(binned, n_bins, target, &all, 0);
        let mut growing = vec![GrowingLeaf {
            node: 0,
            indices: all,
            depth: 0,
            split: root_split,
        }];
        let mut n_leaves = 1;

        while n_leaves < self.max_leaf_nodes {
            let best = growing
                .iter()
                .enumerate()
                .filter_map(|(pos, leaf)| leaf.split.map(|s| (pos, s.gain)))
                .max_by(|a, b| a.1.total_cmp(&b.1));
            let Some((pos, _)) = best else { break };

            let leaf = growing.swap_remove(pos);
            let Some(split) = leaf.split else { break };
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = leaf
                .indices
                .iter()
                .copied()
                .partition(|&i| binned[[i, split.feature]] <= split.bin);

            let left = self.nodes.len();
            let right = left + 1;
            let left_leaf = HistNode::Leaf {
                value: self.leaf_value(target, &left_idx),
                n_samples: left_idx.len(),
            };
            let right_leaf = HistNode::Leaf {
                value: self.leaf_value(target, &right_idx),
                n_samples: right_idx.len(),
            };
            self.nodes.push(left_leaf);
            self.nodes.push(right_leaf);
            self.nodes[leaf.node] = HistNode::Split {
                feature: split.feature,
                bin: split.bin,
                left,
                right,
                n_samples: leaf.indices.len(),
                gain: split.gain,
            };
            importances[split.feature] += split.gain;
            n_leaves += 1;

            let depth = leaf.depth + 1;
            for (node, indices) in [(left, left_idx), (right, right_idx)] {
                let split = self.find_best_split(binned, n_bins, target, &indices, depth);
                growing.push(GrowingLeaf {
                    node,
                    indices,
                    depth,
                    split,
                });
            }
        }

        self.feature_importances = Some(Array1::from_vec(importances));
        Ok(self)
    }

    fn leaf_value(&self, target: &Array1<f64>, indices: &[usize]) -> f64 {
        let sum: f64 = indices.iter().map(|&i| target[i]).sum();
        sum / (indices.len() as f64 + self.l2_regularization).max(1e-12)
    }

    fn find_best_split(
        &self,
        binned: &Array2<u8>,
        n_bins: &[usize],
        target: &Array1<f64>,
        indices: &[usize],
        depth: usize,
    ) -> Option<SplitInfo> {
        if self.max_depth.is_some_and(|d| depth >= d) || indices.len() < 2 * self.min_samples_leaf {
            return None;
        }

        let lambda = self.l2_regularization;
        let total_sum: f64 = indices.iter().map(|&i| target[i]).sum();
        let total_count = indices.len();
        let parent_score = total_sum * total_sum / (total_count as f64 + lambda);

        // Each feature scans its own histogram
        (0..binned.ncols())
            .into_par_iter()
            .filter_map(|feature| {
                let bins = n_bins[feature];
                if bins < 2 {
                    return None;
                }
                let mut sums = vec![0.0f64; bins];
                let mut counts = vec![0usize; bins];
                for &i in indices {
                    let b = binned[[i, feature]] as usize;
                    sums[b] += target[i];
                    counts[b] += 1;
                }

                let mut best: Option<SplitInfo> = None;
                let mut left_sum = 0.0;
                let mut left_count = 0usize;
                for b in 0..bins - 1 {
                    left_sum += sums[b];
                    left_count += counts[b];
                    let right_count = total_count - left_count;
                    if left_count < self.min_samples_leaf {
                        continue;
                    }
                    if right_count < self.min_samples_leaf {
                        break;
                    }
                    let right_sum = total_sum - left_sum;
                    let gain = left_sum * left_sum / (left_count as f64 + lambda)
                        + right_sum * right_sum / (right_count as f64 + lambda)
                        - parent_score;
                    if gain > 1e-12 && best.map_or(true, |s| gain > s.gain) {
                        best = Some(SplitInfo {
                            feature,
                            bin: b as u8,
                            gain,
                        });
                    }
                }
                best
            })
            .max_by(|a, b| a.gain.total_cmp(&b.gain).then(b.feature.cmp(&a.feature)))
    }

    /// Predict from binned features
    pub fn predict_binned(&self, binned: &Array2<u8>) -> Result<Array1<f64>> {
        if self.nodes.is_empty() {
            return Err(LoanfitError::ModelNotFitted);
        }
        Ok((0..binned.nrows())
            .map(|i| {
                let mut node = 0;
                loop {
                    match &self.nodes[node] {
                        HistNode::Leaf { value, .. } => return *value,
                        HistNode::Split { feature, bin, left, right, .. } => {
                            node = if binned[[i, *feature]] <= *bin { *left } else { *right };
                        }
                    }
                }
            })
            .collect())
    }

    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, HistNode::Leaf { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_bin_mapper_distinct_values() {
        let x = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0], [2.0, 10.0]];
        let mut mapper = BinMapper::new(255);
        mapper.fit(&x);
        assert_eq!(mapper.n_bins(0), 3);
        assert_eq!(mapper.n_bins(1), 1);

        let binned = mapper.transform(&x).unwrap();
        assert_eq!(binned.column(0).to_vec(), vec![0, 1, 2, 1]);
        assert!(binned.column(1).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bin_mapper_caps_bins() {
        let x = Array2::from_shape_fn((1000, 1), |(i, _)| i as f64);
        let mut mapper = BinMapper::new(16);
        mapper.fit(&x);
        assert!(mapper.n_bins(0) <= 16);
        let binned = mapper.transform(&x).unwrap();
        assert_eq!(binned[[0, 0]], 0);
        assert_eq!(binned[[999, 0]] as usize, mapper.n_bins(0) - 1);
    }

    #[test]
    fn test_tree_learns_step() {
        let x = Array2::from_shape_fn((100, 1), |(i, _)| i as f64);
        let y = x.column(0).mapv(|v| if v < 50.0 { -1.0 } else { 1.0 });
        let mut mapper = BinMapper::new(255);
        mapper.fit(&x);
        let binned = mapper.transform(&x).unwrap();
        let n_bins: Vec<usize> = (0..1).map(|j| mapper.n_bins(j)).collect();

        let mut tree = HistogramTree::new().with_max_leaf_nodes(2);
        tree.fit(&binned, &n_bins, &y).unwrap();
        let pred = tree.predict_binned(&binned).unwrap();
        assert_eq!(tree.n_leaves(), 2);
        assert!((pred[0] + 1.0).abs() < 1e-12);
        assert!((pred[99] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_min_samples_leaf_blocks_split() {
        let x = Array2::from_shape_fn((10, 1), |(i, _)| i as f64);
        let y = x.column(0).to_owned();
        let mut mapper = BinMapper::new(255);
        mapper.fit(&x);
        let binned = mapper.transform(&x).unwrap();
        let mut tree = HistogramTree::new().with_min_samples_leaf(20);
        tree.fit(&binned, &[mapper.n_bins(0)], &y).unwrap();
        assert_eq!(tree.n_leaves(), 1);
    }
}
