//! Batch prediction over a trained forest.

use ndarray::{Array2, ArrayView1, ArrayViewMut1, ArrayView2, Axis, Zip};

use crate::repr::Forest;
use crate::utils::Parallelism;

/// Computes raw margin scores for batches of samples.
///
/// Input is feature-major `[n_features, n_samples]` with encoded feature
/// values (`NaN` for missing); output is `[n_groups, n_samples]`.
pub struct Predictor<'a> {
    forest: &'a Forest,
}

impl<'a> Predictor<'a> {
    pub fn new(forest: &'a Forest) -> Self {
        Self { forest }
    }

    pub fn predict(&self, features: ArrayView2<'_, f32>, parallelism: Parallelism) -> Array2<f32> {
        let n_groups = self.forest.n_groups() as usize;
        let mut out = Array2::zeros((n_groups, features.ncols()));

        let score_column = |mut scores: ArrayViewMut1<'_, f32>, column: ArrayView1<'_, f32>| {
            for (score, &base) in scores.iter_mut().zip(self.forest.base_score()) {
                *score = base;
            }
            for (tree, group) in self.forest.trees_with_groups() {
                let leaf = tree.traverse_to_leaf(|f| column[f]);
                scores[group as usize] += tree.leaf_value(leaf);
            }
        };

        let zip = Zip::from(out.axis_iter_mut(Axis(1))).and(features.axis_iter(Axis(1)));
        if parallelism.is_parallel() {
            zip.par_for_each(score_column);
        } else {
            zip.for_each(score_column);
        }
        out
    }
}
