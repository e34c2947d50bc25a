//! Depth-wise exact greedy tree construction.

use ndarray::{ArrayView1, ArrayView2};

use super::gradients::GradsTuple;
use crate::data::FeatureType;
use crate::repr::{float_to_category, CategoriesStorage, SplitType, Tree};

/// Gains below this threshold do not justify a split.
const MIN_GAIN: f32 = 1e-7;

/// Split-search parameters for one tree.
#[derive(Debug, Clone, Copy)]
pub struct GrowerParams {
    pub max_depth: usize,
    pub learning_rate: f32,
    pub l2: f32,
    pub min_data_in_leaf: usize,
}

#[derive(Debug, Clone)]
enum SplitKind {
    Numeric {
        threshold: f32,
    },
    Categorical {
        /// Sorted training-space codes routed right.
        right_categories: Vec<u32>,
        n_categories: u32,
    },
}

#[derive(Debug, Clone)]
struct Candidate {
    feature: usize,
    kind: SplitKind,
    default_left: bool,
    gain: f32,
}

/// Accumulated first and second order statistics.
#[derive(Debug, Clone, Copy, Default)]
struct Stats {
    grad: f64,
    hess: f64,
    count: usize,
}

impl Stats {
    #[inline]
    fn add(&mut self, gh: GradsTuple) {
        self.grad += gh.grad as f64;
        self.hess += gh.hess as f64;
        self.count += 1;
    }

    #[inline]
    fn merge(self, other: Stats) -> Stats {
        Stats {
            grad: self.grad + other.grad,
            hess: self.hess + other.hess,
            count: self.count + other.count,
        }
    }

    #[inline]
    fn minus(self, other: Stats) -> Stats {
        Stats {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count - other.count,
        }
    }

    #[inline]
    fn score(&self, l2: f32) -> f64 {
        let denom = self.hess + l2 as f64;
        if denom <= 0.0 {
            0.0
        } else {
            self.grad * self.grad / denom
        }
    }
}

/// Tree arrays under construction; children are patched in after recursion.
#[derive(Default)]
struct TreeBuffer {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<u32>,
    right_children: Vec<u32>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
    split_types: Vec<SplitType>,
    categories: CategoriesStorage,
}

impl TreeBuffer {
    fn push_leaf(&mut self, value: f32) -> u32 {
        self.push_node(0, 0.0, false, true, value, SplitType::Numeric)
    }

    fn push_split(
        &mut self,
        feature: u32,
        threshold: f32,
        default_left: bool,
        split_type: SplitType,
    ) -> u32 {
        self.push_node(feature, threshold, default_left, false, 0.0, split_type)
    }

    #[allow(clippy::too_many_arguments)]
    fn push_node(
        &mut self,
        feature: u32,
        threshold: f32,
        default_left: bool,
        is_leaf: bool,
        value: f32,
        split_type: SplitType,
    ) -> u32 {
        let idx = self.split_indices.len() as u32;
        self.split_indices.push(feature);
        self.split_thresholds.push(threshold);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(default_left);
        self.is_leaf.push(is_leaf);
        self.leaf_values.push(value);
        self.split_types.push(split_type);
        idx
    }

    fn into_tree(self) -> Tree {
        Tree::new(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.default_left,
            self.is_leaf,
            self.leaf_values,
            self.split_types,
            self.categories,
        )
    }
}

/// Grows one tree against the gradients of a single output group.
pub struct TreeGrower<'a> {
    features: ArrayView2<'a, f32>,
    feature_types: &'a [FeatureType],
    cat_cardinality: &'a [u32],
    params: GrowerParams,
}

impl<'a> TreeGrower<'a> {
    /// `features` is feature-major `[n_features, n_samples]`;
    /// `cat_cardinality` holds the training vocabulary size per feature
    /// (zero for numeric features).
    pub fn new(
        features: ArrayView2<'a, f32>,
        feature_types: &'a [FeatureType],
        cat_cardinality: &'a [u32],
        params: GrowerParams,
    ) -> Self {
        debug_assert_eq!(features.nrows(), feature_types.len());
        debug_assert_eq!(features.nrows(), cat_cardinality.len());
        Self {
            features,
            feature_types,
            cat_cardinality,
            params,
        }
    }

    /// Grow a tree over all samples using one group's gradients.
    pub fn grow(&self, gradients: ArrayView1<'_, GradsTuple>) -> Tree {
        debug_assert_eq!(gradients.len(), self.features.ncols());
        let samples: Vec<u32> = (0..self.features.ncols() as u32).collect();
        let mut buffer = TreeBuffer::default();
        self.grow_node(&samples, gradients, 0, &mut buffer);
        buffer.into_tree()
    }

    fn grow_node(
        &self,
        samples: &[u32],
        gradients: ArrayView1<'_, GradsTuple>,
        depth: usize,
        buffer: &mut TreeBuffer,
    ) -> u32 {
        let mut total = Stats::default();
        for &s in samples {
            total.add(gradients[s as usize]);
        }

        let can_split = depth < self.params.max_depth
            && samples.len() >= 2 * self.params.min_data_in_leaf.max(1);
        let candidate = if can_split {
            self.find_best_split(samples, gradients, total)
        } else {
            None
        };

        let Some(candidate) = candidate else {
            return buffer.push_leaf(self.leaf_value(total));
        };

        let (left_samples, right_samples) = self.partition(samples, &candidate);
        debug_assert!(!left_samples.is_empty() && !right_samples.is_empty());

        let (threshold, split_type) = match &candidate.kind {
            SplitKind::Numeric { threshold } => (*threshold, SplitType::Numeric),
            SplitKind::Categorical { .. } => (0.0, SplitType::Categorical),
        };
        let node = buffer.push_split(
            candidate.feature as u32,
            threshold,
            candidate.default_left,
            split_type,
        );
        if let SplitKind::Categorical {
            right_categories,
            n_categories,
        } = &candidate.kind
        {
            buffer
                .categories
                .insert(node, right_categories, *n_categories);
        }

        let left = self.grow_node(&left_samples, gradients, depth + 1, buffer);
        let right = self.grow_node(&right_samples, gradients, depth + 1, buffer);
        buffer.left_children[node as usize] = left;
        buffer.right_children[node as usize] = right;
        node
    }

    #[inline]
    fn leaf_value(&self, stats: Stats) -> f32 {
        let denom = stats.hess + self.params.l2 as f64;
        if denom <= 0.0 {
            0.0
        } else {
            (-stats.grad / denom) as f32 * self.params.learning_rate
        }
    }

    fn find_best_split(
        &self,
        samples: &[u32],
        gradients: ArrayView1<'_, GradsTuple>,
        total: Stats,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for feature in 0..self.features.nrows() {
            let candidate = match self.feature_types[feature] {
                FeatureType::Numeric => {
                    self.best_numeric_split(feature, samples, gradients, total)
                }
                FeatureType::Categorical => {
                    self.best_categorical_split(feature, samples, gradients, total)
                }
            };
            if let Some(c) = candidate {
                // Strict comparison keeps the lowest feature index on ties.
                if best.as_ref().map_or(true, |b| c.gain > b.gain) {
                    best = Some(c);
                }
            }
        }
        best
    }

    /// Consider a left/right assignment of the node's statistics.
    fn try_update_best(
        &self,
        best: &mut Option<Candidate>,
        make: impl Fn() -> (usize, SplitKind),
        default_left: bool,
        left: Stats,
        right: Stats,
        total: Stats,
    ) {
        if left.count < self.params.min_data_in_leaf || right.count < self.params.min_data_in_leaf {
            return;
        }
        let gain =
            (left.score(self.params.l2) + right.score(self.params.l2) - total.score(self.params.l2))
                as f32;
        if gain <= MIN_GAIN {
            return;
        }
        if best.as_ref().map_or(true, |b| gain > b.gain) {
            let (feature, kind) = make();
            *best = Some(Candidate {
                feature,
                kind,
                default_left,
                gain,
            });
        }
    }

    fn best_numeric_split(
        &self,
        feature: usize,
        samples: &[u32],
        gradients: ArrayView1<'_, GradsTuple>,
        total: Stats,
    ) -> Option<Candidate> {
        let column = self.features.row(feature);
        let mut present: Vec<(f32, u32)> = Vec::with_capacity(samples.len());
        let mut missing = Stats::default();
        for &s in samples {
            let value = column[s as usize];
            if value.is_nan() {
                missing.add(gradients[s as usize]);
            } else {
                present.push((value, s));
            }
        }
        if present.len() < 2 {
            return None;
        }
        // Stable order for bit-for-bit reproducible trees.
        present.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut best = None;
        let mut left_present = Stats::default();
        let has_missing = missing.count > 0;
        for i in 1..present.len() {
            left_present.add(gradients[present[i - 1].1 as usize]);
            let (prev, curr) = (present[i - 1].0, present[i].0);
            if prev == curr {
                continue;
            }
            let threshold = (prev + curr) / 2.0;
            let right_present = total.minus(missing).minus(left_present);

            // Missing values follow the default direction; when the node has
            // no missing values both directions are equivalent and left wins.
            let directions: &[bool] = if has_missing { &[true, false] } else { &[true] };
            for &default_left in directions {
                let (left, right) = if default_left {
                    (left_present.merge(missing), right_present)
                } else {
                    (left_present, right_present.merge(missing))
                };
                self.try_update_best(
                    &mut best,
                    || (feature, SplitKind::Numeric { threshold }),
                    default_left,
                    left,
                    right,
                    total,
                );
            }
        }
        best
    }

    fn best_categorical_split(
        &self,
        feature: usize,
        samples: &[u32],
        gradients: ArrayView1<'_, GradsTuple>,
        total: Stats,
    ) -> Option<Candidate> {
        let n_categories = self.cat_cardinality[feature];
        if n_categories < 2 {
            return None;
        }
        let column = self.features.row(feature);
        let mut per_code = vec![Stats::default(); n_categories as usize];
        let mut missing = Stats::default();
        for &s in samples {
            let value = column[s as usize];
            if value.is_nan() {
                missing.add(gradients[s as usize]);
            } else {
                per_code[float_to_category(value) as usize].add(gradients[s as usize]);
            }
        }

        // One-vs-rest ordering by gradient ratio turns the category set
        // search into a single scan over a sorted axis.
        let mut present: Vec<(u32, Stats)> = per_code
            .into_iter()
            .enumerate()
            .filter(|(_, s)| s.count > 0)
            .map(|(code, s)| (code as u32, s))
            .collect();
        if present.len() < 2 {
            return None;
        }
        present.sort_unstable_by(|a, b| {
            let ra = a.1.grad / (a.1.hess + 1.0);
            let rb = b.1.grad / (b.1.hess + 1.0);
            ra.total_cmp(&rb).then(a.0.cmp(&b.0))
        });

        let mut best = None;
        let mut left_present = Stats::default();
        let has_missing = missing.count > 0;
        for k in 1..present.len() {
            left_present = left_present.merge(present[k - 1].1);
            let right_present = total.minus(missing).minus(left_present);

            let directions: &[bool] = if has_missing { &[true, false] } else { &[true] };
            for &default_left in directions {
                let (left, right) = if default_left {
                    (left_present.merge(missing), right_present)
                } else {
                    (left_present, right_present.merge(missing))
                };
                self.try_update_best(
                    &mut best,
                    || {
                        let mut right_categories: Vec<u32> =
                            present[k..].iter().map(|(code, _)| *code).collect();
                        right_categories.sort_unstable();
                        (
                            feature,
                            SplitKind::Categorical {
                                right_categories,
                                n_categories,
                            },
                        )
                    },
                    default_left,
                    left,
                    right,
                    total,
                );
            }
        }
        best
    }

    fn partition(&self, samples: &[u32], candidate: &Candidate) -> (Vec<u32>, Vec<u32>) {
        let column = self.features.row(candidate.feature);
        let mut left = Vec::new();
        let mut right = Vec::new();
        for &s in samples {
            let value = column[s as usize];
            let goes_left = if value.is_nan() {
                candidate.default_left
            } else {
                match &candidate.kind {
                    SplitKind::Numeric { threshold } => value < *threshold,
                    SplitKind::Categorical {
                        right_categories, ..
                    } => right_categories
                        .binary_search(&float_to_category(value))
                        .is_err(),
                }
            };
            if goes_left {
                left.push(s);
            } else {
                right.push(s);
            }
        }
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    fn params(max_depth: usize) -> GrowerParams {
        GrowerParams {
            max_depth,
            learning_rate: 1.0,
            l2: 0.0,
            min_data_in_leaf: 1,
        }
    }

    fn squared_gradients(predictions: &[f32], targets: &[f32]) -> Array1<GradsTuple> {
        predictions
            .iter()
            .zip(targets)
            .map(|(&p, &t)| GradsTuple::new(p - t, 1.0))
            .collect()
    }

    #[test]
    fn splits_perfectly_separable_data() {
        let features = array![[1.0f32, 2.0, 10.0, 11.0]];
        let types = [FeatureType::Numeric];
        let cards = [0u32];
        let gradients = squared_gradients(&[0.0; 4], &[-1.0, -1.0, 1.0, 1.0]);

        let grower = TreeGrower::new(features.view(), &types, &cards, params(1));
        let tree = grower.grow(gradients.view());

        assert!(tree.validate().is_ok());
        assert_abs_diff_eq!(
            tree.leaf_value(tree.traverse_to_leaf(|_| 1.5)),
            -1.0,
            epsilon = 1e-5
        );
        assert_abs_diff_eq!(
            tree.leaf_value(tree.traverse_to_leaf(|_| 10.5)),
            1.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn pure_node_becomes_leaf() {
        let features = array![[1.0f32, 2.0, 3.0]];
        let types = [FeatureType::Numeric];
        let cards = [0u32];
        // All residuals equal, no gain anywhere.
        let gradients = squared_gradients(&[0.0; 3], &[5.0, 5.0, 5.0]);

        let grower = TreeGrower::new(features.view(), &types, &cards, params(3));
        let tree = grower.grow(gradients.view());

        assert_eq!(tree.n_nodes(), 1);
        assert_abs_diff_eq!(tree.leaf_value(0), 5.0, epsilon = 1e-5);
    }

    #[test]
    fn categorical_split_groups_codes() {
        // Codes 0 and 2 share a target, code 1 differs.
        let features = array![[0.0f32, 1.0, 2.0, 0.0, 1.0, 2.0]];
        let types = [FeatureType::Categorical];
        let cards = [3u32];
        let gradients =
            squared_gradients(&[0.0; 6], &[1.0, -1.0, 1.0, 1.0, -1.0, 1.0]);

        let grower = TreeGrower::new(features.view(), &types, &cards, params(1));
        let tree = grower.grow(gradients.view());

        assert!(tree.validate().is_ok());
        let leaf_for = |code: f32| tree.leaf_value(tree.traverse_to_leaf(|_| code));
        assert_abs_diff_eq!(leaf_for(0.0), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(leaf_for(2.0), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(leaf_for(1.0), -1.0, epsilon = 1e-5);
    }

    #[test]
    fn missing_values_follow_best_default_direction() {
        let features = array![[1.0f32, 2.0, 10.0, 11.0, f32::NAN, f32::NAN]];
        let types = [FeatureType::Numeric];
        let cards = [0u32];
        // Missing rows behave like the high-value group.
        let gradients =
            squared_gradients(&[0.0; 6], &[-1.0, -1.0, 1.0, 1.0, 1.0, 1.0]);

        let grower = TreeGrower::new(features.view(), &types, &cards, params(1));
        let tree = grower.grow(gradients.view());

        assert_abs_diff_eq!(
            tree.leaf_value(tree.traverse_to_leaf(|_| f32::NAN)),
            1.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn min_data_in_leaf_blocks_small_splits() {
        let features = array![[1.0f32, 2.0, 3.0, 4.0]];
        let types = [FeatureType::Numeric];
        let cards = [0u32];
        let gradients = squared_gradients(&[0.0; 4], &[0.0, 0.0, 0.0, 10.0]);

        let constrained = GrowerParams {
            min_data_in_leaf: 2,
            ..params(3)
        };
        let grower = TreeGrower::new(features.view(), &types, &cards, constrained);
        let tree = grower.grow(gradients.view());

        // Isolating the outlier sample would violate the leaf minimum, so
        // it must share its leaf with at least one neighbor.
        assert!(tree.validate().is_ok());
        let leaf_for = |x: f32| tree.traverse_to_leaf(move |_| x);
        assert_eq!(leaf_for(4.0), leaf_for(3.0));
    }

    #[test]
    fn same_inputs_grow_identical_trees() {
        let features = array![
            [0.3f32, 1.7, 0.9, 2.4, 1.1, 0.2, 3.3, 2.8],
            [5.0, 4.0, 3.0, 2.0, 1.0, 0.0, 6.0, 7.0]
        ];
        let types = [FeatureType::Numeric; 2];
        let cards = [0u32; 2];
        let gradients = squared_gradients(
            &[0.0; 8],
            &[1.0, -2.0, 0.5, 3.0, -1.0, 0.0, 2.0, -0.5],
        );

        let grower = TreeGrower::new(features.view(), &types, &cards, params(3));
        let a = grower.grow(gradients.view());
        let b = grower.grow(gradients.view());
        assert_eq!(a, b);
    }
}
