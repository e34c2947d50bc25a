//! Gradient boosting training loop.

use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::eval::MetricValue;
use super::gradients::Gradients;
use super::grower::{GrowerParams, TreeGrower};
use super::logger::{TrainingLogger, Verbosity};
use super::metrics::Metric;
use super::objectives::{Objective, ObjectiveFn};
use crate::data::FeatureType;
use crate::repr::{Forest, Tree};

/// Hyperparameters of one training run.
#[derive(Debug, Clone)]
pub struct TrainParams {
    pub n_rounds: usize,
    pub learning_rate: f32,
    pub max_depth: usize,
    pub l2: f32,
    pub min_data_in_leaf: usize,
    /// Fraction of rows contributing gradients each round, in `(0, 1]`.
    pub subsample: f32,
    pub seed: u64,
    /// Stop after this many rounds without eval improvement; 0 disables.
    pub early_stopping_rounds: usize,
    pub verbosity: Verbosity,
    pub metric: Metric,
}

/// A labelled dataset evaluated once per round.
pub struct EvalData<'a> {
    pub name: &'a str,
    pub features: ArrayView2<'a, f32>,
    pub targets: ArrayView2<'a, f32>,
}

/// Result of a training run.
pub struct TrainOutcome {
    pub forest: Forest,
    /// Round with the best eval metric, when a metric and eval set were used.
    pub best_iteration: Option<usize>,
}

/// Drives the boosting loop over a prepared feature matrix and targets.
pub struct Trainer<'a> {
    features: ArrayView2<'a, f32>,
    feature_types: &'a [FeatureType],
    cat_cardinality: &'a [u32],
    targets: ArrayView2<'a, f32>,
    objective: &'a Objective,
    params: TrainParams,
}

impl<'a> Trainer<'a> {
    pub fn new(
        features: ArrayView2<'a, f32>,
        feature_types: &'a [FeatureType],
        cat_cardinality: &'a [u32],
        targets: ArrayView2<'a, f32>,
        objective: &'a Objective,
        params: TrainParams,
    ) -> Self {
        debug_assert_eq!(features.ncols(), targets.ncols());
        debug_assert_eq!(targets.nrows(), objective.n_targets());
        Self {
            features,
            feature_types,
            cat_cardinality,
            targets,
            objective,
            params,
        }
    }

    pub fn train(&self, eval: Option<&EvalData<'_>>) -> TrainOutcome {
        let n_samples = self.features.ncols();
        let n_groups = self.objective.n_outputs();
        let logger = TrainingLogger::new(self.params.verbosity);

        let base_score = self.objective.base_score(self.targets);
        let mut forest = Forest::new(n_groups as u32).with_base_score(base_score.clone());

        let mut predictions = seeded_predictions(&base_score, n_samples);
        let mut eval_predictions =
            eval.map(|e| seeded_predictions(&base_score, e.features.ncols()));

        let mut gradients = Gradients::zeros(n_groups, n_samples);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.params.seed);
        let grower = TreeGrower::new(
            self.features,
            self.feature_types,
            self.cat_cardinality,
            GrowerParams {
                max_depth: self.params.max_depth,
                learning_rate: self.params.learning_rate,
                l2: self.params.l2,
                min_data_in_leaf: self.params.min_data_in_leaf,
            },
        );

        let track_eval = self.params.metric.is_enabled() && eval.is_some();
        let mut best_value = if self.params.metric.higher_is_better() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        let mut best_round: Option<usize> = None;
        let mut rounds_since_best = 0usize;
        let mut rounds_run = 0usize;

        logger.start_training(self.params.n_rounds);
        for round in 0..self.params.n_rounds {
            self.objective
                .compute_gradients_into(predictions.view(), self.targets, &mut gradients);
            if self.params.subsample < 1.0 {
                for sample in 0..n_samples {
                    if rng.random::<f32>() >= self.params.subsample {
                        gradients.clear_sample(sample);
                    }
                }
            }

            for group in 0..n_groups {
                let tree = grower.grow(gradients.group(group));
                apply_tree(&tree, self.features, &mut predictions, group);
                if let (Some(eval), Some(preds)) = (eval, eval_predictions.as_mut()) {
                    apply_tree(&tree, eval.features, preds, group);
                }
                forest.push_tree(tree, group as u32);
            }
            rounds_run = round + 1;

            let mut logged = Vec::new();
            if self.params.metric.is_enabled() {
                if let Some(value) = self.metric_value("learn", &predictions, self.targets) {
                    logged.push(value);
                }
                if let (Some(eval), Some(preds)) = (eval, eval_predictions.as_ref()) {
                    if let Some(value) = self.metric_value(eval.name, preds, eval.targets) {
                        let improved = best_round.is_none()
                            || value.is_better_than_value(best_value);
                        if improved {
                            best_value = value.value;
                            best_round = Some(round);
                            rounds_since_best = 0;
                        } else {
                            rounds_since_best += 1;
                        }
                        logged.push(value);
                    }
                }
            }
            logger.log_round(round, self.params.n_rounds, &logged);

            if track_eval
                && self.params.early_stopping_rounds > 0
                && rounds_since_best >= self.params.early_stopping_rounds
            {
                break;
            }
        }

        // Keep only the trees up to the best round when an eval set was
        // tracked and training went past it.
        if let Some(best) = best_round {
            if best + 1 < rounds_run {
                forest.truncate((best + 1) * n_groups);
            }
        }
        logger.finish(best_round);

        TrainOutcome {
            forest,
            best_iteration: if track_eval { best_round } else { None },
        }
    }

    fn metric_value(
        &self,
        name: &str,
        predictions: &Array2<f32>,
        targets: ArrayView2<f32>,
    ) -> Option<MetricValue> {
        let mut transformed = predictions.clone();
        self.objective
            .transform_predictions_inplace(transformed.view_mut());
        self.params
            .metric
            .compute(transformed.view(), targets)
            .map(|value| {
                MetricValue::new(
                    format!("{}-{}", name, self.params.metric.name()),
                    value,
                    self.params.metric.higher_is_better(),
                )
            })
    }
}

fn seeded_predictions(base_score: &[f32], n_samples: usize) -> Array2<f32> {
    let mut predictions = Array2::zeros((base_score.len(), n_samples));
    for (mut row, &base) in predictions.rows_mut().into_iter().zip(base_score.iter()) {
        row.fill(base);
    }
    predictions
}

fn apply_tree(
    tree: &Tree,
    features: ArrayView2<'_, f32>,
    predictions: &mut Array2<f32>,
    group: usize,
) {
    for (i, column) in features.columns().into_iter().enumerate() {
        let leaf = tree.traverse_to_leaf(|f| column[f]);
        predictions[[group, i]] += tree.leaf_value(leaf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn base_params() -> TrainParams {
        TrainParams {
            n_rounds: 20,
            learning_rate: 0.3,
            max_depth: 3,
            l2: 0.0,
            min_data_in_leaf: 1,
            subsample: 1.0,
            seed: 42,
            early_stopping_rounds: 0,
            verbosity: Verbosity::Silent,
            metric: Metric::None,
        }
    }

    #[test]
    fn regression_fits_training_data() {
        let features = array![[1.0f32, 2.0, 3.0, 4.0, 10.0, 11.0, 12.0, 13.0]];
        let targets = array![[1.0f32, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0]];
        let types = [FeatureType::Numeric];
        let cards = [0u32];
        let objective = Objective::squared();

        let trainer = Trainer::new(
            features.view(),
            &types,
            &cards,
            targets.view(),
            &objective,
            base_params(),
        );
        let outcome = trainer.train(None);

        let mut preds = seeded_predictions(outcome.forest.base_score(), 8);
        for (tree, group) in outcome.forest.trees_with_groups() {
            apply_tree(tree, features.view(), &mut preds, group as usize);
        }
        for (i, &t) in targets.row(0).iter().enumerate() {
            assert_abs_diff_eq!(preds[[0, i]], t, epsilon = 0.1);
        }
    }

    #[test]
    fn early_stopping_truncates_forest() {
        let features = array![[1.0f32, 2.0, 3.0, 4.0]];
        let targets = array![[1.0f32, 2.0, 3.0, 4.0]];
        // Eval targets disagree with the training trend, so the eval metric
        // degrades as training fits and early stopping must fire.
        let eval_features = array![[1.5f32, 3.5]];
        let eval_targets = array![[3.5f32, 1.5]];
        let types = [FeatureType::Numeric];
        let cards = [0u32];
        let objective = Objective::squared();

        let params = TrainParams {
            n_rounds: 200,
            early_stopping_rounds: 5,
            metric: Metric::Rmse,
            ..base_params()
        };
        let trainer = Trainer::new(
            features.view(),
            &types,
            &cards,
            targets.view(),
            &objective,
            params,
        );
        let eval = EvalData {
            name: "valid",
            features: eval_features.view(),
            targets: eval_targets.view(),
        };
        let outcome = trainer.train(Some(&eval));

        let best = outcome.best_iteration.unwrap();
        assert_eq!(outcome.forest.n_trees(), best + 1);
        assert!(outcome.forest.n_trees() < 200);
    }

    #[test]
    fn multiclass_grows_one_tree_per_class_per_round() {
        let features = array![[0.0f32, 1.0, 2.0, 0.0, 1.0, 2.0]];
        let targets = array![[0.0f32, 1.0, 2.0, 0.0, 1.0, 2.0]];
        let types = [FeatureType::Numeric];
        let cards = [0u32];
        let objective = Objective::softmax(3);

        let params = TrainParams {
            n_rounds: 4,
            ..base_params()
        };
        let trainer = Trainer::new(
            features.view(),
            &types,
            &cards,
            targets.view(),
            &objective,
            params,
        );
        let outcome = trainer.train(None);
        assert_eq!(outcome.forest.n_trees(), 12);
        assert_eq!(outcome.forest.n_groups(), 3);
    }
}
