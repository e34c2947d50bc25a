//! Trained model: fitting, prediction, and persistence entry points.

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::{Array2, ArrayView2};
use thiserror::Error;

use super::config::{BoostConfig, Loss};
use super::meta::{ModelMeta, TaskKind};
use crate::data::{CategoryVocab, FeatureType, Labels, Pool};
use crate::inference::Predictor;
use crate::io::{LoadError, SaveError};
use crate::repr::Forest;
use crate::training::{
    EvalData, Metric, Objective, ObjectiveFn, PredictionKind, TrainOutcome, TrainParams, Trainer,
};
use crate::utils::run_with_threads;

/// Errors from [`Model::train`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    #[error("{loss} training requires labels on the pool")]
    MissingLabels { loss: &'static str },
    #[error("{loss} training requires {expected} labels, got {got} labels")]
    LabelKindMismatch {
        loss: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    #[error("Logloss requires exactly 2 distinct classes, got {n}")]
    NotBinary { n: usize },
    #[error("classification requires at least 2 distinct classes, got {n}")]
    TooFewClasses { n: usize },
    #[error("invalid interval label at row {row}: ({lower}, {upper})")]
    InvalidInterval { row: usize, lower: f32, upper: f32 },
    #[error("eval label {label:?} does not appear in the training classes")]
    UnknownClassLabel { label: String },
    #[error("eval metric {metric} cannot score loss {loss}")]
    IncompatibleMetric {
        metric: &'static str,
        loss: &'static str,
    },
    #[error("eval set is incompatible with the training pool: {0}")]
    EvalSetMismatch(#[from] PredictError),
}

/// Errors from the prediction methods.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("model expects {expected} features, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },
    #[error("feature {index} ({name:?}) does not match the training type")]
    FeatureTypeMismatch { index: usize, name: String },
    #[error("this prediction requires a classification model")]
    NotClassification,
}

/// A trained gradient boosting model.
///
/// Produced by [`Model::train`] or loaded with [`Model::load_model`]. The
/// model owns everything needed to score new data: the forest, the training
/// configuration, feature metadata, and the categorical dictionaries.
#[derive(Debug)]
pub struct Model {
    forest: Forest,
    meta: ModelMeta,
    config: BoostConfig,
    vocabs: Vec<CategoryVocab>,
}

impl Model {
    /// Train a model on `pool`, optionally tracking an eval set.
    ///
    /// The eval set must share the training pool's feature layout. When an
    /// eval metric is configured the best round is recorded and, together
    /// with `early_stopping_rounds`, the forest is truncated to it.
    pub fn train(
        config: BoostConfig,
        pool: &Pool,
        eval: Option<&Pool>,
    ) -> Result<Model, TrainError> {
        check_metric(config.eval_metric, config.loss)?;

        let resolved = resolve_task(config.loss, pool)?;
        let objective = &resolved.objective;

        let eval_prepared = eval
            .map(|eval_pool| {
                check_features(pool, eval_pool)?;
                let features = encode_against(eval_pool, pool.vocabs());
                let targets = encode_targets(
                    config.loss,
                    eval_pool.labels(),
                    resolved.class_labels.as_deref(),
                )?;
                Ok::<_, TrainError>((features, targets))
            })
            .transpose()?;

        let params = TrainParams {
            n_rounds: config.iterations as usize,
            learning_rate: config.learning_rate,
            max_depth: config.depth as usize,
            l2: config.l2_leaf_reg,
            min_data_in_leaf: config.min_data_in_leaf as usize,
            subsample: config.subsample,
            seed: config.random_seed,
            early_stopping_rounds: config.early_stopping_rounds.unwrap_or(0) as usize,
            verbosity: config.verbose,
            metric: config.eval_metric,
        };

        let feature_types = pool.schema().feature_types();
        let cat_cardinality = pool.cat_cardinality();
        let trainer = Trainer::new(
            pool.features(),
            &feature_types,
            &cat_cardinality,
            resolved.targets.view(),
            objective,
            params,
        );
        let TrainOutcome {
            forest,
            best_iteration,
        } = run_with_threads(config.n_threads, |_| {
            let eval_data = eval_prepared.as_ref().map(|(features, targets)| EvalData {
                name: "validation",
                features: features.view(),
                targets: targets.view(),
            });
            trainer.train(eval_data.as_ref())
        });

        let meta = ModelMeta {
            n_features: pool.n_features(),
            n_groups: objective.n_outputs(),
            task: resolved.task,
            feature_names: pool.schema().feature_names(),
            feature_types,
            class_labels: resolved.class_labels,
            best_iteration,
            attributes: BTreeMap::new(),
        };

        Ok(Model {
            forest,
            meta,
            config,
            vocabs: pool.vocabs().to_vec(),
        })
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Raw margin scores, `[n_groups, n_samples]`.
    pub fn predict_raw(&self, pool: &Pool) -> Result<Array2<f32>, PredictError> {
        self.check_pool(pool)?;
        let features = encode_against(pool, &self.vocabs);
        Ok(self.score(features.view()))
    }

    /// Predictions on the objective's output scale: values for regression,
    /// probabilities for classification, target-scale times for survival.
    pub fn predict(&self, pool: &Pool) -> Result<Array2<f32>, PredictError> {
        let mut raw = self.predict_raw(pool)?;
        self.objective().transform_predictions_inplace(raw.view_mut());
        Ok(raw)
    }

    /// Per-class probabilities, `[n_classes, n_samples]`.
    ///
    /// For binary models the single sigmoid output is expanded into two
    /// rows, negative class first.
    pub fn predict_proba(&self, pool: &Pool) -> Result<Array2<f32>, PredictError> {
        let probs = match self.meta.task {
            TaskKind::BinaryClassification => {
                let positive = self.predict(pool)?;
                let n = positive.ncols();
                let mut both = Array2::zeros((2, n));
                for (i, &p) in positive.row(0).iter().enumerate() {
                    both[[0, i]] = 1.0 - p;
                    both[[1, i]] = p;
                }
                both
            }
            TaskKind::MulticlassClassification { .. } => self.predict(pool)?,
            _ => return Err(PredictError::NotClassification),
        };
        Ok(probs)
    }

    /// Most probable class label per sample.
    pub fn predict_class(&self, pool: &Pool) -> Result<Vec<String>, PredictError> {
        let probs = self.predict_proba(pool)?;
        let labels = self
            .meta
            .class_labels
            .as_ref()
            .ok_or(PredictError::NotClassification)?;
        let classes = probs
            .columns()
            .into_iter()
            .map(|column| {
                let mut best = 0usize;
                let mut best_p = f32::NEG_INFINITY;
                for (k, &p) in column.iter().enumerate() {
                    if p > best_p {
                        best_p = p;
                        best = k;
                    }
                }
                labels[best].clone()
            })
            .collect();
        Ok(classes)
    }

    fn score(&self, features: ArrayView2<'_, f32>) -> Array2<f32> {
        let predictor = Predictor::new(&self.forest);
        run_with_threads(self.config.n_threads, |parallelism| {
            predictor.predict(features, parallelism)
        })
    }

    fn check_pool(&self, pool: &Pool) -> Result<(), PredictError> {
        if pool.n_features() != self.meta.n_features {
            return Err(PredictError::FeatureCountMismatch {
                expected: self.meta.n_features,
                got: pool.n_features(),
            });
        }
        for (index, kind) in pool.schema().feature_types().into_iter().enumerate() {
            if kind != self.meta.feature_types[index] {
                return Err(PredictError::FeatureTypeMismatch {
                    index,
                    name: self.meta.feature_names[index].clone(),
                });
            }
        }
        Ok(())
    }

    /// The objective implied by the stored configuration and task.
    fn objective(&self) -> Objective {
        match self.meta.task {
            TaskKind::Regression => Objective::squared(),
            TaskKind::BinaryClassification => Objective::logistic(),
            TaskKind::MulticlassClassification { n_classes } => Objective::softmax(n_classes),
            TaskKind::IntervalRegression => Objective::interval(),
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Model metadata.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// The training configuration.
    pub fn config(&self) -> &BoostConfig {
        &self.config
    }

    /// The underlying forest.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Feature names in training order.
    pub fn feature_names(&self) -> &[String] {
        &self.meta.feature_names
    }

    /// User-defined key/value attributes stored with the model.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.meta.attributes
    }

    /// Mutable access to the user-defined attributes.
    pub fn metadata_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.meta.attributes
    }

    /// What the transformed predictions of this model mean.
    pub fn prediction_kind(&self) -> PredictionKind {
        match self.meta.task {
            TaskKind::BinaryClassification | TaskKind::MulticlassClassification { .. } => {
                PredictionKind::Probability
            }
            TaskKind::Regression | TaskKind::IntervalRegression => PredictionKind::Value,
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Serialize into the native binary format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveError> {
        crate::io::to_bytes(self)
    }

    /// Deserialize from the native binary format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Model, LoadError> {
        crate::io::from_bytes(bytes)
    }

    /// Write the model to a file in the native binary format.
    pub fn save_model(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a model written by [`Model::save_model`].
    pub fn load_model(path: impl AsRef<Path>) -> Result<Model, LoadError> {
        let bytes = std::fs::read(path)?;
        Model::from_bytes(&bytes)
    }

    /// Reassemble a model from deserialized parts.
    pub(crate) fn from_parts(
        forest: Forest,
        meta: ModelMeta,
        config: BoostConfig,
        vocabs: Vec<CategoryVocab>,
    ) -> Model {
        Model {
            forest,
            meta,
            config,
            vocabs,
        }
    }

    pub(crate) fn vocabs(&self) -> &[CategoryVocab] {
        &self.vocabs
    }
}

// =============================================================================
// Task resolution
// =============================================================================

struct ResolvedTask {
    objective: Objective,
    targets: Array2<f32>,
    task: TaskKind,
    class_labels: Option<Vec<String>>,
}

fn resolve_task(loss: Loss, pool: &Pool) -> Result<ResolvedTask, TrainError> {
    let labels = pool.labels();
    if labels.is_none() {
        return Err(TrainError::MissingLabels { loss: loss.name() });
    }

    match loss {
        Loss::Rmse => match labels {
            Labels::Float(values) => Ok(ResolvedTask {
                objective: Objective::squared(),
                targets: single_row(values),
                task: TaskKind::Regression,
                class_labels: None,
            }),
            other => Err(kind_mismatch(loss, "float", other)),
        },
        Loss::Logloss => match labels {
            Labels::Class(values) => {
                let classes = distinct_classes(values);
                if classes.len() != 2 {
                    return Err(TrainError::NotBinary { n: classes.len() });
                }
                let targets = encode_targets(loss, labels, Some(&classes))?;
                Ok(ResolvedTask {
                    objective: Objective::logistic(),
                    targets,
                    task: TaskKind::BinaryClassification,
                    class_labels: Some(classes),
                })
            }
            other => Err(kind_mismatch(loss, "class", other)),
        },
        Loss::MultiClass => match labels {
            Labels::Class(values) => {
                let classes = distinct_classes(values);
                if classes.len() < 2 {
                    return Err(TrainError::TooFewClasses { n: classes.len() });
                }
                let targets = encode_targets(loss, labels, Some(&classes))?;
                Ok(ResolvedTask {
                    objective: Objective::softmax(classes.len()),
                    targets,
                    task: TaskKind::MulticlassClassification {
                        n_classes: classes.len(),
                    },
                    class_labels: Some(classes),
                })
            }
            other => Err(kind_mismatch(loss, "class", other)),
        },
        Loss::SurvivalAft => match labels {
            Labels::Interval(values) => {
                for (row, &(lower, upper)) in values.iter().enumerate() {
                    let valid = lower >= 0.0 && (upper >= lower || upper.is_infinite());
                    if !valid || lower.is_nan() || upper.is_nan() {
                        return Err(TrainError::InvalidInterval { row, lower, upper });
                    }
                }
                let targets = encode_targets(loss, labels, None)?;
                Ok(ResolvedTask {
                    objective: Objective::interval(),
                    targets,
                    task: TaskKind::IntervalRegression,
                    class_labels: None,
                })
            }
            other => Err(kind_mismatch(loss, "interval", other)),
        },
    }
}

/// Encode labels into a target matrix, using `classes` as the code order
/// for classification losses.
fn encode_targets(
    loss: Loss,
    labels: &Labels,
    classes: Option<&[String]>,
) -> Result<Array2<f32>, TrainError> {
    match (loss, labels) {
        (Loss::Rmse, Labels::Float(values)) => Ok(single_row(values)),
        (Loss::Logloss | Loss::MultiClass, Labels::Class(values)) => {
            let classes = classes.unwrap_or_default();
            let mut row = Vec::with_capacity(values.len());
            for label in values {
                let code = classes
                    .iter()
                    .position(|c| c == label)
                    .ok_or_else(|| TrainError::UnknownClassLabel {
                        label: label.clone(),
                    })?;
                row.push(code as f32);
            }
            Ok(single_row(&row))
        }
        (Loss::SurvivalAft, Labels::Interval(values)) => {
            let mut targets = Array2::zeros((2, values.len()));
            for (i, &(lower, upper)) in values.iter().enumerate() {
                targets[[0, i]] = lower;
                targets[[1, i]] = upper;
            }
            Ok(targets)
        }
        (loss, other) => {
            let expected = match loss {
                Loss::Rmse => "float",
                Loss::Logloss | Loss::MultiClass => "class",
                Loss::SurvivalAft => "interval",
            };
            Err(kind_mismatch_named(loss, expected, other))
        }
    }
}

fn kind_mismatch(loss: Loss, expected: &'static str, got: &Labels) -> TrainError {
    kind_mismatch_named(loss, expected, got)
}

fn kind_mismatch_named(loss: Loss, expected: &'static str, got: &Labels) -> TrainError {
    TrainError::LabelKindMismatch {
        loss: loss.name(),
        expected,
        got: got.kind_name(),
    }
}

fn distinct_classes(labels: &[String]) -> Vec<String> {
    let mut classes: Vec<String> = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
}

fn single_row(values: &[f32]) -> Array2<f32> {
    Array2::from_shape_vec((1, values.len()), values.to_vec())
        .unwrap_or_else(|_| Array2::zeros((1, 0)))
}

fn check_metric(metric: Metric, loss: Loss) -> Result<(), TrainError> {
    let compatible = match metric {
        Metric::None => true,
        Metric::Rmse => matches!(loss, Loss::Rmse),
        Metric::LogLoss | Metric::Accuracy => matches!(loss, Loss::Logloss),
        Metric::MultiClassAccuracy => matches!(loss, Loss::MultiClass),
        Metric::SurvivalAft => matches!(loss, Loss::SurvivalAft),
    };
    if compatible {
        Ok(())
    } else {
        Err(TrainError::IncompatibleMetric {
            metric: metric.name(),
            loss: loss.name(),
        })
    }
}

fn check_features(train: &Pool, other: &Pool) -> Result<(), PredictError> {
    if other.n_features() != train.n_features() {
        return Err(PredictError::FeatureCountMismatch {
            expected: train.n_features(),
            got: other.n_features(),
        });
    }
    for index in 0..train.n_features() {
        if other.schema().feature_type(index) != train.schema().feature_type(index) {
            return Err(PredictError::FeatureTypeMismatch {
                index,
                name: train.schema().feature_name(index).to_string(),
            });
        }
    }
    Ok(())
}

/// Re-encode a pool's features into the training vocabulary space.
///
/// Categorical codes are remapped by category string; categories the
/// training pool never saw become `NaN` and take the missing-value path.
fn encode_against(pool: &Pool, train_vocabs: &[CategoryVocab]) -> Array2<f32> {
    let mut features = pool.features().to_owned();
    for (index, train_vocab) in train_vocabs.iter().enumerate() {
        if pool.schema().feature_type(index) != FeatureType::Categorical {
            continue;
        }
        let pool_vocab = pool.vocab(index);
        for value in features.row_mut(index) {
            if value.is_nan() {
                continue;
            }
            let code = crate::repr::float_to_category(*value);
            *value = pool_vocab
                .name(code)
                .and_then(|name| train_vocab.code(name))
                .map(|train_code| train_code as f32)
                .unwrap_or(f32::NAN);
        }
    }
    features
}
