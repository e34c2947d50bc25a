//! Training configuration with builder pattern.
//!
//! [`BoostConfig`] collects every hyperparameter of a training run. The
//! `bon` builder provides a fluent API with validation at build time.
//!
//! # Example
//!
//! ```
//! use crabboost::{BoostConfig, Loss, Metric};
//!
//! // All defaults: 100 rounds of squared-loss regression.
//! let config = BoostConfig::builder().build().unwrap();
//!
//! // Binary classification with an eval metric.
//! let config = BoostConfig::builder()
//!     .loss(Loss::Logloss)
//!     .eval_metric(Metric::Accuracy)
//!     .iterations(200)
//!     .learning_rate(0.1)
//!     .depth(4)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::training::{Metric, Verbosity};

/// Errors from configuration validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("learning_rate must be positive, got {0}")]
    InvalidLearningRate(f32),
    #[error("iterations must be at least 1")]
    InvalidIterations,
    #[error("depth must be in 1..=16, got {0}")]
    InvalidDepth(u32),
    #[error("{field} must be in (0, 1], got {value}")]
    InvalidSamplingRatio { field: &'static str, value: f32 },
    #[error("{field} must be non-negative, got {value}")]
    InvalidRegularization { field: &'static str, value: f32 },
}

/// Loss function selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Loss {
    /// Squared-error regression.
    #[default]
    Rmse,
    /// Binary classification.
    Logloss,
    /// Multiclass classification.
    MultiClass,
    /// Interval-censored survival regression.
    SurvivalAft,
}

impl Loss {
    pub fn name(&self) -> &'static str {
        match self {
            Loss::Rmse => "RMSE",
            Loss::Logloss => "Logloss",
            Loss::MultiClass => "MultiClass",
            Loss::SurvivalAft => "SurvivalAft",
        }
    }
}

/// Hyperparameters of a training run.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct BoostConfig {
    /// Loss function. Default: squared-error regression.
    #[builder(default)]
    pub loss: Loss,

    /// Metric evaluated each round on the training and eval sets.
    /// Default: no evaluation.
    #[builder(default)]
    pub eval_metric: Metric,

    /// Number of boosting rounds. Default: 100.
    #[builder(default = 100)]
    pub iterations: u32,

    /// Learning rate (shrinkage). Default: 0.3.
    #[builder(default = 0.3)]
    pub learning_rate: f32,

    /// Maximum tree depth. Default: 6.
    #[builder(default = 6)]
    pub depth: u32,

    /// L2 regularization on leaf values. Default: 3.0.
    #[builder(default = 3.0)]
    pub l2_leaf_reg: f32,

    /// Minimum number of samples per leaf. Default: 1.
    #[builder(default = 1)]
    pub min_data_in_leaf: u32,

    /// Fraction of rows sampled per round, in `(0, 1]`. Default: 1.0.
    #[builder(default = 1.0)]
    pub subsample: f32,

    /// Random seed for row sampling. Default: 42.
    #[builder(default = 42)]
    pub random_seed: u64,

    /// Stop when the eval metric has not improved for this many rounds.
    /// `None` disables early stopping.
    pub early_stopping_rounds: Option<u32>,

    /// Number of threads; `0` uses all available cores. Default: 0.
    #[builder(default = 0)]
    pub n_threads: usize,

    /// Progress printing. Default: silent.
    #[builder(default)]
    pub verbose: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: boost_config_builder::IsComplete> BoostConfigBuilder<S> {
    /// Build and validate the configuration.
    pub fn build(self) -> Result<BoostConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl BoostConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.learning_rate <= 0.0 || !self.learning_rate.is_finite() {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.iterations == 0 {
            return Err(ConfigError::InvalidIterations);
        }
        if self.depth == 0 || self.depth > 16 {
            return Err(ConfigError::InvalidDepth(self.depth));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ConfigError::InvalidSamplingRatio {
                field: "subsample",
                value: self.subsample,
            });
        }
        if !(self.l2_leaf_reg >= 0.0) {
            return Err(ConfigError::InvalidRegularization {
                field: "l2_leaf_reg",
                value: self.l2_leaf_reg,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BoostConfig::builder().build().unwrap();
        assert_eq!(config.iterations, 100);
        assert_eq!(config.depth, 6);
        assert_eq!(config.loss, Loss::Rmse);
        assert_eq!(config.eval_metric, Metric::None);
        assert_eq!(config.random_seed, 42);
    }

    #[test]
    fn rejects_bad_learning_rate() {
        let err = BoostConfig::builder().learning_rate(0.0).build();
        assert!(matches!(err, Err(ConfigError::InvalidLearningRate(_))));
    }

    #[test]
    fn rejects_zero_iterations() {
        let err = BoostConfig::builder().iterations(0).build();
        assert!(matches!(err, Err(ConfigError::InvalidIterations)));
    }

    #[test]
    fn rejects_out_of_range_depth() {
        assert!(matches!(
            BoostConfig::builder().depth(0).build(),
            Err(ConfigError::InvalidDepth(0))
        ));
        assert!(matches!(
            BoostConfig::builder().depth(17).build(),
            Err(ConfigError::InvalidDepth(17))
        ));
    }

    #[test]
    fn rejects_bad_subsample() {
        assert!(matches!(
            BoostConfig::builder().subsample(0.0).build(),
            Err(ConfigError::InvalidSamplingRatio { .. })
        ));
        assert!(matches!(
            BoostConfig::builder().subsample(1.5).build(),
            Err(ConfigError::InvalidSamplingRatio { .. })
        ));
    }

    #[test]
    fn rejects_negative_regularization() {
        assert!(matches!(
            BoostConfig::builder().l2_leaf_reg(-1.0).build(),
            Err(ConfigError::InvalidRegularization { .. })
        ));
    }
}
