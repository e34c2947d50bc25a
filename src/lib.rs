//! Gradient boosted decision trees with native categorical features.
//!
//! Trains depth-wise GBDT models with exact greedy splits over numeric and
//! dictionary-encoded categorical features, with missing-value routing
//! learned per split.
//!
//! # Quick start
//!
//! ```
//! use crabboost::{row, BoostConfig, Loss, Model, Pool};
//!
//! let train = Pool::from_rows(
//!     vec![
//!         row!["a", "b", 1, 4],
//!         row!["a", "d", 4, 5],
//!         row!["c", "d", 30, 40],
//!     ],
//!     &[0, 1],
//! )?
//! .with_class_labels(["1", "1", "-1"])?;
//!
//! let config = BoostConfig::builder()
//!     .loss(Loss::Logloss)
//!     .iterations(2)
//!     .learning_rate(1.0)
//!     .depth(2)
//!     .build()?;
//! let model = Model::train(config, &train, None)?;
//!
//! let classes = model.predict_class(&train)?;
//! assert_eq!(classes.len(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Layout
//!
//! - [`data`]: pools, schemas, labels, category dictionaries
//! - [`repr`]: the trained forest representation
//! - [`training`]: objectives, metrics, and the boosting loop
//! - [`inference`]: batch scoring
//! - [`model`]: the high-level [`Model`] API
//! - [`io`]: the native binary model format

pub mod data;
pub mod inference;
pub mod io;
pub mod model;
pub mod repr;
pub mod training;
pub mod utils;

pub use data::{CategoryVocab, FeatureType, Labels, Pool, PoolBuilder, PoolError, RowValue};
pub use io::{LoadError, SaveError};
pub use model::{
    BoostConfig, ConfigError, Loss, Model, ModelMeta, PredictError, TaskKind, TrainError,
};
pub use training::{Metric, PredictionKind, Verbosity};
pub use utils::{run_with_threads, Parallelism};
