//! High-level model API: configuration, training, prediction, persistence.

mod config;
mod meta;
#[allow(clippy::module_inception)]
mod model;

pub use config::{BoostConfig, ConfigError, Loss};
pub use meta::{ModelMeta, TaskKind};
pub use model::{Model, PredictError, TrainError};
