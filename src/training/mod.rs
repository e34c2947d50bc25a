//! Training: objectives, metrics, tree growing, and the boosting loop.

mod eval;
mod gradients;
mod grower;
mod logger;
pub mod metrics;
pub mod objectives;
mod trainer;

pub use eval::MetricValue;
pub use gradients::{Gradients, GradsTuple};
pub use grower::{GrowerParams, TreeGrower};
pub use logger::{TrainingLogger, Verbosity};
pub use metrics::Metric;
pub use objectives::{Objective, ObjectiveFn, PredictionKind};
pub use trainer::{EvalData, TrainOutcome, TrainParams, Trainer};
