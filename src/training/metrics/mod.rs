//! Evaluation metrics computed on transformed predictions.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

mod classification;
mod regression;

pub use classification::{Accuracy, LogLossMetric, MultiClassAccuracy};
pub use regression::{RmseMetric, SurvivalAftMetric};

/// An evaluation metric.
///
/// `predictions` are on the objective's output scale (probabilities for
/// classification, target-scale values for regression), never raw margins.
pub trait MetricFn {
    /// Display name used in logs.
    fn name(&self) -> &'static str;

    /// Direction of improvement.
    fn higher_is_better(&self) -> bool;

    /// Compute the metric over all samples.
    fn compute(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f64;
}

/// Dispatch enum over the built-in metrics, usable in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Metric {
    /// No evaluation during training.
    #[default]
    None,
    Rmse,
    LogLoss,
    Accuracy,
    MultiClassAccuracy,
    SurvivalAft,
}

impl Metric {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Metric::None)
    }

    fn inner(&self) -> Option<&'static dyn MetricFn> {
        match self {
            Metric::None => None,
            Metric::Rmse => Some(&RmseMetric),
            Metric::LogLoss => Some(&LogLossMetric),
            Metric::Accuracy => Some(&Accuracy),
            Metric::MultiClassAccuracy => Some(&MultiClassAccuracy),
            Metric::SurvivalAft => Some(&SurvivalAftMetric),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner().map(|m| m.name()).unwrap_or("None")
    }

    pub fn higher_is_better(&self) -> bool {
        self.inner().map(|m| m.higher_is_better()).unwrap_or(false)
    }

    /// Compute the metric; `None` when evaluation is disabled.
    pub fn compute(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Option<f64> {
        self.inner().map(|m| m.compute(predictions, targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_disabled() {
        assert!(!Metric::None.is_enabled());
        assert!(Metric::Rmse.is_enabled());
    }

    #[test]
    fn directions() {
        assert!(!Metric::Rmse.higher_is_better());
        assert!(!Metric::LogLoss.higher_is_better());
        assert!(Metric::Accuracy.higher_is_better());
        assert!(Metric::MultiClassAccuracy.higher_is_better());
        assert!(!Metric::SurvivalAft.higher_is_better());
    }
}
