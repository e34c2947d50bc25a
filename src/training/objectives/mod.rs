//! Training objectives: loss gradients, base scores, prediction transforms.

use ndarray::{ArrayView2, ArrayViewMut2};

use super::gradients::Gradients;

mod classification;
mod regression;

pub use classification::{LogisticLoss, SoftmaxLoss};
pub(crate) use regression::interval_log_bounds;
pub use regression::{IntervalLoss, SquaredLoss};

/// What the values produced by an objective's prediction transform mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionKind {
    /// Untransformed margin scores.
    RawScore,
    /// Probabilities in `[0, 1]`.
    Probability,
    /// Values on the scale of the training targets.
    Value,
}

/// A differentiable training objective.
///
/// Predictions and targets are `[n_outputs, n_samples]` and
/// `[n_targets, n_samples]` respectively; the two dimensions differ for
/// objectives like interval regression (one output, two target rows).
pub trait ObjectiveFn: Send + Sync {
    /// Display name used in logs.
    fn name(&self) -> &'static str;

    /// Number of model output groups (trees per round).
    fn n_outputs(&self) -> usize;

    /// Number of target rows this objective expects.
    fn n_targets(&self) -> usize {
        1
    }

    /// Initial per-group score before any tree is added.
    fn base_score(&self, targets: ArrayView2<f32>) -> Vec<f32>;

    /// Fill `gradients` with first and second derivatives of the loss
    /// at the current raw predictions.
    fn compute_gradients_into(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        gradients: &mut Gradients,
    );

    /// Map raw scores to the objective's natural output scale in place.
    fn transform_predictions_inplace(&self, predictions: ArrayViewMut2<f32>) -> PredictionKind;
}

/// Dispatch enum over the built-in objectives.
#[derive(Debug, Clone)]
pub enum Objective {
    Squared(SquaredLoss),
    Logistic(LogisticLoss),
    Softmax(SoftmaxLoss),
    Interval(IntervalLoss),
}

impl Objective {
    pub fn squared() -> Self {
        Objective::Squared(SquaredLoss)
    }

    pub fn logistic() -> Self {
        Objective::Logistic(LogisticLoss)
    }

    pub fn softmax(n_classes: usize) -> Self {
        Objective::Softmax(SoftmaxLoss::new(n_classes))
    }

    pub fn interval() -> Self {
        Objective::Interval(IntervalLoss)
    }

    fn inner(&self) -> &dyn ObjectiveFn {
        match self {
            Objective::Squared(o) => o,
            Objective::Logistic(o) => o,
            Objective::Softmax(o) => o,
            Objective::Interval(o) => o,
        }
    }
}

impl ObjectiveFn for Objective {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn n_outputs(&self) -> usize {
        self.inner().n_outputs()
    }

    fn n_targets(&self) -> usize {
        self.inner().n_targets()
    }

    fn base_score(&self, targets: ArrayView2<f32>) -> Vec<f32> {
        self.inner().base_score(targets)
    }

    fn compute_gradients_into(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        gradients: &mut Gradients,
    ) {
        self.inner()
            .compute_gradients_into(predictions, targets, gradients)
    }

    fn transform_predictions_inplace(&self, predictions: ArrayViewMut2<f32>) -> PredictionKind {
        self.inner().transform_predictions_inplace(predictions)
    }
}
