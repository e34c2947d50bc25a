//! Regression objectives.

use ndarray::{ArrayView2, ArrayViewMut2};

use super::{ObjectiveFn, PredictionKind};
use crate::training::gradients::{Gradients, GradsTuple};

/// Smallest lower bound considered positive when taking logs of
/// interval targets.
const INTERVAL_EPS: f32 = 1e-15;

/// Squared error loss, `L = (p - t)^2 / 2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl ObjectiveFn for SquaredLoss {
    fn name(&self) -> &'static str {
        "RMSE"
    }

    fn n_outputs(&self) -> usize {
        1
    }

    fn base_score(&self, targets: ArrayView2<f32>) -> Vec<f32> {
        let row = targets.row(0);
        let n = row.len().max(1) as f32;
        vec![row.sum() / n]
    }

    fn compute_gradients_into(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        gradients: &mut Gradients,
    ) {
        debug_assert_eq!(predictions.ncols(), targets.ncols());
        let preds = predictions.row(0);
        let labels = targets.row(0);
        for (out, (&p, &t)) in gradients
            .view_mut()
            .row_mut(0)
            .iter_mut()
            .zip(preds.iter().zip(labels.iter()))
        {
            *out = GradsTuple::new(p - t, 1.0);
        }
    }

    fn transform_predictions_inplace(&self, _predictions: ArrayViewMut2<f32>) -> PredictionKind {
        PredictionKind::Value
    }
}

/// Interval-censored regression in log space.
///
/// Targets are two rows `(lower, upper)` of non-negative bounds; an
/// infinite upper bound marks a right-censored observation. The model
/// fits the log of the target, so raw scores are mapped back with `exp`.
/// Gradients are zero anywhere the prediction already lies inside the
/// log-interval, which is what makes censored labels informative without
/// over-penalizing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalLoss;

/// Log-space bounds of an interval target. An infinite upper bound stays
/// infinite.
#[inline]
pub(crate) fn interval_log_bounds(lower: f32, upper: f32) -> (f32, f32) {
    let log_lower = lower.max(INTERVAL_EPS).ln();
    let log_upper = if upper.is_finite() {
        upper.max(INTERVAL_EPS).ln()
    } else {
        f32::INFINITY
    };
    (log_lower, log_upper)
}

impl ObjectiveFn for IntervalLoss {
    fn name(&self) -> &'static str {
        "SurvivalAft"
    }

    fn n_outputs(&self) -> usize {
        1
    }

    fn n_targets(&self) -> usize {
        2
    }

    fn base_score(&self, targets: ArrayView2<f32>) -> Vec<f32> {
        // Mean of log-interval midpoints; censored rows use the lower bound.
        let lowers = targets.row(0);
        let uppers = targets.row(1);
        let mut sum = 0.0f32;
        let mut n = 0usize;
        for (&lo, &hi) in lowers.iter().zip(uppers.iter()) {
            let (log_lo, log_hi) = interval_log_bounds(lo, hi);
            sum += if log_hi.is_finite() {
                (log_lo + log_hi) / 2.0
            } else {
                log_lo
            };
            n += 1;
        }
        vec![sum / n.max(1) as f32]
    }

    fn compute_gradients_into(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        gradients: &mut Gradients,
    ) {
        debug_assert_eq!(predictions.ncols(), targets.ncols());
        let preds = predictions.row(0);
        let lowers = targets.row(0);
        let uppers = targets.row(1);
        for (i, out) in gradients.view_mut().row_mut(0).iter_mut().enumerate() {
            let p = preds[i];
            let (log_lo, log_hi) = interval_log_bounds(lowers[i], uppers[i]);
            let clamped = p.clamp(log_lo, log_hi.max(log_lo));
            *out = GradsTuple::new(p - clamped, 1.0);
        }
    }

    fn transform_predictions_inplace(&self, mut predictions: ArrayViewMut2<f32>) -> PredictionKind {
        predictions.mapv_inplace(f32::exp);
        PredictionKind::Value
    }
}
