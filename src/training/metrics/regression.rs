//! Regression metrics.

use ndarray::ArrayView2;

use super::MetricFn;
use crate::training::objectives::interval_log_bounds;

/// Root mean squared error.
#[derive(Debug, Clone, Copy, Default)]
pub struct RmseMetric;

impl MetricFn for RmseMetric {
    fn name(&self) -> &'static str {
        "RMSE"
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn compute(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f64 {
        debug_assert_eq!(predictions.ncols(), targets.ncols());
        let preds = predictions.row(0);
        let labels = targets.row(0);
        let n = preds.len().max(1) as f64;
        let sse: f64 = preds
            .iter()
            .zip(labels.iter())
            .map(|(&p, &t)| {
                let d = (p - t) as f64;
                d * d
            })
            .sum();
        (sse / n).sqrt()
    }
}

/// Mean squared log-space distance to the target interval.
///
/// Zero when every prediction falls inside its interval; censored
/// observations only penalize predictions below their lower bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurvivalAftMetric;

impl MetricFn for SurvivalAftMetric {
    fn name(&self) -> &'static str {
        "SurvivalAft"
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn compute(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f64 {
        debug_assert_eq!(predictions.ncols(), targets.ncols());
        let preds = predictions.row(0);
        let lowers = targets.row(0);
        let uppers = targets.row(1);
        let n = preds.len().max(1) as f64;
        let sum: f64 = preds
            .iter()
            .zip(lowers.iter().zip(uppers.iter()))
            .map(|(&p, (&lo, &hi))| {
                let (log_lo, log_hi) = interval_log_bounds(lo, hi);
                let log_p = p.max(f32::MIN_POSITIVE).ln();
                let d = (log_p - log_p.clamp(log_lo, log_hi.max(log_lo))) as f64;
                d * d
            })
            .sum();
        sum / n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn rmse_of_exact_predictions_is_zero() {
        let preds = array![[1.0f32, 2.0, 3.0]];
        let targets = array![[1.0f32, 2.0, 3.0]];
        assert_abs_diff_eq!(RmseMetric.compute(preds.view(), targets.view()), 0.0);
    }

    #[test]
    fn rmse_known_value() {
        let preds = array![[0.0f32, 0.0]];
        let targets = array![[3.0f32, 4.0]];
        // sqrt((9 + 16) / 2)
        assert_abs_diff_eq!(
            RmseMetric.compute(preds.view(), targets.view()),
            12.5f64.sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn survival_zero_inside_interval() {
        let preds = array![[5.0f32, 100.0]];
        let targets = array![[2.0f32, 50.0], [10.0, f32::INFINITY]];
        assert_abs_diff_eq!(
            SurvivalAftMetric.compute(preds.view(), targets.view()),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn survival_penalizes_out_of_interval() {
        let preds = array![[1.0f32]];
        let targets = array![[10.0f32], [20.0]];
        assert!(SurvivalAftMetric.compute(preds.view(), targets.view()) > 0.0);
    }
}
