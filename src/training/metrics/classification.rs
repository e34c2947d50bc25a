//! Classification metrics.

use ndarray::ArrayView2;

use super::MetricFn;

/// Probability floor for log-loss, matching the clamping used in training.
const PROB_EPS: f64 = 1e-15;

/// Binary cross-entropy on predicted probabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLossMetric;

impl MetricFn for LogLossMetric {
    fn name(&self) -> &'static str {
        "Logloss"
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn compute(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f64 {
        debug_assert_eq!(predictions.ncols(), targets.ncols());
        let preds = predictions.row(0);
        let labels = targets.row(0);
        let n = preds.len().max(1) as f64;
        let sum: f64 = preds
            .iter()
            .zip(labels.iter())
            .map(|(&p, &t)| {
                let p = (p as f64).clamp(PROB_EPS, 1.0 - PROB_EPS);
                let t = t as f64;
                -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
            })
            .sum();
        sum / n
    }
}

/// Fraction of samples where the thresholded positive-class probability
/// matches the label.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl MetricFn for Accuracy {
    fn name(&self) -> &'static str {
        "Accuracy"
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn compute(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f64 {
        debug_assert_eq!(predictions.ncols(), targets.ncols());
        let preds = predictions.row(0);
        let labels = targets.row(0);
        let n = preds.len().max(1) as f64;
        let correct = preds
            .iter()
            .zip(labels.iter())
            .filter(|(&p, &t)| (p >= 0.5) == (t >= 0.5))
            .count();
        correct as f64 / n
    }
}

/// Fraction of samples where the argmax class matches the label code.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiClassAccuracy;

impl MetricFn for MultiClassAccuracy {
    fn name(&self) -> &'static str {
        "Accuracy"
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn compute(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f64 {
        debug_assert_eq!(predictions.ncols(), targets.ncols());
        let labels = targets.row(0);
        let n = predictions.ncols().max(1) as f64;
        let mut correct = 0usize;
        for (i, &label) in labels.iter().enumerate() {
            let column = predictions.column(i);
            let mut best = 0usize;
            let mut best_score = f32::NEG_INFINITY;
            for (k, &score) in column.iter().enumerate() {
                if score > best_score {
                    best_score = score;
                    best = k;
                }
            }
            if best == label as usize {
                correct += 1;
            }
        }
        correct as f64 / n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn logloss_of_confident_correct_predictions_is_small() {
        let preds = array![[0.99f32, 0.01]];
        let targets = array![[1.0f32, 0.0]];
        assert!(LogLossMetric.compute(preds.view(), targets.view()) < 0.02);
    }

    #[test]
    fn logloss_handles_saturated_probabilities() {
        let preds = array![[1.0f32, 0.0]];
        let targets = array![[0.0f32, 1.0]];
        let value = LogLossMetric.compute(preds.view(), targets.view());
        assert!(value.is_finite());
    }

    #[test]
    fn accuracy_thresholds_at_half() {
        let preds = array![[0.9f32, 0.4, 0.6, 0.1]];
        let targets = array![[1.0f32, 0.0, 0.0, 0.0]];
        assert_abs_diff_eq!(Accuracy.compute(preds.view(), targets.view()), 0.75);
    }

    #[test]
    fn multiclass_accuracy_uses_argmax() {
        let preds = array![[0.7f32, 0.1], [0.2, 0.1], [0.1, 0.8]];
        let targets = array![[0.0f32, 1.0]];
        assert_abs_diff_eq!(
            MultiClassAccuracy.compute(preds.view(), targets.view()),
            0.5
        );
    }
}
