//! Classification objectives.

use ndarray::{ArrayView2, ArrayViewMut2};

use super::{ObjectiveFn, PredictionKind};
use crate::training::gradients::{Gradients, GradsTuple};

/// Hessian floor keeping leaf values finite on saturated probabilities.
const HESS_EPS: f32 = 1e-16;

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Binary cross-entropy on `{0, 1}` targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticLoss;

impl ObjectiveFn for LogisticLoss {
    fn name(&self) -> &'static str {
        "Logloss"
    }

    fn n_outputs(&self) -> usize {
        1
    }

    fn base_score(&self, targets: ArrayView2<f32>) -> Vec<f32> {
        let row = targets.row(0);
        let n = row.len().max(1) as f32;
        let mean = (row.sum() / n).clamp(1e-6, 1.0 - 1e-6);
        vec![(mean / (1.0 - mean)).ln()]
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
            let prob = sigmoid(p);
            *out = GradsTuple::new(prob - t, (prob * (1.0 - prob)).max(HESS_EPS));
        }
    }

    fn transform_predictions_inplace(&self, mut predictions: ArrayViewMut2<f32>) -> PredictionKind {
        predictions.mapv_inplace(sigmoid);
        PredictionKind::Probability
    }
}

/// Multiclass cross-entropy with one output group per class.
///
/// Targets are a single row of class codes in `0..n_classes`, stored as
/// floats.
#[derive(Debug, Clone, Copy)]
pub struct SoftmaxLoss {
    n_classes: usize,
}

impl SoftmaxLoss {
    pub fn new(n_classes: usize) -> Self {
        debug_assert!(n_classes >= 2);
        Self { n_classes }
    }

    #[inline]
    fn softmax_column(scores: &mut [f32]) {
        let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0f32;
        for s in scores.iter_mut() {
            *s = (*s - max).exp();
            sum += *s;
        }
        for s in scores.iter_mut() {
            *s /= sum;
        }
    }
}

impl ObjectiveFn for SoftmaxLoss {
    fn name(&self) -> &'static str {
        "MultiClass"
    }

    fn n_outputs(&self) -> usize {
        self.n_classes
    }

    fn base_score(&self, targets: ArrayView2<f32>) -> Vec<f32> {
        // Log class frequencies, so round zero already predicts the prior.
        let row = targets.row(0);
        let mut counts = vec![0usize; self.n_classes];
        for &t in row.iter() {
            let class = t as usize;
            debug_assert!(class < self.n_classes);
            counts[class] += 1;
        }
        let n = row.len().max(1) as f32;
        counts
            .into_iter()
            .map(|c| ((c as f32 / n).max(1e-6)).ln())
            .collect()
    }

    fn compute_gradients_into(
        &self,
        predictions: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        gradients: &mut Gradients,
    ) {
        debug_assert_eq!(predictions.nrows(), self.n_classes);
        debug_assert_eq!(predictions.ncols(), targets.ncols());
        let labels = targets.row(0);
        let mut probs = vec![0.0f32; self.n_classes];
        let mut grads = gradients.view_mut();
        for (i, &label) in labels.iter().enumerate() {
            for (k, p) in probs.iter_mut().enumerate() {
                *p = predictions[[k, i]];
            }
            Self::softmax_column(&mut probs);
            let target = label as usize;
            for (k, &p) in probs.iter().enumerate() {
                let indicator = if k == target { 1.0 } else { 0.0 };
                grads[[k, i]] = GradsTuple::new(p - indicator, (p * (1.0 - p)).max(HESS_EPS));
            }
        }
    }

    fn transform_predictions_inplace(&self, mut predictions: ArrayViewMut2<f32>) -> PredictionKind {
        for mut column in predictions.columns_mut() {
            if let Some(scores) = column.as_slice_mut() {
                Self::softmax_column(scores);
            } else {
                let mut scores: Vec<f32> = column.iter().copied().collect();
                Self::softmax_column(&mut scores);
                for (dst, src) in column.iter_mut().zip(scores) {
                    *dst = src;
                }
            }
        }
        PredictionKind::Probability
    }
}
