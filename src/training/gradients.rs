//! Per-sample gradient and hessian storage.

use ndarray::{Array2, ArrayView2, ArrayViewMut2};

/// First and second order derivatives of the loss for one sample/output pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradsTuple {
    pub grad: f32,
    pub hess: f32,
}

impl GradsTuple {
    #[inline]
    pub fn new(grad: f32, hess: f32) -> Self {
        Self { grad, hess }
    }
}

/// Gradient buffer shaped `[n_outputs, n_samples]`, reused across rounds.
#[derive(Debug, Clone)]
pub struct Gradients {
    values: Array2<GradsTuple>,
}

impl Gradients {
    pub fn zeros(n_outputs: usize, n_samples: usize) -> Self {
        Self {
            values: Array2::default((n_outputs, n_samples)),
        }
    }

    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, GradsTuple> {
        self.values.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, GradsTuple> {
        self.values.view_mut()
    }

    /// Gradients for one output group.
    pub fn group(&self, group: usize) -> ndarray::ArrayView1<'_, GradsTuple> {
        self.values.row(group)
    }

    /// Zero out the gradient and hessian of one sample across all outputs.
    ///
    /// Used by row subsampling: dropped rows contribute nothing to any
    /// split or leaf statistic this round.
    pub fn clear_sample(&mut self, sample: usize) {
        for mut row in self.values.rows_mut() {
            row[sample] = GradsTuple::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_sample_zeroes_all_outputs() {
        let mut grads = Gradients::zeros(2, 3);
        grads.view_mut().fill(GradsTuple::new(1.0, 2.0));
        grads.clear_sample(1);

        assert_eq!(grads.group(0)[1], GradsTuple::default());
        assert_eq!(grads.group(1)[1], GradsTuple::default());
        assert_eq!(grads.group(0)[0], GradsTuple::new(1.0, 2.0));
    }
}
