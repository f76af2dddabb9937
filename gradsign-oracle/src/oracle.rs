use crate::GradScope;
use anyhow::Result;
use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD};

/// A classifier that can be differentiated with respect to its input.
pub trait Differentiable {
    /// Per-class scores, shape `(batch, classes)`.
    fn forward(&self, input: ArrayViewD<'_, f32>) -> Result<Array2<f32>>;

    /// Vector-Jacobian product: pulls `grad_scores` (same shape as the scores)
    /// back to a gradient with the shape of `input`.
    fn backward(
        &self,
        input: ArrayViewD<'_, f32>,
        grad_scores: ArrayView2<'_, f32>,
    ) -> Result<ArrayD<f32>>;
}

/// A scalar loss of scores against one class index per batch row.
pub trait Criterion {
    fn loss(&self, scores: ArrayView2<'_, f32>, labels: &[usize]) -> Result<f32>;

    /// Gradient of [`Criterion::loss`] with respect to `scores`.
    fn grad(&self, scores: ArrayView2<'_, f32>, labels: &[usize]) -> Result<Array2<f32>>;
}

/// Chains a criterion into a model to get loss gradients w.r.t. the input.
pub struct GradientOracle<'a, M: ?Sized, C: ?Sized> {
    model: &'a M,
    criterion: &'a C,
}

impl<'a, M, C> GradientOracle<'a, M, C>
where
    M: Differentiable + ?Sized,
    C: Criterion + ?Sized,
{
    pub fn new(model: &'a M, criterion: &'a C) -> Self {
        Self { model, criterion }
    }

    /// Scores without any gradient bookkeeping.
    pub fn scores(&self, input: ArrayViewD<'_, f32>) -> Result<Array2<f32>> {
        self.model.forward(input)
    }

    /// Forward pass on a tracked input.
    pub fn forward(&self, scope: &GradScope<'_>) -> Result<Array2<f32>> {
        self.model.forward(scope.input().view())
    }

    /// Loss value and its gradient w.r.t. the tracked input, given the scores
    /// from [`GradientOracle::forward`] on the same scope.
    pub fn input_gradient(
        &self,
        scope: &GradScope<'_>,
        scores: &Array2<f32>,
        labels: &[usize],
    ) -> Result<(f32, ArrayD<f32>)> {
        debug_assert!(scope.sample().is_tracking());
        let loss = self.criterion.loss(scores.view(), labels)?;
        let grad_scores = self.criterion.grad(scores.view(), labels)?;
        let grad = self
            .model
            .backward(scope.input().view(), grad_scores.view())?;
        Ok((loss, grad))
    }
}
