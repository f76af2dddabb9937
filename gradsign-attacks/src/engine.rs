use crate::{
    clip::{sign, ValidRange},
    target::resolve_target,
};
use anyhow::Result;
use gradsign_oracle::{Criterion, Differentiable, GradientOracle, Sample};
use ndarray::ArrayD;
use std::borrow::Cow;
use tracing::trace;

/// Which loss a single step differentiates and which way it moves.
#[derive(Debug, Clone, Copy)]
pub enum Objective<'a> {
    /// Ascend the loss of the true labels.
    Untargeted(&'a [usize]),
    /// Descend the loss of `target`, or of the least-likely class of each row when `None`.
    Targeted(Option<&'a [usize]>),
}

/// One sign-gradient step of size `step` from `sample`, clamped to `range`.
///
/// Gradient tracking on `sample` is held only while the oracle runs and is
/// released before this returns, whether or not the model and criterion succeed.
pub fn sign_step<M, C>(
    model: &M,
    criterion: &C,
    sample: &Sample,
    objective: Objective<'_>,
    step: f32,
    range: &ValidRange,
) -> Result<ArrayD<f32>>
where
    M: Differentiable + ?Sized,
    C: Criterion + ?Sized,
{
    let oracle = GradientOracle::new(model, criterion);
    let (direction, grad) = {
        let scope = sample.track();
        let scores = oracle.forward(&scope)?;
        let (direction, labels) = match objective {
            Objective::Untargeted(labels) => (1.0f32, Cow::Borrowed(labels)),
            Objective::Targeted(target) => (-1.0f32, resolve_target(&scores, target)),
        };
        let (loss, grad) = oracle.input_gradient(&scope, &scores, &labels)?;
        trace!(loss, direction, step, "sign-gradient step");
        (direction, grad)
    };
    let perturbed = sample.data() + &(sign(&grad) * (direction * step));
    Ok(range.clip(perturbed))
}
