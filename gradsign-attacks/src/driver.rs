use crate::{
    clip::{clip_budget, max_abs, ValidRange},
    engine::{sign_step, Objective},
};
use anyhow::{Context, Result};
use gradsign_oracle::{Criterion, Differentiable, Sample};
use ndarray::ArrayD;
use tracing::trace;

/// Step size, budget and round count for an iterative attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    pub epsilon: f32,
    pub alpha: f32,
    pub nb_iter: usize,
    pub range: ValidRange,
}

/// Runs `nb_iter` sign steps of size `alpha` from `data + eta`, keeping
/// `|eta| <= epsilon` after every round, and returns `clip(data + eta)`.
///
/// A failing round aborts the whole attack; the error names the attack and the
/// round while keeping the model or criterion error as its source.
pub fn refine<M, C>(
    attack: &'static str,
    model: &M,
    criterion: &C,
    data: &ArrayD<f32>,
    objective: Objective<'_>,
    schedule: &Schedule,
) -> Result<ArrayD<f32>>
where
    M: Differentiable + ?Sized,
    C: Criterion + ?Sized,
{
    let mut eta = ArrayD::<f32>::zeros(data.raw_dim());
    for iteration in 0..schedule.nb_iter {
        let sample = Sample::new(data + &eta);
        let perturbed = sign_step(
            model,
            criterion,
            &sample,
            objective,
            schedule.alpha,
            &schedule.range,
        )
        .with_context(|| format!("{} attack failed at iteration {}", attack, iteration))?;
        eta = clip_budget(perturbed - data, schedule.epsilon);
        trace!(attack, iteration, max_abs_eta = max_abs(&eta), "refined perturbation");
    }
    Ok(schedule.range.clip(data + &eta))
}
