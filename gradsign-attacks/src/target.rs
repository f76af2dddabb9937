use anyhow::Result;
use gradsign_oracle::{least_likely_classes, Differentiable};
use ndarray::{Array2, ArrayD};
use std::borrow::Cow;
use tracing::debug;

/// The explicit target when given, otherwise the least-likely class of each row
/// of `scores`.
pub fn resolve_target<'a>(
    scores: &Array2<f32>,
    explicit: Option<&'a [usize]>,
) -> Cow<'a, [usize]> {
    match explicit {
        Some(target) => Cow::Borrowed(target),
        None => {
            let target = least_likely_classes(scores.view());
            debug!(?target, "derived least-likely target");
            Cow::Owned(target)
        }
    }
}

/// Least-likely classes for `data` under the model, read once from a plain
/// forward pass.
pub fn snapshot_least_likely<M: Differentiable + ?Sized>(
    model: &M,
    data: &ArrayD<f32>,
) -> Result<Vec<usize>> {
    let scores = model.forward(data.view())?;
    Ok(least_likely_classes(scores.view()))
}
