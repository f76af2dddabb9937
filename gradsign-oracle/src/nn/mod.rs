mod linear;
pub use linear::*;
mod mlp;
pub use mlp::*;

use crate::OracleError;
use anyhow::Result;
use ndarray::{Array2, ArrayViewD};

/// Flattens every non-batch axis, giving a `(batch, features)` matrix.
pub(crate) fn flatten_batch(input: ArrayViewD<'_, f32>) -> Result<Array2<f32>> {
    let batch = *input.shape().first().ok_or(OracleError::MissingBatchAxis)?;
    let features = input.shape()[1..].iter().product::<usize>();
    Ok(input
        .as_standard_layout()
        .into_owned()
        .into_shape((batch, features))?)
}
