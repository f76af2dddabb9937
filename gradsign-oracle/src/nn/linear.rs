use super::flatten_batch;
use crate::{Differentiable, OracleError};
use anyhow::Result;
use ndarray::{Array1, Array2, ArrayD, ArrayView2, ArrayViewD};
use rand::{
    distributions::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};

/// Fully connected layer `y = x W^T + b` with `W` of shape `(out_features, in_features)`.
#[derive(Debug, Clone)]
pub struct Linear {
    pub in_features: usize,
    pub out_features: usize,
    pub weight: Array2<f32>,
    pub bias: Array1<f32>,
}

impl Linear {
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self {
            in_features,
            out_features,
            weight: Array2::zeros((out_features, in_features)),
            bias: Array1::zeros(out_features),
        }
    }

    pub fn from_weights(weight: Array2<f32>, bias: Array1<f32>) -> Result<Self> {
        let (out_features, in_features) = weight.dim();
        if bias.len() != out_features {
            return Err(OracleError::FeatureMismatch {
                expected: out_features,
                got: bias.len(),
            }
            .into());
        }
        Ok(Self {
            in_features,
            out_features,
            weight,
            bias,
        })
    }

    /// Uniform init in `[-1/sqrt(in), 1/sqrt(in)]`, deterministic in `seed`.
    pub fn init_weights(&mut self, seed: [u8; 32]) {
        let mut rng = StdRng::from_seed(seed);
        let bound = if self.in_features > 0 {
            1.0 / (self.in_features as f32).sqrt()
        } else {
            0.0
        };
        let distr = Uniform::new_inclusive(-bound, bound);
        self.weight = Array2::from_shape_fn((self.out_features, self.in_features), |_| {
            distr.sample(&mut rng)
        });
        self.bias = Array1::from_shape_fn(self.out_features, |_| distr.sample(&mut rng));
    }

    pub fn forward_batch(&self, input_batch: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        if input_batch.ncols() != self.in_features {
            return Err(OracleError::FeatureMismatch {
                expected: self.in_features,
                got: input_batch.ncols(),
            }
            .into());
        }
        Ok(input_batch.dot(&self.weight.t()) + &self.bias)
    }

    /// dX = dY W
    pub fn backward_batch(&self, grad_output_batch: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        if grad_output_batch.ncols() != self.out_features {
            return Err(OracleError::GradientShape {
                expected: vec![grad_output_batch.nrows(), self.out_features],
                got: grad_output_batch.shape().to_vec(),
            }
            .into());
        }
        Ok(grad_output_batch.dot(&self.weight))
    }
}

impl Differentiable for Linear {
    fn forward(&self, input: ArrayViewD<'_, f32>) -> Result<Array2<f32>> {
        let x = flatten_batch(input)?;
        self.forward_batch(x.view())
    }

    fn backward(
        &self,
        input: ArrayViewD<'_, f32>,
        grad_scores: ArrayView2<'_, f32>,
    ) -> Result<ArrayD<f32>> {
        let batch = *input.shape().first().ok_or(OracleError::MissingBatchAxis)?;
        let features = input.shape()[1..].iter().product::<usize>();
        if features != self.in_features {
            return Err(OracleError::FeatureMismatch {
                expected: self.in_features,
                got: features,
            }
            .into());
        }
        if grad_scores.dim() != (batch, self.out_features) {
            return Err(OracleError::GradientShape {
                expected: vec![batch, self.out_features],
                got: grad_scores.shape().to_vec(),
            }
            .into());
        }
        let grad_input = self.backward_batch(grad_scores)?;
        Ok(grad_input.into_shape(input.raw_dim())?)
    }
}
