use super::{flatten_batch, Linear};
use crate::{Differentiable, OracleError};
use anyhow::{anyhow, Result};
use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD};
use rand::{prelude::*, rngs::StdRng};

/// Stack of [`Linear`] layers with ReLU between them; the last layer emits raw scores.
#[derive(Debug, Clone)]
pub struct MLP {
    pub lin: Vec<Linear>,
    pub layer_cnt: usize,
}

impl MLP {
    pub fn new(layer_sizes: &[usize]) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(anyhow!(
                "MLP needs at least an input and an output size, got {:?}",
                layer_sizes
            ));
        }
        let lin = layer_sizes
            .windows(2)
            .map(|w| Linear::new(w[0], w[1]))
            .collect::<Vec<_>>();
        Ok(Self {
            layer_cnt: lin.len(),
            lin,
        })
    }

    pub fn from_layers(lin: Vec<Linear>) -> Result<Self> {
        if lin.is_empty() {
            return Err(anyhow!("MLP needs at least one layer"));
        }
        for (l, pair) in lin.windows(2).enumerate() {
            if pair[1].in_features != pair[0].out_features {
                return Err(OracleError::LayerMismatch {
                    layer: l + 1,
                    expected: pair[1].in_features,
                    got: pair[0].out_features,
                }
                .into());
            }
        }
        Ok(Self {
            layer_cnt: lin.len(),
            lin,
        })
    }

    pub fn init_weights(&mut self, seed: [u8; 32]) {
        let mut rng = StdRng::from_seed(seed);
        for layer in &mut self.lin {
            layer.init_weights(rng.gen());
        }
    }

    pub fn num_classes(&self) -> usize {
        self.lin.last().map(|l| l.out_features).unwrap_or(0)
    }

    /// Returns the scores and the pre-activation output of every hidden layer.
    fn forward_with_caches(
        &self,
        input_batch: Array2<f32>,
    ) -> Result<(Array2<f32>, Vec<Array2<f32>>)> {
        let mut x = input_batch;
        let mut pre_activations = Vec::with_capacity(self.layer_cnt.saturating_sub(1));
        for (l, layer) in self.lin.iter().enumerate() {
            let linear_output = layer.forward_batch(x.view())?;
            if l < self.layer_cnt - 1 {
                x = linear_output.mapv(|v| v.max(0.0));
                pre_activations.push(linear_output);
            } else {
                x = linear_output;
            }
        }
        Ok((x, pre_activations))
    }
}

impl Differentiable for MLP {
    fn forward(&self, input: ArrayViewD<'_, f32>) -> Result<Array2<f32>> {
        let (scores, _) = self.forward_with_caches(flatten_batch(input)?)?;
        Ok(scores)
    }

    fn backward(
        &self,
        input: ArrayViewD<'_, f32>,
        grad_scores: ArrayView2<'_, f32>,
    ) -> Result<ArrayD<f32>> {
        let input_batch = flatten_batch(input.view())?;
        let batch = input_batch.nrows();
        if grad_scores.dim() != (batch, self.num_classes()) {
            return Err(OracleError::GradientShape {
                expected: vec![batch, self.num_classes()],
                got: grad_scores.shape().to_vec(),
            }
            .into());
        }
        let (_, pre_activations) = self.forward_with_caches(input_batch)?;

        let mut grad = grad_scores.to_owned();
        for l in (0..self.layer_cnt).rev() {
            if l < self.layer_cnt - 1 {
                // ReLU passes gradient only where the pre-activation was positive.
                grad.zip_mut_with(&pre_activations[l], |g, &z| {
                    if z <= 0.0 {
                        *g = 0.0;
                    }
                });
            }
            grad = self.lin[l].backward_batch(grad.view())?;
        }
        Ok(grad.into_shape(input.raw_dim())?)
    }
}
