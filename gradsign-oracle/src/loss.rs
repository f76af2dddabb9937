use crate::{Criterion, OracleError};
use anyhow::Result;
use ndarray::{Array2, ArrayView2, Axis};

fn check_labels(scores: &ArrayView2<'_, f32>, labels: &[usize]) -> Result<()> {
    let (batch, classes) = scores.dim();
    if labels.len() != batch {
        return Err(OracleError::BatchMismatch {
            scores: batch,
            labels: labels.len(),
        }
        .into());
    }
    if let Some(&label) = labels.iter().find(|&&label| label >= classes) {
        return Err(OracleError::LabelOutOfRange { label, classes }.into());
    }
    Ok(())
}

fn log_sum_exp(row: ndarray::ArrayView1<'_, f32>) -> f32 {
    let max = row.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    max + row.iter().map(|&v| (v - max).exp()).sum::<f32>().ln()
}

/// Softmax cross-entropy on raw scores, averaged over the batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropyLoss;

impl Criterion for CrossEntropyLoss {
    fn loss(&self, scores: ArrayView2<'_, f32>, labels: &[usize]) -> Result<f32> {
        check_labels(&scores, labels)?;
        if labels.is_empty() {
            return Ok(0.0);
        }
        let total = scores
            .axis_iter(Axis(0))
            .zip(labels)
            .map(|(row, &label)| log_sum_exp(row) - row[label])
            .sum::<f32>();
        Ok(total / labels.len() as f32)
    }

    fn grad(&self, scores: ArrayView2<'_, f32>, labels: &[usize]) -> Result<Array2<f32>> {
        check_labels(&scores, labels)?;
        let batch = labels.len().max(1) as f32;
        let mut grad = scores.to_owned();
        for (mut row, &label) in grad.axis_iter_mut(Axis(0)).zip(labels) {
            let lse = log_sum_exp(row.view());
            row.mapv_inplace(|v| (v - lse).exp() / batch);
            row[label] -= 1.0 / batch;
        }
        Ok(grad)
    }
}

/// Mean squared error between scores and one-hot labels, averaged over every element.
#[derive(Debug, Clone, Copy, Default)]
pub struct MseLoss;

impl MseLoss {
    fn residual(scores: &ArrayView2<'_, f32>, labels: &[usize]) -> Array2<f32> {
        let mut residual = scores.to_owned();
        for (mut row, &label) in residual.axis_iter_mut(Axis(0)).zip(labels) {
            row[label] -= 1.0;
        }
        residual
    }
}

impl Criterion for MseLoss {
    fn loss(&self, scores: ArrayView2<'_, f32>, labels: &[usize]) -> Result<f32> {
        check_labels(&scores, labels)?;
        if scores.is_empty() {
            return Ok(0.0);
        }
        let residual = Self::residual(&scores, labels);
        Ok(residual.mapv(|r| r * r).sum() / residual.len() as f32)
    }

    fn grad(&self, scores: ArrayView2<'_, f32>, labels: &[usize]) -> Result<Array2<f32>> {
        check_labels(&scores, labels)?;
        let n = scores.len().max(1) as f32;
        Ok(Self::residual(&scores, labels).mapv(|r| 2.0 * r / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_cross_entropy_uniform_scores() {
        let scores = arr2(&[[0.0f32, 0.0], [1.0, 1.0]]);
        let loss = CrossEntropyLoss.loss(scores.view(), &[0, 1]).unwrap();
        assert!((loss - 2.0f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn test_cross_entropy_grad_rows_sum_to_zero() {
        let scores = arr2(&[[0.3f32, -1.2, 2.0], [0.0, 0.5, -0.5]]);
        let grad = CrossEntropyLoss.grad(scores.view(), &[2, 0]).unwrap();
        for row in grad.axis_iter(Axis(0)) {
            assert!(row.sum().abs() < 1e-6);
        }
        assert!(grad[[0, 2]] < 0.0);
        assert!(grad[[1, 0]] < 0.0);
    }

    #[test]
    fn test_mse_against_one_hot() {
        let scores = arr2(&[[1.0f32, 0.0], [0.0, 0.0]]);
        assert_eq!(MseLoss.loss(scores.view(), &[0, 1]).unwrap(), 0.25);
        let grad = MseLoss.grad(scores.view(), &[0, 1]).unwrap();
        assert_eq!(grad, arr2(&[[0.0f32, 0.0], [0.0, -0.5]]));
    }

    #[test]
    fn test_label_checks() {
        let scores = arr2(&[[1.0f32, 0.0]]);
        let err = CrossEntropyLoss.loss(scores.view(), &[0, 1]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<OracleError>(),
            Some(&OracleError::BatchMismatch {
                scores: 1,
                labels: 2
            })
        );
        let err = MseLoss.grad(scores.view(), &[2]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<OracleError>(),
            Some(&OracleError::LabelOutOfRange {
                label: 2,
                classes: 2
            })
        );
    }
}
