use anyhow::{anyhow, Result};
use ndarray::ArrayD;

pub(crate) fn default_epsilon() -> f32 {
    0.25
}

pub(crate) fn default_alpha() -> f32 {
    0.1
}

pub(crate) fn default_nb_iter() -> usize {
    10
}

pub(crate) fn default_valid_min() -> f32 {
    0.0
}

pub(crate) fn default_valid_max() -> f32 {
    1.0
}

/// Closed interval every attack output is clamped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRange {
    pub min: f32,
    pub max: f32,
}

impl Default for ValidRange {
    fn default() -> Self {
        Self {
            min: default_valid_min(),
            max: default_valid_max(),
        }
    }
}

impl ValidRange {
    pub fn new(min: f32, max: f32) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(anyhow!(
                "valid range bounds must be finite, got [{}, {}]",
                self.min,
                self.max
            ));
        }
        if self.min > self.max {
            return Err(anyhow!(
                "valid_min ({}) exceeds valid_max ({})",
                self.min,
                self.max
            ));
        }
        Ok(())
    }

    /// Saturating element-wise clamp.
    pub fn clip(&self, x: ArrayD<f32>) -> ArrayD<f32> {
        let (min, max) = (self.min, self.max);
        x.mapv_into(|v| v.max(min).min(max))
    }

    pub fn contains(&self, x: &ArrayD<f32>) -> bool {
        x.iter().all(|&v| v >= self.min && v <= self.max)
    }
}

/// Clamps an accumulated perturbation to `[-epsilon, +epsilon]`.
pub fn clip_budget(eta: ArrayD<f32>, epsilon: f32) -> ArrayD<f32> {
    eta.mapv_into(|v| v.max(-epsilon).min(epsilon))
}

/// Element-wise sign with `sign(0) = 0`.
pub fn sign(grad: &ArrayD<f32>) -> ArrayD<f32> {
    grad.mapv(|g| {
        if g > 0.0 {
            1.0
        } else if g < 0.0 {
            -1.0
        } else {
            0.0
        }
    })
}

pub fn max_abs(x: &ArrayD<f32>) -> f32 {
    x.fold(0.0f32, |acc, &v| acc.max(v.abs()))
}

/// Rejects step sizes and budgets the clamps cannot honour.
pub(crate) fn check_magnitude(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(anyhow!(
            "{} must be a finite non-negative number, got {}",
            name,
            value
        ));
    }
    Ok(())
}
