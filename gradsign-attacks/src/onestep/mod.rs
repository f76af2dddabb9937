//! One-step target class method: a single descent step on the loss of a target
//! class, the least-likely one unless a target is given.
use crate::{
    clip::{check_magnitude, default_epsilon, default_valid_max, default_valid_min, ValidRange},
    engine::{sign_step, Objective},
};
use anyhow::{anyhow, Result};
use gradsign_oracle::{Criterion, Differentiable, Sample};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Hyperparameters {
    #[serde(default)]
    pub target: Option<Vec<usize>>,
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
    #[serde(default = "default_valid_min")]
    pub valid_min: f32,
    #[serde(default = "default_valid_max")]
    pub valid_max: f32,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            target: None,
            epsilon: default_epsilon(),
            valid_min: default_valid_min(),
            valid_max: default_valid_max(),
        }
    }
}

impl Hyperparameters {
    pub fn from_map(hyperparameters: &Option<Map<String, Value>>) -> Result<Self> {
        let hp = match hyperparameters {
            Some(hp) => serde_json::from_value::<Hyperparameters>(Value::Object(hp.clone()))
                .map_err(|e| anyhow!("Failed to parse hyperparameters: {}", e))?,
            None => Self::default(),
        };
        hp.validate()?;
        Ok(hp)
    }

    pub fn validate(&self) -> Result<()> {
        check_magnitude("epsilon", self.epsilon)?;
        self.range().validate()
    }

    pub fn range(&self) -> ValidRange {
        ValidRange {
            min: self.valid_min,
            max: self.valid_max,
        }
    }
}

/// `clip(x - epsilon * sign(grad L(model(x), target)))`. The label is unused;
/// it is accepted so every attack shares one call shape.
pub fn attack<M, C>(
    model: &M,
    data: &ArrayD<f32>,
    _label: &[usize],
    criterion: &C,
    hyperparameters: &Hyperparameters,
) -> Result<ArrayD<f32>>
where
    M: Differentiable + ?Sized,
    C: Criterion + ?Sized,
{
    hyperparameters.validate()?;
    debug!(
        epsilon = hyperparameters.epsilon,
        explicit_target = hyperparameters.target.is_some(),
        "onestep attack"
    );
    let sample = Sample::new(data.clone());
    sign_step(
        model,
        criterion,
        &sample,
        Objective::Targeted(hyperparameters.target.as_deref()),
        hyperparameters.epsilon,
        &hyperparameters.range(),
    )
}
