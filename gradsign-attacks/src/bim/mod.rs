//! Basic iterative method (I-FGSM): repeated FGSM steps of size `alpha`, with the
//! accumulated perturbation kept inside the `epsilon` ball.
use crate::{
    clip::{
        check_magnitude, default_alpha, default_epsilon, default_nb_iter, default_valid_max,
        default_valid_min, ValidRange,
    },
    driver::{refine, Schedule},
    engine::Objective,
};
use anyhow::{anyhow, Result};
use gradsign_oracle::{Criterion, Differentiable};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Hyperparameters {
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
    #[serde(default = "default_nb_iter")]
    pub nb_iter: usize,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default = "default_valid_min")]
    pub valid_min: f32,
    #[serde(default = "default_valid_max")]
    pub valid_max: f32,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            nb_iter: default_nb_iter(),
            alpha: default_alpha(),
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
        check_magnitude("alpha", self.alpha)?;
        self.range().validate()
    }

    pub fn range(&self) -> ValidRange {
        ValidRange {
            min: self.valid_min,
            max: self.valid_max,
        }
    }

    pub fn schedule(&self) -> Schedule {
        Schedule {
            epsilon: self.epsilon,
            alpha: self.alpha,
            nb_iter: self.nb_iter,
            range: self.range(),
        }
    }
}

pub fn attack<M, C>(
    model: &M,
    data: &ArrayD<f32>,
    label: &[usize],
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
        alpha = hyperparameters.alpha,
        nb_iter = hyperparameters.nb_iter,
        "bim attack"
    );
    refine(
        "bim",
        model,
        criterion,
        data,
        Objective::Untargeted(label),
        &hyperparameters.schedule(),
    )
}
