// Control attack: same call shape as the others, returns the input untouched.
use anyhow::{anyhow, Result};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Hyperparameters {}

impl Hyperparameters {
    pub fn from_map(hyperparameters: &Option<Map<String, Value>>) -> Result<Self> {
        match hyperparameters {
            Some(hp) => serde_json::from_value::<Hyperparameters>(Value::Object(hp.clone()))
                .map_err(|e| anyhow!("Failed to parse hyperparameters: {}", e)),
            None => Ok(Self::default()),
        }
    }
}

pub fn attack<M: ?Sized, C: ?Sized>(
    _model: &M,
    data: &ArrayD<f32>,
    _label: &[usize],
    _criterion: &C,
    _hyperparameters: &Hyperparameters,
) -> Result<ArrayD<f32>> {
    Ok(data.clone())
}
