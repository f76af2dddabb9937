use crate::{bim, fgsm, illcm, noop, onestep};
use anyhow::{anyhow, Result};
use gradsign_oracle::{Criterion, Differentiable};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttackMethod {
    Noop,
    Fgsm,
    Onestep,
    Bim,
    Illcm,
}

impl AttackMethod {
    pub const ALL: [AttackMethod; 5] = [
        AttackMethod::Noop,
        AttackMethod::Fgsm,
        AttackMethod::Onestep,
        AttackMethod::Bim,
        AttackMethod::Illcm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AttackMethod::Noop => "noop",
            AttackMethod::Fgsm => "fgsm",
            AttackMethod::Onestep => "onestep",
            AttackMethod::Bim => "bim",
            AttackMethod::Illcm => "illcm",
        }
    }

    pub fn is_targeted(&self) -> bool {
        matches!(self, AttackMethod::Onestep | AttackMethod::Illcm)
    }

    pub fn is_iterative(&self) -> bool {
        matches!(self, AttackMethod::Bim | AttackMethod::Illcm)
    }
}

impl fmt::Display for AttackMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttackMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        AttackMethod::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| anyhow!("Unsupported attack method: {}", s))
    }
}

/// Runs `method` with hyperparameters parsed from a JSON object; `None` selects
/// the method's defaults.
pub fn run_attack<M, C>(
    method: AttackMethod,
    model: &M,
    data: &ArrayD<f32>,
    label: &[usize],
    criterion: &C,
    hyperparameters: &Option<Map<String, Value>>,
) -> Result<ArrayD<f32>>
where
    M: Differentiable + ?Sized,
    C: Criterion + ?Sized,
{
    macro_rules! dispatch_attacks {
        ( $( ($variant:ident, $m:ident) ),+ $(,)? ) => {
            match method {
                $(
                    AttackMethod::$variant => $m::attack(
                        model,
                        data,
                        label,
                        criterion,
                        &$m::Hyperparameters::from_map(hyperparameters)?,
                    ),
                )+
            }
        };
    }

    dispatch_attacks!(
        (Noop, noop),
        (Fgsm, fgsm),
        (Onestep, onestep),
        (Bim, bim),
        (Illcm, illcm),
    )
}
