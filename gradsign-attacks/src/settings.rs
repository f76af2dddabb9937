use crate::method::{run_attack, AttackMethod};
use anyhow::{Context, Result};
use gradsign_oracle::{Criterion, Differentiable};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use serde_json::{to_string, to_value, Map, Value};
use std::{collections::BTreeMap, fmt, fs};
use tracing::debug;

/// An attack method plus the JSON object its hyperparameters are parsed from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttackSettings {
    pub method: AttackMethod,
    #[serde(default)]
    pub hyperparameters: Option<Map<String, Value>>,
}

impl AttackSettings {
    pub fn new(method: AttackMethod) -> Self {
        Self {
            method,
            hyperparameters: None,
        }
    }

    pub fn run<M, C>(
        &self,
        model: &M,
        data: &ArrayD<f32>,
        label: &[usize],
        criterion: &C,
    ) -> Result<ArrayD<f32>>
    where
        M: Differentiable + ?Sized,
        C: Criterion + ?Sized,
    {
        debug!(settings = %self, "running attack");
        run_attack(
            self.method,
            model,
            data,
            label,
            criterion,
            &self.hyperparameters,
        )
    }
}

impl fmt::Display for AttackSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical_json(self).map_err(|_| fmt::Error)?)
    }
}

/// Parses settings from a JSON string, or from a file when `settings` ends in `.json`.
pub fn load_settings(settings: &str) -> Result<AttackSettings> {
    let settings = if settings.ends_with(".json") {
        fs::read_to_string(settings)
            .with_context(|| format!("Failed to read settings file: {}", settings))?
    } else {
        settings.to_string()
    };
    serde_json::from_str::<AttackSettings>(&settings).context("Failed to parse settings")
}

/// Serialises with object keys sorted at every depth, so equal settings print identically.
pub fn canonical_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    to_string(&sort_keys(to_value(value)?))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let sorted: BTreeMap<String, Value> = fields
                .into_iter()
                .map(|(key, field)| (key, sort_keys(field)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
