//! Gradient-sign adversarial attacks: FGSM, the one-step target class method,
//! their iterative forms (BIM and ILLCM) and a no-op control.
//!
//! Every attack has the shape
//! `attack(model, data, label, criterion, &Hyperparameters) -> Result<ArrayD<f32>>`
//! and never mutates `data`.

pub mod clip;
pub mod driver;
pub mod engine;
pub mod method;
pub mod settings;
pub mod target;

pub mod bim;
pub mod fgsm;
pub mod illcm;
pub mod noop;
pub mod onestep;

pub use method::{run_attack, AttackMethod};
pub use settings::{load_settings, AttackSettings};
