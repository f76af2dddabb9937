//! Gradient oracle for sign-gradient attacks: the model/criterion seams, the
//! scoped gradient-tracking guard and a small reference backend.

mod error;
pub use error::*;
mod loss;
pub use loss::*;
pub mod nn;
mod oracle;
pub use oracle::*;
mod sample;
pub use sample::*;
mod scores;
pub use scores::*;
