use thiserror::Error;

/// Shape and label failures raised by the reference backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("input has no batch axis")]
    MissingBatchAxis,
    #[error("expected {expected} features per sample, got {got}")]
    FeatureMismatch { expected: usize, got: usize },
    #[error("{scores} score rows but {labels} labels")]
    BatchMismatch { scores: usize, labels: usize },
    #[error("label {label} out of range for {classes} classes")]
    LabelOutOfRange { label: usize, classes: usize },
    #[error("gradient shape {got:?} does not match output shape {expected:?}")]
    GradientShape {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("layer {layer} expects {expected} inputs but previous layer yields {got}")]
    LayerMismatch {
        layer: usize,
        expected: usize,
        got: usize,
    },
}
