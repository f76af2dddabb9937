use ndarray::ArrayD;
use std::cell::Cell;

/// A batch of inputs (axis 0 is the batch axis) plus its gradient-tracking flag.
///
/// Tracking can only be switched on through [`Sample::track`], which hands out a
/// [`GradScope`]. Dropping the scope switches tracking back to whatever it was
/// before, on every exit path. [`crate::GradientOracle::input_gradient`] asserts
/// the flag in debug builds.
#[derive(Debug)]
pub struct Sample {
    data: ArrayD<f32>,
    tracking: Cell<bool>,
}

impl Sample {
    pub fn new(data: ArrayD<f32>) -> Self {
        Self {
            data,
            tracking: Cell::new(false),
        }
    }

    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub fn into_inner(self) -> ArrayD<f32> {
        self.data
    }

    pub fn batch_size(&self) -> usize {
        self.data.shape().first().copied().unwrap_or(0)
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.get()
    }

    /// Enables gradient tracking for this sample until the returned scope is dropped.
    pub fn track(&self) -> GradScope<'_> {
        let previous = self.tracking.replace(true);
        GradScope {
            sample: self,
            previous,
        }
    }
}

impl From<ArrayD<f32>> for Sample {
    fn from(data: ArrayD<f32>) -> Self {
        Self::new(data)
    }
}

/// Proof that gradient tracking is enabled on a [`Sample`].
///
/// Input gradients are only handed out against a live scope, see
/// [`crate::GradientOracle::input_gradient`].
#[derive(Debug)]
pub struct GradScope<'a> {
    sample: &'a Sample,
    previous: bool,
}

impl<'a> GradScope<'a> {
    pub fn sample(&self) -> &'a Sample {
        self.sample
    }

    pub fn input(&self) -> &'a ArrayD<f32> {
        &self.sample.data
    }
}

impl Drop for GradScope<'_> {
    fn drop(&mut self) {
        self.sample.tracking.set(self.previous);
    }
}
