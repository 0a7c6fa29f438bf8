// ============================================================
// Layer 3 — ImageTensor
// ============================================================
// The single-sample network input: shape (1, 28, 28, 1),
// f32 values in [0, 1]. Only ImagePreprocessor builds one from
// a raw image, so every caller gets the same shape and scale
// the network was trained on.

use crate::domain::{IMAGE_PIXELS, IMAGE_SIDE};

/// (batch, height, width, channel)
pub const IMAGE_TENSOR_SHAPE: [usize; 4] = [1, IMAGE_SIDE, IMAGE_SIDE, 1];

#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    values: Vec<f32>,
}

impl ImageTensor {
    /// Fails unless there are exactly 784 values, all in [0, 1].
    pub fn from_values(values: Vec<f32>) -> Result<Self, String> {
        if values.len() != IMAGE_PIXELS {
            return Err(format!("expected {IMAGE_PIXELS} values, got {}", values.len()));
        }
        if let Some(v) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(format!("value {v} outside [0, 1]"));
        }
        Ok(Self { values })
    }

    pub fn shape(&self) -> [usize; 4] {
        IMAGE_TENSOR_SHAPE
    }

    /// Row-major values
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
