// ============================================================
// Layer 3 — Labeled Examples and Corpus
// ============================================================
// A LabeledExample is one raw MNIST-style image: 8-bit pixels
// in row-major order plus its digit label. Width and height are
// stored explicitly so a malformed entry can exist long enough
// to be rejected with a DataShapeError during training setup.
//
// A Corpus is the fixed pair of training / validation subsets.
// It is built once and never mutated.

use serde::{Deserialize, Serialize};

use crate::domain::{IMAGE_PIXELS, IMAGE_SIDE, NUM_CLASSES};
use crate::error::DataShapeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    width:  usize,
    height: usize,
    pixels: Vec<u8>,
    label:  u8,
}

impl LabeledExample {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>, label: u8) -> Self {
        Self { width, height, pixels, label }
    }

    /// A 28×28 example, the only shape the classifier accepts.
    pub fn mnist(pixels: Vec<u8>, label: u8) -> Self {
        Self::new(IMAGE_SIDE, IMAGE_SIDE, pixels, label)
    }

    pub fn width(&self) -> usize { self.width }

    pub fn height(&self) -> usize { self.height }

    /// Row-major 8-bit luminance values
    pub fn pixels(&self) -> &[u8] { &self.pixels }

    pub fn label(&self) -> u8 { self.label }

    /// Pixels scaled into [0, 1], the same scaling ImagePreprocessor applies.
    pub fn normalized_pixels(&self) -> impl Iterator<Item = f32> + '_ {
        self.pixels.iter().map(|&p| f32::from(p) / 255.0)
    }

    pub fn label_vector(&self) -> LabelVector {
        LabelVector::one_hot(self.label)
    }

    /// Check the 28×28×1 shape and the label range.
    /// The error carries no split/index, callers fill those in.
    fn check_shape(&self) -> Result<(), String> {
        if self.width != IMAGE_SIDE || self.height != IMAGE_SIDE {
            return Err(format!(
                "expected {IMAGE_SIDE}x{IMAGE_SIDE} image, got {}x{}",
                self.width, self.height
            ));
        }
        if self.pixels.len() != IMAGE_PIXELS {
            return Err(format!(
                "expected {IMAGE_PIXELS} single-channel pixels, got {}",
                self.pixels.len()
            ));
        }
        if usize::from(self.label) >= NUM_CLASSES {
            return Err(format!("label {} outside 0..={}", self.label, NUM_CLASSES - 1));
        }
        Ok(())
    }
}

// ─── LabelVector ──────────────────────────────────────────────────────────────
/// One-hot ground truth for categorical cross-entropy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelVector([f32; NUM_CLASSES]);

impl LabelVector {
    /// Labels ≥ 10 map to the all-zero vector; they are rejected
    /// by Corpus::validate before a batch is ever built.
    pub fn one_hot(label: u8) -> Self {
        let mut v = [0.0; NUM_CLASSES];
        if let Some(slot) = v.get_mut(usize::from(label)) {
            *slot = 1.0;
        }
        Self(v)
    }

    pub fn as_slice(&self) -> &[f32] { &self.0 }
}

// ─── Corpus ───────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    train:      Vec<LabeledExample>,
    validation: Vec<LabeledExample>,
}

impl Corpus {
    pub fn new(train: Vec<LabeledExample>, validation: Vec<LabeledExample>) -> Self {
        Self { train, validation }
    }

    pub fn train(&self) -> &[LabeledExample] { &self.train }

    pub fn validation(&self) -> &[LabeledExample] { &self.validation }

    /// Reject the corpus if any entry in either subset is malformed.
    pub fn validate(&self) -> Result<(), DataShapeError> {
        for (split, examples) in [("training", &self.train), ("validation", &self.validation)] {
            for (index, example) in examples.iter().enumerate() {
                example
                    .check_shape()
                    .map_err(|reason| DataShapeError { split, index, reason })?;
            }
        }
        Ok(())
    }

    /// Consume the corpus, returning (train, validation).
    pub fn into_parts(self) -> (Vec<LabeledExample>, Vec<LabeledExample>) {
        (self.train, self.validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(label: u8) -> LabeledExample {
        LabeledExample::mnist(vec![0; IMAGE_PIXELS], label)
    }

    #[test]
    fn test_one_hot_marks_single_class() {
        let v = LabelVector::one_hot(3);
        assert_eq!(v.as_slice().iter().sum::<f32>(), 1.0);
        assert_eq!(v.as_slice()[3], 1.0);
    }

    #[test]
    fn test_normalized_pixels_in_unit_range() {
        let ex = LabeledExample::mnist((0..IMAGE_PIXELS).map(|i| (i % 256) as u8).collect(), 0);
        assert!(ex.normalized_pixels().all(|v| (0.0..=1.0).contains(&v)));
        assert_eq!(ex.normalized_pixels().max_by(f32::total_cmp), Some(1.0));
    }

    #[test]
    fn test_valid_corpus_passes() {
        let corpus = Corpus::new(vec![blank(0), blank(9)], vec![blank(5)]);
        assert!(corpus.validate().is_ok());
    }

    #[test]
    fn test_wrong_size_is_rejected() {
        let bad = LabeledExample::new(32, 32, vec![0; 32 * 32], 1);
        let corpus = Corpus::new(vec![blank(0), bad], vec![]);
        let err = corpus.validate().unwrap_err();
        assert_eq!(err.split, "training");
        assert_eq!(err.index, 1);
    }

    #[test]
    fn test_pixel_count_mismatch_is_rejected() {
        // Declared 28×28 but carries RGB data
        let bad = LabeledExample::mnist(vec![0; IMAGE_PIXELS * 3], 1);
        let corpus = Corpus::new(vec![], vec![bad]);
        assert_eq!(corpus.validate().unwrap_err().split, "validation");
    }

    #[test]
    fn test_label_out_of_range_is_rejected() {
        let corpus = Corpus::new(vec![blank(10)], vec![]);
        assert!(corpus.validate().is_err());
    }
}
