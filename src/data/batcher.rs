// ============================================================
// Layer 4 — Digit Batcher
// ============================================================
// Implements burn's Batcher trait to turn a Vec<LabeledExample>
// into tensors the classifier can consume.
//
//   Input:  N examples, each 784 u8 pixels + a label
//   Output: images  [N, 28, 28, 1]  f32 in [0, 1]
//           targets [N, 10]         one-hot LabelVectors
//           labels  [N]             class indices (for accuracy)
//
// Examples are validated before the DataLoader is built, so
// every item here already has exactly 784 pixels.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::{example::LabeledExample, IMAGE_SIDE, NUM_CLASSES};

#[derive(Debug, Clone)]
pub struct DigitBatch<B: Backend> {
    /// Shape: [batch_size, 28, 28, 1]
    pub images: Tensor<B, 4>,

    /// One-hot targets — shape: [batch_size, 10]
    pub targets: Tensor<B, 2>,

    /// Class indices — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct DigitBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> DigitBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<LabeledExample, DigitBatch<B>> for DigitBatcher<B> {
    fn batch(&self, items: Vec<LabeledExample>) -> DigitBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|ex| ex.normalized_pixels())
            .collect();

        let one_hot: Vec<f32> = items
            .iter()
            .flat_map(|ex| ex.label_vector().as_slice().to_vec())
            .collect();

        let labels: Vec<i64> = items
            .iter()
            .map(|ex| i64::from(ex.label()))
            .collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, [batch_size, IMAGE_SIDE, IMAGE_SIDE, 1]),
            &self.device,
        );

        let targets = Tensor::<B, 2>::from_data(
            TensorData::new(one_hot, [batch_size, NUM_CLASSES]),
            &self.device,
        );

        let labels = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]),
            &self.device,
        );

        DigitBatch { images, targets, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IMAGE_PIXELS;

    type TestBackend = burn::backend::NdArray<f32>;

    #[test]
    fn test_batch_shapes() {
        let batcher = DigitBatcher::<TestBackend>::new(Default::default());
        let items = vec![
            LabeledExample::mnist(vec![255; IMAGE_PIXELS], 3),
            LabeledExample::mnist(vec![0; IMAGE_PIXELS], 8),
        ];
        let batch = batcher.batch(items);

        assert_eq!(batch.images.dims(), [2, 28, 28, 1]);
        assert_eq!(batch.targets.dims(), [2, 10]);
        assert_eq!(batch.labels.dims(), [2]);
    }

    #[test]
    fn test_batch_scales_pixels_and_encodes_labels() {
        let batcher = DigitBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![LabeledExample::mnist(vec![255; IMAGE_PIXELS], 3)]);

        let max = batch.images.max().into_scalar();
        assert!((max - 1.0).abs() < 1e-6);

        let targets = batch.targets.into_data().to_vec::<f32>().unwrap();
        assert_eq!(targets[3], 1.0);
        assert_eq!(targets.iter().sum::<f32>(), 1.0);
    }
}
