use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{log_softmax, relu, softmax},
};

use crate::domain::{image_tensor::ImageTensor, IMAGE_SIDE, NUM_CLASSES};

// Fixed architecture. Nothing here is configurable at runtime;
// an artifact whose parameter shapes differ from these is corrupt.
const CONV1_FILTERS:  usize = 32;
const CONV2_FILTERS:  usize = 64;
const KERNEL:         usize = 3;
const HIDDEN_UNITS:   usize = 256;
const CONV_DROPOUT:   f64   = 0.25;
const DENSE_DROPOUT:  f64   = 0.5;

// 28 → 26 → 24 after two valid 3×3 convolutions, → 12 after pooling
const POOLED_SIDE:    usize = (IMAGE_SIDE - 2 * (KERNEL - 1)) / 2;
const FLAT_FEATURES:  usize = CONV2_FILTERS * POOLED_SIDE * POOLED_SIDE;

/// Whether dropout is active for a forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fresh dropout masks on every pass
    Train,
    /// Dropout is the identity; output is deterministic
    Infer,
}

#[derive(Module, Debug)]
pub struct DigitClassifier<B: Backend> {
    conv1:         Conv2d<B>,
    conv2:         Conv2d<B>,
    pool:          MaxPool2d,
    conv_dropout:  Dropout,
    fc1:           Linear<B>,
    dense_dropout: Dropout,
    fc2:           Linear<B>,
}

impl<B: Backend> DigitClassifier<B> {
    /// Fresh, randomly initialized classifier.
    pub fn init(device: &B::Device) -> Self {
        Self {
            conv1: Conv2dConfig::new([1, CONV1_FILTERS], [KERNEL, KERNEL]).init(device),
            conv2: Conv2dConfig::new([CONV1_FILTERS, CONV2_FILTERS], [KERNEL, KERNEL]).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            conv_dropout: DropoutConfig::new(CONV_DROPOUT).init(),
            fc1: LinearConfig::new(FLAT_FEATURES, HIDDEN_UNITS).init(device),
            dense_dropout: DropoutConfig::new(DENSE_DROPOUT).init(),
            fc2: LinearConfig::new(HIDDEN_UNITS, NUM_CLASSES).init(device),
        }
    }

    /// images: [batch, 28, 28, 1] → pre-softmax scores [batch, 10]
    pub fn forward_logits(&self, images: Tensor<B, 4>, mode: Mode) -> Tensor<B, 2> {
        let [batch, height, width, channels] = images.dims();

        // burn convolutions are channels-first. With a single channel,
        // NHWC and NCHW share the same memory order, so reshape is exact.
        let x = images.reshape([batch, channels, height, width]);

        let x = relu(self.conv1.forward(x)); // [batch, 32, 26, 26]
        let x = relu(self.conv2.forward(x)); // [batch, 64, 24, 24]
        let x = self.pool.forward(x);        // [batch, 64, 12, 12]
        let x = self.dropout(&self.conv_dropout, x, mode);

        let x = x.reshape([batch, FLAT_FEATURES]);
        let x = relu(self.fc1.forward(x));
        let x = self.dropout(&self.dense_dropout, x, mode);

        self.fc2.forward(x)
    }

    /// images: [batch, 28, 28, 1] → ProbabilityVectors [batch, 10]
    pub fn forward(&self, images: Tensor<B, 4>, mode: Mode) -> Tensor<B, 2> {
        softmax(self.forward_logits(images, mode), 1)
    }

    /// Returns (mean categorical cross-entropy, logits).
    pub fn forward_loss(
        &self,
        images:  Tensor<B, 4>,
        targets: Tensor<B, 2>,
        mode:    Mode,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward_logits(images, mode);
        let loss   = categorical_cross_entropy(logits.clone(), targets);
        (loss, logits)
    }

    fn dropout<const D: usize>(&self, layer: &Dropout, x: Tensor<B, D>, mode: Mode) -> Tensor<B, D> {
        match mode {
            // burn's Dropout only draws masks on autodiff backends,
            // which is where every training pass runs.
            Mode::Train => layer.forward(x),
            Mode::Infer => x,
        }
    }
}

/// −Σ target · log_softmax(logits), averaged over the batch.
///
/// targets are one-hot LabelVectors. log_softmax keeps this finite
/// for large logits where log(softmax(x)) would underflow.
pub fn categorical_cross_entropy<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    let log_probs = log_softmax(logits, 1);
    (targets * log_probs).sum_dim(1).mean().neg()
}

/// Lift a single ImageTensor into a [1, 28, 28, 1] backend tensor.
pub fn input_tensor<B: Backend>(image: &ImageTensor, device: &B::Device) -> Tensor<B, 4> {
    Tensor::from_data(TensorData::new(image.values().to_vec(), image.shape()), device)
}

/// Verify every parameter tensor in `record` has the shape `DigitClassifier::init` creates.
pub fn check_record_shapes<B: Backend>(record: &DigitClassifierRecord<B>) -> Result<(), String> {
    fn same_shape(name: &str, got: &[usize], want: &[usize]) -> Result<(), String> {
        if got == want {
            Ok(())
        } else {
            Err(format!("{name} has shape {got:?}, expected {want:?}"))
        }
    }

    fn expect_bias<B: Backend>(
        name: &str,
        bias: &Option<burn::module::Param<Tensor<B, 1>>>,
        want: usize,
    ) -> Result<(), String> {
        match bias {
            Some(b) => same_shape(name, &b.val().dims(), &[want]),
            None    => Err(format!("{name} is missing")),
        }
    }

    same_shape("conv1.weight", &record.conv1.weight.val().dims(), &[CONV1_FILTERS, 1, KERNEL, KERNEL])?;
    expect_bias::<B>("conv1.bias", &record.conv1.bias, CONV1_FILTERS)?;
    same_shape("conv2.weight", &record.conv2.weight.val().dims(), &[CONV2_FILTERS, CONV1_FILTERS, KERNEL, KERNEL])?;
    expect_bias::<B>("conv2.bias", &record.conv2.bias, CONV2_FILTERS)?;
    same_shape("fc1.weight", &record.fc1.weight.val().dims(), &[FLAT_FEATURES, HIDDEN_UNITS])?;
    expect_bias::<B>("fc1.bias", &record.fc1.bias, HIDDEN_UNITS)?;
    same_shape("fc2.weight", &record.fc2.weight.val().dims(), &[HIDDEN_UNITS, NUM_CLASSES])?;
    expect_bias::<B>("fc2.bias", &record.fc2.bias, NUM_CLASSES)?;
    Ok(())
}
