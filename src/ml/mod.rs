// ============================================================
// Layer 5 — ML / Model Layer (burn)
// ============================================================
// All burn-specific code apart from artifact persistence.
//
//   model.rs      — DigitClassifier: two 3×3 convolutions,
//                   2×2 max-pool, dropout, a 256-unit dense
//                   layer, and a 10-way softmax head
//
//   optimizer.rs  — Adadelta, plugged into burn's optimizer
//                   adaptor (burn itself ships no Adadelta)
//
//   trainer.rs    — Minibatch training with per-epoch validation
//
//   inferencer.rs — InferenceService: one loaded artifact,
//                   classify(image) -> (label, confidence)
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Zeiler (2012) ADADELTA

/// Convolutional digit classifier
pub mod model;

/// Adadelta adaptive learning-rate optimizer
pub mod optimizer;

/// Training loop with validation and divergence detection
pub mod trainer;

/// Inference service over a loaded artifact
pub mod inferencer;

/// Backend used for inference and validation.
#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray<f32>;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

/// Backend used for training: the inference backend wrapped in autodiff.
pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

pub type InferDevice = <InferBackend as burn::tensor::backend::Backend>::Device;
