#![recursion_limit = "256"]
//! Handwritten digit recognition: a small convolutional classifier trained
//! on MNIST-style 28×28 grayscale images, plus the inference service a
//! drawing surface calls to classify a captured canvas.
//!
//! Layers, outermost first:
//!   cli → application → domain / data / ml → infra
//!
//! Only `ml` and `infra` touch burn. `domain` is plain Rust, so the concepts
//! (examples, corpora, probability vectors) are testable without a backend.

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;
pub mod ml;

pub use error::{
    ArtifactError, DataShapeError, DivergenceWarning, InferenceError, PreprocessError, TrainError,
};
pub use ml::inferencer::InferenceService;
