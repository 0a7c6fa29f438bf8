// ============================================================
// Layer 5 — Inference Service
// ============================================================
// Loads a ModelArtifact once, then classifies captured images:
//
//   image → ImagePreprocessor::normalize → [1, 28, 28, 1]
//         → forward(Mode::Infer)         → ProbabilityVector
//         → argmax (ties → lowest index) → Prediction
//
// Inference never mutates parameters, so the service is Clone
// and a clone can be handed to each concurrent caller.

use std::path::Path;

use burn::prelude::*;
use image::DynamicImage;

use crate::data::preprocessor::ImagePreprocessor;
use crate::domain::{
    prediction::{Prediction, ProbabilityVector},
    traits::DigitRecognizer,
};
use crate::error::{ArtifactError, InferenceError};
use crate::infra::artifact::ModelArtifact;
use crate::ml::{
    model::{input_tensor, DigitClassifier, Mode},
    InferBackend, InferDevice,
};

#[derive(Debug, Clone)]
pub struct InferenceService {
    model:        DigitClassifier<InferBackend>,
    preprocessor: ImagePreprocessor,
    device:       InferDevice,
}

impl InferenceService {
    /// Load the classifier saved at `path`.
    pub fn from_artifact(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let device   = InferDevice::default();
        let artifact = ModelArtifact::new(path);
        let model    = artifact.load::<InferBackend>(&device)?;
        tracing::info!("Model loaded from '{}'", artifact.path().display());
        Ok(Self::from_classifier(model, device))
    }

    /// Wrap an in-memory classifier, e.g. one just returned by training.
    pub fn from_classifier(model: DigitClassifier<InferBackend>, device: InferDevice) -> Self {
        Self { model, preprocessor: ImagePreprocessor::new(), device }
    }

    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn probabilities(&self, image: &DynamicImage) -> Result<ProbabilityVector, InferenceError> {
        let tensor = self.preprocessor.normalize(image)?;
        let input  = input_tensor::<InferBackend>(&tensor, &self.device);
        read_probabilities(self.model.forward(input, Mode::Infer))
    }

    pub fn classify(&self, image: &DynamicImage) -> Result<Prediction, InferenceError> {
        let prediction = self.probabilities(image)?.prediction();
        tracing::debug!("Classified as {prediction}");
        Ok(prediction)
    }
}

impl DigitRecognizer for InferenceService {
    fn recognize(&self, image: &DynamicImage) -> anyhow::Result<Prediction> {
        Ok(self.classify(image)?)
    }
}

/// Copy a `[1, 10]` softmax row out of the backend.
fn read_probabilities<B: Backend>(probs: Tensor<B, 2>) -> Result<ProbabilityVector, InferenceError> {
    let values = probs
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| InferenceError::Output(format!("{e:?}")))?;

    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
        return Err(InferenceError::Output(format!("non-finite probability {v}")));
    }
    ProbabilityVector::from_slice(&values)
        .ok_or_else(|| InferenceError::Output(format!("expected 10 probabilities, got {}", values.len())))
}
