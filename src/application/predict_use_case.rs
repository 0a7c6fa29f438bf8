// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Loads the model artifact once, then classifies image files:
//
//   Step 1: Load artifact           (Layer 6 - infra, via ml)
//   Step 2: Read + decode the file  (Layer 4 - data)
//   Step 3: Classify                (Layer 5 - ml)

use anyhow::{Context, Result};
use image::DynamicImage;
use std::{fs, path::Path};

use crate::data::preprocessor::ImagePreprocessor;
use crate::domain::{prediction::Prediction, traits::DigitRecognizer};
use crate::ml::inferencer::InferenceService;

pub struct PredictUseCase {
    preprocessor: ImagePreprocessor,
    service:      InferenceService,
}

impl PredictUseCase {
    /// `invert` flips dark-on-light captures to MNIST's light-on-dark.
    pub fn new(artifact: impl AsRef<Path>, invert: bool) -> Result<Self> {
        let artifact = artifact.as_ref();
        let service  = InferenceService::from_artifact(artifact)
            .with_context(|| format!("Cannot load model from '{}'. Have you run 'train' first?", artifact.display()))?;

        let preprocessor = ImagePreprocessor::new().with_inversion(invert);
        Ok(Self { preprocessor, service: service.with_preprocessor(preprocessor) })
    }

    pub fn predict_file(&self, path: impl AsRef<Path>) -> Result<Prediction> {
        let path  = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Cannot read image '{}'", path.display()))?;
        let image = self
            .preprocessor
            .decode(&bytes)
            .with_context(|| format!("Cannot decode image '{}'", path.display()))?;

        tracing::debug!("Decoded '{}' ({}x{})", path.display(), image.width(), image.height());
        self.predict(&image)
    }

    pub fn predict(&self, image: &DynamicImage) -> Result<Prediction> {
        self.service.recognize(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::artifact::ModelArtifact;
    use crate::ml::{model::DigitClassifier, InferBackend};
    use image::{GrayImage, Luma};

    #[test]
    fn test_missing_artifact_is_reported() {
        let err = PredictUseCase::new("/definitely/not/here/model", false).err().unwrap();
        assert!(format!("{err:#}").contains("not found"));
    }

    #[test]
    fn test_predict_png_file() {
        let dir = std::env::temp_dir().join(format!("digit_recognizer_predict_uc_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let model = DigitClassifier::<InferBackend>::init(&Default::default());
        ModelArtifact::new(dir.join("model")).save(&model).unwrap();

        let png = dir.join("digit.png");
        GrayImage::from_pixel(120, 80, Luma([30])).save(&png).unwrap();

        let uc = PredictUseCase::new(dir.join("model"), true).unwrap();
        let p  = uc.predict_file(&png).unwrap();
        assert!(p.label <= 9);
        assert!((0.0..=1.0).contains(&p.confidence));

        assert!(uc.predict_file(dir.join("absent.png")).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
