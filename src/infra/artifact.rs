// ============================================================
// Layer 6 — Model Artifact
// ============================================================
// Persists a trained DigitClassifier as a single file so that
// training and inference can run in separate processes.
//
// Format: burn's named MessagePack record, gzip-compressed, at
// full precision (f32 weights stay f32). The file name always
// ends in `.mpk.gz`; callers may pass the path with or without
// that suffix.
//
// Loading never trusts the file:
//   - a missing file             → ArtifactError::NotFound
//   - undecodable bytes          → ArtifactError::Corrupt
//   - a record for another model → ArtifactError::Corrupt
//   - parameter shapes that differ from the fixed
//     architecture               → ArtifactError::Corrupt
//
// Shapes are checked before load_record, so a mismatched file
// never reaches the network.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::Context;
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::ArtifactError;
use crate::ml::model::{check_record_shapes, DigitClassifier, DigitClassifierRecord};

const SUFFIX: &str = ".mpk.gz";

type ArtifactRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Location of one saved classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    /// Always ends in `.mpk.gz`
    path: PathBuf,
}

impl ModelArtifact {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let path = if path.to_string_lossy().ends_with(SUFFIX) {
            path.to_path_buf()
        } else {
            let mut name = path.as_os_str().to_os_string();
            name.push(SUFFIX);
            PathBuf::from(name)
        };
        Self { path }
    }

    /// The file this artifact is read from and written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    // The recorder calls set_extension("mpk.gz") on the path it is given,
    // so hand it `<stem>.mpk` and it lands exactly on `self.path`.
    fn recorder_args(&self) -> PathBuf {
        let full = self.path.to_string_lossy();
        PathBuf::from(full.trim_end_matches(".gz"))
    }

    /// Write `model`'s parameters, overwriting any previous file.
    pub fn save<B: Backend>(&self, model: &DigitClassifier<B>) -> Result<&Path, ArtifactError> {
        let write_err = |reason: String| ArtifactError::Write { path: self.path.clone(), reason };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }

        ArtifactRecorder::new()
            .record(model.clone().into_record(), self.recorder_args())
            .map_err(|e| write_err(e.to_string()))?;

        tracing::info!("Saved model artifact to '{}'", self.path.display());
        Ok(self.path.as_path())
    }

    /// Rebuild a classifier on `device` from the saved parameters.
    pub fn load<B: Backend>(&self, device: &B::Device) -> Result<DigitClassifier<B>, ArtifactError> {
        if !self.exists() {
            return Err(ArtifactError::NotFound(self.path.clone()));
        }
        let corrupt = |reason: String| ArtifactError::Corrupt { path: self.path.clone(), reason };

        let record: DigitClassifierRecord<B> = ArtifactRecorder::new()
            .load(self.recorder_args(), device)
            .map_err(|e| corrupt(e.to_string()))?;
        check_record_shapes(&record).map_err(corrupt)?;

        tracing::debug!("Loaded model artifact '{}'", self.path.display());
        Ok(DigitClassifier::init(device).load_record(record))
    }
}

/// Write `config` as pretty JSON to `<dir>/train_config.json`.
///
/// Informational only; loading an artifact never reads it.
pub fn save_config<T: Serialize>(dir: impl AsRef<Path>, config: &T) -> anyhow::Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;

    let path = dir.join("train_config.json");
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&path, json)
        .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

    tracing::debug!("Saved training config to '{}'", path.display());
    Ok(path)
}
