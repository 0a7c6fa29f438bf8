// ============================================================
// Error taxonomy
// ============================================================
// Typed errors for the classification core. The application
// and CLI layers wrap these in anyhow with extra context; the
// core never swallows them, except DivergenceWarning, which is
// logged and recorded in the training report.

use std::path::PathBuf;

use thiserror::Error;

/// The raw image cannot be turned into an ImageTensor.
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("image has zero extent ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("normalized image is not a valid network input: {0}")]
    InvalidTensor(String),
}

/// A captured image could not be classified.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error("classifier produced an unusable output: {0}")]
    Output(String),
}

/// A corpus entry does not match the 28×28×1 shape or the 0..=9 label range.
#[derive(Debug, Error)]
#[error("{split} example {index} is malformed: {reason}")]
pub struct DataShapeError {
    pub split:  &'static str,
    pub index:  usize,
    pub reason: String,
}

/// The loss became non-finite. Training continues; the artifact it
/// produces should not be trusted.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("loss became non-finite ({loss}) at epoch {epoch}, batch {batch}")]
pub struct DivergenceWarning {
    pub epoch: usize,
    pub batch: usize,
    pub loss:  f64,
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("model artifact '{}' is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("cannot write model artifact '{}': {reason}", .path.display())]
    Write { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    DataShape(#[from] DataShapeError),

    #[error("training subset is empty")]
    EmptyTrainingSet,

    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("cannot write epoch metrics: {0}")]
    Metrics(#[from] std::io::Error),
}
