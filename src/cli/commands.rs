// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `predict`
// and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::ml::trainer::TrainingConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the digit classifier on MNIST IDX files
    Train(TrainArgs),

    /// Classify one image file with a trained artifact
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory holding train-*/t10k-* IDX files (optionally .gz)
    #[arg(long, default_value = "data/mnist")]
    pub data_dir: String,

    /// Directory for metrics.csv and train_config.json
    #[arg(long, default_value = "artifacts")]
    pub output_dir: String,

    /// Where to write the trained model (.mpk.gz is appended if missing)
    #[arg(long, default_value = "artifacts/digit_classifier.mpk.gz")]
    pub artifact: String,

    /// Number of samples per gradient step
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Scale applied to every Adadelta update
    #[arg(long, default_value_t = 1.0)]
    pub learning_rate: f64,

    /// Adadelta decay rate
    #[arg(long, default_value_t = 0.95)]
    pub rho: f32,

    /// Adadelta stability constant
    #[arg(long, default_value_t = 1e-6)]
    pub epsilon: f32,

    /// Seed for weight init, dropout, and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Visit training examples in file order every epoch
    #[arg(long)]
    pub no_shuffle: bool,

    /// Use only the first N training examples
    #[arg(long)]
    pub max_train: Option<usize>,

    /// Use only the first N validation examples
    #[arg(long)]
    pub max_validation: Option<usize>,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            output_dir:     a.output_dir,
            artifact:       a.artifact,
            max_train:      a.max_train,
            max_validation: a.max_validation,
            training: TrainingConfig {
                batch_size:    a.batch_size,
                epochs:        a.epochs,
                shuffle:       !a.no_shuffle,
                seed:          a.seed,
                learning_rate: a.learning_rate,
                rho:           a.rho,
                epsilon:       a.epsilon,
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Trained model written by `train`
    #[arg(long, default_value = "artifacts/digit_classifier.mpk.gz")]
    pub artifact: String,

    /// PNG image of a single digit
    #[arg(long)]
    pub image: String,

    /// The image has dark strokes on a light background
    #[arg(long)]
    pub invert: bool,
}
