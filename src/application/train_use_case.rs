// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the MNIST corpus       (Layer 4 - data)
//   Step 2: Save config                 (Layer 6 - infra)
//   Step 3: Run training loop           (Layer 5 - ml)
//   Step 4: Save the model artifact     (Layer 6 - infra)
//   Step 5: Summarise the run
//
// Reference: Burn Book §5 (Training)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::IdxCorpusSource;
use crate::domain::traits::CorpusSource;
use crate::infra::{
    artifact::{save_config, ModelArtifact},
    metrics::MetricsLogger,
};
use crate::ml::trainer::{Trainer, TrainingConfig, TrainingReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// Where the data comes from, where the results go, and the
// hyperparameters. Saved next to the artifact as train_config.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub output_dir:     String,
    pub artifact:       String,
    pub max_train:      Option<usize>,
    pub max_validation: Option<usize>,
    #[serde(flatten)]
    pub training:       TrainingConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       "data/mnist".to_string(),
            output_dir:     "artifacts".to_string(),
            artifact:       "artifacts/digit_classifier.mpk.gz".to_string(),
            max_train:      None,
            max_validation: None,
            training:       TrainingConfig::default(),
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train on the IDX files under `data_dir`.
    pub fn execute(&self) -> Result<TrainingReport> {
        let cfg    = &self.config;
        let source = IdxCorpusSource::new(&cfg.data_dir).with_limits(cfg.max_train, cfg.max_validation);
        self.execute_with(&source)
    }

    /// Train on whatever `source` provides.
    pub fn execute_with(&self, source: &dyn CorpusSource) -> Result<TrainingReport> {
        let cfg = &self.config;

        // ── Step 1: Load corpus ───────────────────────────────────────────────
        let corpus = source.load_corpus().context("Cannot load training corpus")?;
        tracing::info!(
            "Corpus: {} training, {} validation examples",
            corpus.train().len(),
            corpus.validation().len()
        );

        // ── Step 2: Save config ───────────────────────────────────────────────
        save_config(&cfg.output_dir, cfg)?;

        // ── Step 3: Train ─────────────────────────────────────────────────────
        let logger = MetricsLogger::new(&cfg.output_dir)
            .with_context(|| format!("Cannot create metrics log in '{}'", cfg.output_dir))?;
        let trained = Trainer::new(cfg.training.clone())
            .with_metrics_logger(&logger)
            .train(corpus)?;

        // ── Step 4: Save artifact ─────────────────────────────────────────────
        let artifact = ModelArtifact::new(&cfg.artifact);
        artifact.save(&trained.classifier)?;

        // ── Step 5: Summary ───────────────────────────────────────────────────
        let report = trained.report;
        if let Some(last) = report.final_epoch() {
            tracing::info!(
                "Final epoch {}: val_loss={:.4}, val_acc={:.2}%",
                last.epoch,
                last.val_loss,
                last.val_acc * 100.0
            );
        }
        if report.diverged {
            tracing::warn!(
                "Training diverged ({} non-finite batches); '{}' should not be trusted",
                report.warnings.len(),
                artifact.path().display()
            );
        }
        tracing::info!("Metrics written to '{}'", logger.csv_path().display());

        Ok(report)
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }
}
