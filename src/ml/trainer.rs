// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Minibatch training with Adadelta and per-epoch validation.
//
//   - Training runs on TrainBackend (Autodiff<InferBackend>)
//     with Mode::Train, so dropout draws fresh masks per batch
//   - model.valid() hands back the same parameters on
//     InferBackend, the validation batcher builds tensors there
//     too, and validation runs with Mode::Infer
//   - argmax(1) returns [batch, 1], reshaped to [batch] before
//     comparing with the labels
//   - Every epoch runs; there is no early stopping. A non-finite
//     batch loss is reported as a DivergenceWarning and training
//     carries on
//
// Reference: Burn Book §5 (Custom Training Loop)

use std::sync::Arc;

use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::ElementConversion,
};
use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::{DigitBatch, DigitBatcher},
    dataset::DigitDataset,
};
use crate::domain::example::{Corpus, LabeledExample};
use crate::error::{DivergenceWarning, TrainError};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::{
    model::{DigitClassifier, Mode},
    optimizer::AdadeltaConfig,
    InferBackend, InferDevice, TrainBackend,
};

/// Hyperparameters for one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Samples per gradient step
    pub batch_size: usize,
    /// Full passes over the training subset
    pub epochs: usize,
    /// Reshuffle the training subset at the start of every epoch
    pub shuffle: bool,
    /// Seeds both the shuffle order and the backend RNG (init, dropout)
    pub seed: u64,
    /// Scale on the Adadelta update
    pub learning_rate: f64,
    /// Adadelta decay
    pub rho: f32,
    /// Adadelta stability constant
    pub epsilon: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batch_size:    128,
            epochs:        10,
            shuffle:       true,
            seed:          42,
            learning_rate: 1.0,
            rho:           0.95,
            epsilon:       1e-6,
        }
    }
}

/// What a finished run observed, epoch by epoch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingReport {
    pub history: Vec<EpochMetrics>,
    /// Set once any batch loss was non-finite; the parameters should not be trusted
    pub diverged: bool,
    #[serde(skip)]
    pub warnings: Vec<DivergenceWarning>,
}

impl TrainingReport {
    pub fn final_epoch(&self) -> Option<&EpochMetrics> {
        self.history.last()
    }
}

/// The product of a training run: inference-ready parameters and the report.
#[derive(Debug)]
pub struct TrainedModel {
    pub classifier: DigitClassifier<InferBackend>,
    pub report:     TrainingReport,
}

pub struct Trainer<'a> {
    config:  TrainingConfig,
    device:  InferDevice,
    metrics: Option<&'a MetricsLogger>,
}

impl<'a> Trainer<'a> {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config, device: InferDevice::default(), metrics: None }
    }

    /// Append one CSV row per epoch to `logger`.
    pub fn with_metrics_logger(mut self, logger: &'a MetricsLogger) -> Self {
        self.metrics = Some(logger);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train a fresh DigitClassifier on `corpus`.
    ///
    /// Fails before any parameter is touched if an example is malformed
    /// or the training subset is empty.
    pub fn train(&self, corpus: Corpus) -> Result<TrainedModel, TrainError> {
        let cfg = &self.config;
        if cfg.batch_size == 0 {
            return Err(TrainError::ZeroBatchSize);
        }
        corpus.validate()?;
        if corpus.train().is_empty() {
            return Err(TrainError::EmptyTrainingSet);
        }

        let (train_examples, val_examples) = corpus.into_parts();
        tracing::info!(
            "Training on {} examples, validating on {} (batch_size={}, epochs={}, shuffle={})",
            train_examples.len(), val_examples.len(), cfg.batch_size, cfg.epochs, cfg.shuffle,
        );

        TrainBackend::seed(cfg.seed);

        // ── Model + Adadelta ──────────────────────────────────────────────────
        let mut model: DigitClassifier<TrainBackend> = DigitClassifier::init(&self.device);
        tracing::info!("Model ready: {} parameters", model.num_params());

        let mut optim = AdadeltaConfig::new()
            .with_rho(cfg.rho)
            .with_epsilon(cfg.epsilon)
            .init();

        // ── Data loaders ──────────────────────────────────────────────────────
        let train_loader = batch_loader::<TrainBackend>(
            train_examples,
            cfg.batch_size,
            cfg.shuffle.then_some(cfg.seed),
            &self.device,
        );
        let val_loader = batch_loader::<InferBackend>(val_examples, cfg.batch_size, None, &self.device);

        // ── Epoch loop ────────────────────────────────────────────────────────
        let mut report = TrainingReport::default();

        for epoch in 1..=cfg.epochs {
            // ── Training phase ────────────────────────────────────────────────
            let mut train_loss = SampleMean::default();
            let mut correct    = 0usize;
            let mut seen       = 0usize;

            for (batch_index, batch) in train_loader.iter().enumerate() {
                let batch_len = batch.labels.dims()[0];
                let (loss, logits) = model.forward_loss(batch.images, batch.targets, Mode::Train);

                let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
                if !loss_val.is_finite() {
                    let warning = DivergenceWarning { epoch, batch: batch_index, loss: loss_val };
                    tracing::warn!("{warning}; continuing, but the resulting model is untrustworthy");
                    report.diverged = true;
                    report.warnings.push(warning);
                } else {
                    train_loss.add(loss_val, batch_len);
                }

                correct += count_correct(logits, batch.labels);
                seen    += batch_len;

                let grads = loss.backward();
                let grads = GradientsParams::from_grads(grads, &model);
                model = optim.step(cfg.learning_rate, model, grads);
            }

            let train_loss = train_loss.mean();
            let train_acc  = if seen > 0 { correct as f64 / seen as f64 } else { 0.0 };

            // ── Validation phase ──────────────────────────────────────────────
            let model_valid = model.valid();

            let mut val_loss    = SampleMean::default();
            let mut val_correct = 0usize;
            let mut val_seen    = 0usize;

            for batch in val_loader.iter() {
                let batch_len = batch.labels.dims()[0];
                let (loss, logits) = model_valid.forward_loss(batch.images, batch.targets, Mode::Infer);
                val_loss.add(loss.into_scalar().elem::<f64>(), batch_len);
                val_correct += count_correct(logits, batch.labels);
                val_seen    += batch_len;
            }

            let val_loss = val_loss.mean();
            let val_acc  = if val_seen > 0 { val_correct as f64 / val_seen as f64 } else { 0.0 };

            println!(
                "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.2}% | val_loss={:.4} | val_acc={:.2}%",
                epoch, cfg.epochs, train_loss, train_acc * 100.0, val_loss, val_acc * 100.0,
            );

            let metrics = EpochMetrics::new(epoch, train_loss, train_acc, val_loss, val_acc);
            if let Some(logger) = self.metrics {
                logger.log(&metrics)?;
            }
            report.history.push(metrics);
        }

        tracing::info!("Training complete");
        Ok(TrainedModel { classifier: model.valid(), report })
    }
}

/// Batches of `examples` in file order, or reshuffled on every `iter()` when
/// `shuffle_seed` is set.
fn batch_loader<B: Backend>(
    examples:     Vec<LabeledExample>,
    batch_size:   usize,
    shuffle_seed: Option<u64>,
    device:       &B::Device,
) -> Arc<dyn DataLoader<DigitBatch<B>>> {
    let mut builder = DataLoaderBuilder::new(DigitBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .num_workers(1);
    if let Some(seed) = shuffle_seed {
        builder = builder.shuffle(seed);
    }
    builder.build(DigitDataset::new(examples))
}

/// Per-sample mean of batch-mean losses, so a short final batch
/// counts only as much as the samples it holds.
#[derive(Debug, Default)]
struct SampleMean {
    weighted_sum: f64,
    samples:      usize,
}

impl SampleMean {
    fn add(&mut self, batch_mean: f64, batch_len: usize) {
        self.weighted_sum += batch_mean * batch_len as f64;
        self.samples      += batch_len;
    }

    /// NaN when nothing was added.
    fn mean(&self) -> f64 {
        if self.samples > 0 { self.weighted_sum / self.samples as f64 } else { f64::NAN }
    }
}

/// Number of rows whose argmax matches the label.
fn count_correct<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> usize {
    let [batch, _] = logits.dims();
    let predicted  = logits.argmax(1).reshape([batch]);
    let hits: i64  = predicted.equal(labels).int().sum().into_scalar().elem::<i64>();
    hits as usize
}
