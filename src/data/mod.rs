// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw pixels and tensor batches.
//
// Training path:
//
//   IDX files
//       │
//       ▼
//   IdxCorpusSource   → parses MNIST images + labels into a Corpus
//       │
//       ▼
//   DigitDataset      → implements burn's Dataset trait
//       │
//       ▼
//   DigitBatcher      → stacks examples into [N, 28, 28, 1] batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Inference path:
//
//   captured image → ImagePreprocessor → ImageTensor
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads MNIST IDX files from a local directory
pub mod loader;

/// Resizes, grayscales, and scales captured images
pub mod preprocessor;

/// Implements burn's Dataset trait for labeled examples
pub mod dataset;

/// Implements burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits a pool of examples into train/validation
pub mod splitter;
