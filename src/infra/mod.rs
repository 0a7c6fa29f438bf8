// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Files written to and read from disk:
//
//   artifact.rs — ModelArtifact: saves and loads classifier
//                 parameters with burn's full-precision
//                 NamedMpkGzFileRecorder. Also writes the
//                 informational train_config.json.
//
//   metrics.rs  — Training metrics logging
//                 Writes one CSV row per epoch (loss and
//                 accuracy, train and validation).
//
// Reference: Burn Book §5 (Records and Checkpointing)

/// Model artifact saving and loading
pub mod artifact;

/// Training metrics CSV logger
pub mod metrics;
