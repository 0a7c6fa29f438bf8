// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: mean cross-entropy over the epoch's training batches
//   - train_acc:  fraction of training examples classified correctly
//                 (measured with dropout active)
//   - val_loss:   mean cross-entropy on the validation subset
//   - val_acc:    fraction of validation examples classified correctly
//
// Output file: <output_dir>/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,train_acc,val_loss,val_acc
//   1,0.412300,0.871200,0.098400,0.969800
//   2,0.143900,0.957600,0.061200,0.980100
//   ...
//
// The file is appended to across runs; the header is written
// only when the file is first created.
//
// Reference: Rust Book §12 (I/O and File Handling)

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "epoch,train_loss,train_acc,val_loss,val_acc";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all finite training batches.
    /// A fresh model sits near ln(10) ≈ 2.30
    pub train_loss: f64,

    /// Range: [0.0, 1.0]
    pub train_acc: f64,

    /// Average cross-entropy loss on the validation set, dropout off
    pub val_loss: f64,

    /// Range: [0.0, 1.0]
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:      usize,
        train_loss: f64,
        train_acc:  f64,
        val_loss:   f64,
        val_acc:    f64,
    ) -> Self {
        Self { epoch, train_loss, train_acc, val_loss, val_acc }
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6},{:.6}",
            self.epoch, self.train_loss, self.train_acc, self.val_loss, self.val_acc,
        )
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
#[derive(Debug)]
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create `<dir>/metrics.csv`, writing the header if the file is new.
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> io::Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}, val_acc={:.4}",
            m.epoch, m.train_loss, m.val_loss, m.val_acc,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_row_format() {
        let m = EpochMetrics::new(3, 0.5, 0.875, 0.25, 0.9);
        assert_eq!(m.csv_row(), "3,0.500000,0.875000,0.250000,0.900000");
    }

    #[test]
    fn test_header_then_one_row_per_epoch() {
        let dir = std::env::temp_dir().join(format!("digit_recognizer_metrics_{}", std::process::id()));
        fs::remove_dir_all(&dir).ok();

        let logger = MetricsLogger::new(&dir).unwrap();
        logger.log(&EpochMetrics::new(1, 1.0, 0.5, 0.9, 0.6)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.8, 0.7, 0.7, 0.8)).unwrap();

        // Reopening must not write a second header
        let logger = MetricsLogger::new(&dir).unwrap();
        let text   = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[2].starts_with("2,"));

        fs::remove_dir_all(&dir).ok();
    }
}
