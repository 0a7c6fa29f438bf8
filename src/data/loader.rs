// ============================================================
// Layer 4 — MNIST IDX Loader
// ============================================================
// Reads the four standard MNIST files from a local directory:
//
//   train-images-idx3-ubyte   → training images
//   train-labels-idx1-ubyte   → training labels
//   t10k-images-idx3-ubyte    → validation images
//   t10k-labels-idx1-ubyte    → validation labels
//
// Each may also be present with a `.gz` suffix, the form the
// files are usually downloaded in.
//
// IDX layout (all integers big-endian u32):
//   images: magic 0x00000803 | count | rows | cols | pixels…
//   labels: magic 0x00000801 | count | labels…
//
// This module performs no downloading, the corpus is an input
// the caller provides.

use anyhow::{bail, ensure, Context, Result};
use flate2::read::GzDecoder;
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use crate::domain::example::{Corpus, LabeledExample};
use crate::domain::traits::CorpusSource;

const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
const TEST_IMAGES:  &str = "t10k-images-idx3-ubyte";
const TEST_LABELS:  &str = "t10k-labels-idx1-ubyte";

const IMAGES_MAGIC: u32 = 0x0000_0803;
const LABELS_MAGIC: u32 = 0x0000_0801;

/// Loads an MNIST corpus from IDX files.
pub struct IdxCorpusSource {
    dir:            PathBuf,
    max_train:      Option<usize>,
    max_validation: Option<usize>,
}

impl IdxCorpusSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), max_train: None, max_validation: None }
    }

    /// Keep only the first N examples of each subset, for quick runs.
    pub fn with_limits(mut self, max_train: Option<usize>, max_validation: Option<usize>) -> Self {
        self.max_train      = max_train;
        self.max_validation = max_validation;
        self
    }

    fn load_split(&self, images: &str, labels: &str, limit: Option<usize>) -> Result<Vec<LabeledExample>> {
        let image_bytes = read_idx_file(&self.dir, images)?;
        let label_bytes = read_idx_file(&self.dir, labels)?;

        let (rows, cols, pixels) = parse_images(&image_bytes)
            .with_context(|| format!("Malformed image file '{images}'"))?;
        let labels = parse_labels(&label_bytes)
            .with_context(|| format!("Malformed label file '{labels}'"))?;

        let image_len = rows * cols;
        let count     = pixels.len() / image_len.max(1);
        ensure!(
            count == labels.len(),
            "{images} holds {count} images but {} labels were found",
            labels.len()
        );

        let take = limit.unwrap_or(count).min(count);
        Ok(pixels
            .chunks(image_len.max(1))
            .zip(labels)
            .take(take)
            .map(|(px, label)| LabeledExample::new(cols, rows, px.to_vec(), label))
            .collect())
    }
}

impl CorpusSource for IdxCorpusSource {
    fn load_corpus(&self) -> Result<Corpus> {
        ensure!(
            self.dir.is_dir(),
            "MNIST directory '{}' does not exist",
            self.dir.display()
        );

        let train = self.load_split(TRAIN_IMAGES, TRAIN_LABELS, self.max_train)?;
        let validation = self.load_split(TEST_IMAGES, TEST_LABELS, self.max_validation)?;

        tracing::info!(
            "Loaded MNIST corpus from '{}': {} training, {} validation",
            self.dir.display(),
            train.len(),
            validation.len()
        );
        Ok(Corpus::new(train, validation))
    }
}

/// Read `<dir>/<name>`, falling back to `<dir>/<name>.gz`.
fn read_idx_file(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let plain = dir.join(name);
    if plain.exists() {
        tracing::debug!("Reading '{}'", plain.display());
        return fs::read(&plain).with_context(|| format!("Cannot read '{}'", plain.display()));
    }

    let gz = dir.join(format!("{name}.gz"));
    if gz.exists() {
        tracing::debug!("Reading '{}'", gz.display());
        let file = fs::File::open(&gz).with_context(|| format!("Cannot open '{}'", gz.display()))?;
        let mut bytes = Vec::new();
        GzDecoder::new(file)
            .read_to_end(&mut bytes)
            .with_context(|| format!("Cannot decompress '{}'", gz.display()))?;
        return Ok(bytes);
    }

    bail!("Neither '{}' nor '{}' exists", plain.display(), gz.display())
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    let word = bytes
        .get(offset..offset + 4)
        .context("File is shorter than its header")?;
    Ok(u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
}

/// Returns (rows, cols, pixel bytes for all images).
fn parse_images(bytes: &[u8]) -> Result<(usize, usize, &[u8])> {
    let magic = read_u32(bytes, 0)?;
    ensure!(magic == IMAGES_MAGIC, "bad magic number {magic:#010x}, expected {IMAGES_MAGIC:#010x}");

    let count = read_u32(bytes, 4)? as usize;
    let rows  = read_u32(bytes, 8)? as usize;
    let cols  = read_u32(bytes, 12)? as usize;

    let expected = count
        .checked_mul(rows)
        .and_then(|n| n.checked_mul(cols))
        .with_context(|| format!("header claims {count} images of {rows}x{cols}, which overflows"))?;
    let end = expected
        .checked_add(16)
        .with_context(|| format!("header claims {expected} pixel bytes, which overflows"))?;
    let pixels = bytes
        .get(16..end)
        .with_context(|| format!("expected {expected} pixel bytes, found {}", bytes.len().saturating_sub(16)))?;
    Ok((rows, cols, pixels))
}

fn parse_labels(bytes: &[u8]) -> Result<Vec<u8>> {
    let magic = read_u32(bytes, 0)?;
    ensure!(magic == LABELS_MAGIC, "bad magic number {magic:#010x}, expected {LABELS_MAGIC:#010x}");

    let count = read_u32(bytes, 4)? as usize;
    let end = count
        .checked_add(8)
        .with_context(|| format!("header claims {count} labels, which overflows"))?;
    let labels = bytes
        .get(8..end)
        .with_context(|| format!("expected {count} labels, found {}", bytes.len().saturating_sub(8)))?;
    Ok(labels.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    fn images_file(count: u32, side: u32, fill: impl Fn(usize) -> u8) -> Vec<u8> {
        let mut out = Vec::new();
        for word in [IMAGES_MAGIC, count, side, side] {
            out.extend_from_slice(&word.to_be_bytes());
        }
        out.extend((0..(count * side * side) as usize).map(fill));
        out
    }

    fn labels_file(labels: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&LABELS_MAGIC.to_be_bytes());
        out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        out.extend_from_slice(labels);
        out
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("digit_recognizer_{name}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_images_header() {
        let bytes = images_file(2, 28, |i| (i % 251) as u8);
        let (rows, cols, pixels) = parse_images(&bytes).unwrap();
        assert_eq!((rows, cols), (28, 28));
        assert_eq!(pixels.len(), 2 * 784);
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let mut bytes = images_file(1, 28, |_| 0);
        bytes[3] = 0x01;
        assert!(parse_images(&bytes).is_err());
    }

    #[test]
    fn test_truncated_file_is_rejected() {
        let mut bytes = images_file(3, 28, |_| 0);
        bytes.truncate(100);
        assert!(parse_images(&bytes).is_err());
    }

    #[test]
    fn test_oversized_header_is_rejected() {
        let mut bytes = Vec::new();
        for word in [IMAGES_MAGIC, u32::MAX, u32::MAX, u32::MAX] {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        assert!(parse_images(&bytes).is_err());

        let mut labels = Vec::new();
        for word in [LABELS_MAGIC, u32::MAX] {
            labels.extend_from_slice(&word.to_be_bytes());
        }
        assert!(parse_labels(&labels).is_err());
    }

    #[test]
    fn test_load_corpus_plain_and_gz() {
        let dir = temp_dir("idx_load");

        fs::write(dir.join(TRAIN_IMAGES), images_file(3, 28, |_| 7)).unwrap();
        fs::write(dir.join(TRAIN_LABELS), labels_file(&[1, 2, 3])).unwrap();

        // Validation split only in compressed form
        for (name, bytes) in [
            (TEST_IMAGES, images_file(2, 28, |_| 200)),
            (TEST_LABELS, labels_file(&[9, 0])),
        ] {
            let mut enc = GzEncoder::new(Vec::new(), Compression::default());
            enc.write_all(&bytes).unwrap();
            fs::write(dir.join(format!("{name}.gz")), enc.finish().unwrap()).unwrap();
        }

        let corpus = IdxCorpusSource::new(&dir).load_corpus().unwrap();
        assert_eq!(corpus.train().len(), 3);
        assert_eq!(corpus.validation().len(), 2);
        assert_eq!(corpus.train()[2].label(), 3);
        assert_eq!(corpus.validation()[0].pixels()[0], 200);
        assert!(corpus.validate().is_ok());

        let limited = IdxCorpusSource::new(&dir)
            .with_limits(Some(1), None)
            .load_corpus()
            .unwrap();
        assert_eq!(limited.train().len(), 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_count_mismatch_is_rejected() {
        let dir = temp_dir("idx_mismatch");
        fs::write(dir.join(TRAIN_IMAGES), images_file(3, 28, |_| 0)).unwrap();
        fs::write(dir.join(TRAIN_LABELS), labels_file(&[1, 2])).unwrap();
        fs::write(dir.join(TEST_IMAGES), images_file(1, 28, |_| 0)).unwrap();
        fs::write(dir.join(TEST_LABELS), labels_file(&[1])).unwrap();

        assert!(IdxCorpusSource::new(&dir).load_corpus().is_err());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_directory() {
        let source = IdxCorpusSource::new("/definitely/not/here");
        assert!(source.load_corpus().is_err());
    }
}
