// ============================================================
// Layer 3 — Core Traits
// ============================================================
// The seams between the core and its external collaborators.
// Corpus acquisition and image capture are outside the core;
// whatever supplies them only has to satisfy these traits.

use anyhow::Result;
use image::DynamicImage;

use crate::domain::example::Corpus;
use crate::domain::prediction::Prediction;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Anything that can supply a labeled corpus, already split.
///
/// Implementations:
///   - IdxCorpusSource → MNIST IDX files in a local directory
pub trait CorpusSource {
    fn load_corpus(&self) -> Result<Corpus>;
}

// ─── DigitRecognizer ──────────────────────────────────────────────────────────
/// Anything that maps a captured image to a predicted digit.
/// This is the whole contract a drawing surface depends on.
pub trait DigitRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<Prediction>;
}
