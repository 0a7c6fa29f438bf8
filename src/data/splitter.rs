// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// For corpora that arrive as a single pool of examples rather
// than MNIST's fixed train/t10k pair. Shuffles with a seeded
// RNG so the same seed always yields the same split, then cuts
// at round(n * train_fraction).
//
// Uses Fisher-Yates via rand::seq::SliceRandom.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::example::{Corpus, LabeledExample};

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// # Example
/// ```
/// use digit_recognizer::data::splitter::split_train_val;
/// let (train, val) = split_train_val((0..100).collect::<Vec<_>>(), 0.8, 7);
/// assert_eq!((train.len(), val.len()), (80, 20));
/// ```
pub fn split_train_val<T>(
    mut samples:    Vec<T>,
    train_fraction: f64,
    seed:           u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction.clamp(0.0, 1.0)).round() as usize;
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    (samples, val)
}

impl Corpus {
    /// Build a Corpus from one pool of examples.
    pub fn from_pool(examples: Vec<LabeledExample>, train_fraction: f64, seed: u64) -> Self {
        let (train, validation) = split_train_val(examples, train_fraction, seed);
        Corpus::new(train, validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.8, 1);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (mut train, val)  = split_train_val(items, 0.7, 1);
        train.extend(val);
        train.sort_unstable();
        assert_eq!(train, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_val((0..40).collect::<Vec<usize>>(), 0.5, 99);
        let b = split_train_val((0..40).collect::<Vec<usize>>(), 0.5, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, val) = split_train_val(Vec::<usize>::new(), 0.8, 1);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn test_corpus_from_pool() {
        let pool = (0..10u8)
            .map(|i| LabeledExample::mnist(vec![i; crate::domain::IMAGE_PIXELS], i))
            .collect::<Vec<_>>();
        let corpus = Corpus::from_pool(pool, 0.8, 3);
        assert_eq!(corpus.train().len(), 8);
        assert_eq!(corpus.validation().len(), 2);
    }

    #[test]
    fn test_full_training_split() {
        let (train, val) = split_train_val((0..10).collect::<Vec<usize>>(), 1.0, 1);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}
