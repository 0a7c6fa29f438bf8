// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types for the concepts the classifier works with.
//
// Rules for this layer:
//   - NO burn types
//   - NO file I/O
//   - Only structs, enums, and traits
//
// Everything the ml layer feeds into or gets out of the
// network has a domain counterpart here, so shape and range
// invariants can be checked without a backend.

/// Image side length the classifier is built for
pub const IMAGE_SIDE: usize = 28;

/// Pixels in one image (28 × 28, single channel)
pub const IMAGE_PIXELS: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Number of digit classes
pub const NUM_CLASSES: usize = 10;

/// Labeled training images and the train/validation corpus
pub mod example;

/// The normalized (1, 28, 28, 1) network input
pub mod image_tensor;

/// Probability vectors and the (label, confidence) result
pub mod prediction;

/// Abstractions implemented by other layers
pub mod traits;
