// ============================================================
// Layer 3 — ProbabilityVector and Prediction
// ============================================================
// The network's softmax output and the (label, confidence)
// pair derived from it. Argmax ties resolve to the lowest
// class index.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::NUM_CLASSES;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityVector([f32; NUM_CLASSES]);

impl ProbabilityVector {
    /// Returns None unless `values` has exactly ten entries.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        <[f32; NUM_CLASSES]>::try_from(values).ok().map(Self)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Index of the largest probability; on exact ties, the lowest index.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.0.iter().enumerate().skip(1) {
            if p > self.0[best] {
                best = i;
            }
        }
        best
    }

    pub fn prediction(&self) -> Prediction {
        let label = self.argmax();
        Prediction {
            label:      label as u8,
            confidence: self.0[label].clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Digit class in 0..=9
    pub label: u8,
    /// Probability of `label`, in [0, 1]
    pub confidence: f32,
}

impl Prediction {
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

/// "<label>, <percent>%", the text a drawing surface shows next to the canvas.
impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}%", self.label, self.confidence_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_tie_prefers_lowest_index() {
        let mut p = [0.0; NUM_CLASSES];
        p[2] = 0.4;
        p[7] = 0.4;
        p[9] = 0.2;
        let pv = ProbabilityVector::from_slice(&p).unwrap();
        assert_eq!(pv.argmax(), 2);
        assert_eq!(pv.prediction().label, 2);
    }

    #[test]
    fn test_uniform_vector_picks_zero() {
        let pv = ProbabilityVector::from_slice(&[0.1; NUM_CLASSES]).unwrap();
        assert_eq!(pv.prediction().label, 0);
    }

    #[test]
    fn test_confidence_is_max_probability() {
        let mut p = [0.01; NUM_CLASSES];
        p[4] = 0.91;
        let pred = ProbabilityVector::from_slice(&p).unwrap().prediction();
        assert_eq!(pred.label, 4);
        assert!((pred.confidence - 0.91).abs() < 1e-6);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(ProbabilityVector::from_slice(&[1.0; 3]).is_none());
    }

    #[test]
    fn test_display_format() {
        let pred = Prediction { label: 7, confidence: 0.876 };
        assert_eq!(pred.to_string(), "7, 88%");
    }
}
