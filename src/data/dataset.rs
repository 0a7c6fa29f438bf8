use burn::data::dataset::Dataset;

use crate::domain::example::LabeledExample;

pub struct DigitDataset {
    examples: Vec<LabeledExample>,
}

impl DigitDataset {
    pub fn new(examples: Vec<LabeledExample>) -> Self { Self { examples } }
}

impl Dataset<LabeledExample> for DigitDataset {
    fn get(&self, index: usize) -> Option<LabeledExample> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}
