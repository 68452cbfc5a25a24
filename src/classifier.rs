// src/classifier.rs
//
// Seam to the external model collaborator: the crate prepares training
// samples and scores predictions, the classifier itself lives elsewhere.

use std::collections::BTreeMap;

use crate::data_loader::MnistDataset;

/// Inference result: class index -> score.
pub type ScoreMap = BTreeMap<usize, f32>;

/// One training pair in the collaborator's shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub input: Vec<f32>,
    /// One-hot target
    pub output: Vec<f32>,
}

/// A trainable, serializable classifier supplied by the caller.
///
/// The portable form is an opaque byte blob; this crate never looks inside.
pub trait Classifier: Sized {
    type Options;
    type Error: std::error::Error + Send + Sync + 'static;

    fn train(samples: &[TrainingSample], options: &Self::Options) -> Result<Self, Self::Error>;

    fn to_portable(&self) -> Result<Vec<u8>, Self::Error>;

    fn from_portable(bytes: &[u8]) -> Result<Self, Self::Error>;

    fn infer(&self, input: &[f32]) -> ScoreMap;
}

/// Every sample of `dataset` as normalized input + one-hot output.
pub fn training_samples(dataset: &MnistDataset) -> Vec<TrainingSample> {
    (0..dataset.sample_count())
        .filter_map(|i| dataset.sample(i))
        .map(|s| TrainingSample { output: s.one_hot(), input: s.input })
        .collect()
}

/// Index of the highest score; ties go to the lowest index. NaN scores are
/// ignored. `None` when no finite-comparable score exists.
pub fn max_score(scores: &ScoreMap) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    // BTreeMap iterates in ascending key order, so a strict `>` keeps the
    // lowest index among equal scores.
    for (&index, &score) in scores {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

/// Prediction tally over a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    pub total: usize,
    pub errors: usize,
}

impl Evaluation {
    /// Fraction of correct predictions in [0, 1]; 0 for an empty dataset.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.total - self.errors) as f64 / self.total as f64
    }
}

/// Run `model` over every sample and count mispredictions.
pub fn evaluate<C: Classifier>(model: &C, dataset: &MnistDataset) -> Evaluation {
    let mut eval = Evaluation::default();
    for i in 0..dataset.sample_count() {
        let Some(sample) = dataset.sample(i) else { continue };
        eval.total += 1;
        if max_score(&model.infer(&sample.input)) != Some(sample.label as usize) {
            eval.errors += 1;
        }
    }
    eval
}
