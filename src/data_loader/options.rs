// src/data_loader/options.rs
//!
//! Loader knobs. Builder helpers are provided so callers can write a
//! fluent style:
//!
//! let opts = LoaderOptions::default()
//!     .with_batch_size(128)
//!     .drop_last(true)
//!     .shuffle(true, 42);
//!

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Number of samples per batch.
    pub batch_size: usize,
    /// Whether to drop the final, possibly incomplete batch.
    pub drop_last: bool,
    /// If true, visit samples through a shuffled sampler.
    pub shuffle: bool,
    /// RNG seed used when `shuffle == true`; `None` means a fresh random order.
    pub seed: Option<u64>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            drop_last: false,
            shuffle: false,
            seed: None,
        }
    }
}

impl LoaderOptions {
    /// Builder-style helper: change the batch size.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Builder-style helper: set `drop_last`.
    pub fn drop_last(mut self, yes: bool) -> Self {
        self.drop_last = yes;
        self
    }

    /// Enable/disable shuffling with a fixed seed.
    ///
    /// When `on` is false, the seed is left unchanged but ignored.
    pub fn shuffle(mut self, on: bool, seed: u64) -> Self {
        self.shuffle = on;
        if on {
            self.seed = Some(seed);
        }
        self
    }

    /// Shuffle with a different order on every pass.
    pub fn shuffle_unseeded(mut self) -> Self {
        self.shuffle = true;
        self.seed = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_batch_size() {
        let o = LoaderOptions::default().with_batch_size(0);
        assert_eq!(o.batch_size, 1);
    }

    #[test]
    fn shuffle_off_keeps_seed() {
        let o = LoaderOptions::default().shuffle(true, 9).shuffle(false, 1);
        assert!(!o.shuffle);
        assert_eq!(o.seed, Some(9));
    }
}
