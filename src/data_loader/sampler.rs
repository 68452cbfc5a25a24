//! src/data_loader/sampler.rs
//! Samplers for the data loader.
//!
//! A `Sampler` produces a stream of indices into a map-style dataset.
//!  * `SequentialSampler` – yields 0..end in order.
//!  * `ShuffleSampler`    – yields 0..len in shuffled order, reproducible when seeded.

use crate::shuffle::{shuffled_indices, shuffled_indices_seeded};

/// Trait for index producers.
pub trait Sampler {
    /// Return the next index to fetch, or `None` when exhausted.
    fn next_index(&mut self) -> Option<usize>;
    /// (Optional) remaining items hint.
    fn remaining(&self) -> Option<usize> { None }
}

/// Yields `0, 1, 2, …, end-1` once.
#[derive(Debug, Clone)]
pub struct SequentialSampler {
    curr: usize,
    end: usize,
}

impl SequentialSampler {
    /// Create a sequential sampler over `[0, end)`.
    pub fn new(end: usize) -> Self {
        Self { curr: 0, end }
    }
}

impl Sampler for SequentialSampler {
    fn next_index(&mut self) -> Option<usize> {
        if self.curr < self.end {
            let i = self.curr;
            self.curr += 1;
            Some(i)
        } else {
            None
        }
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.end.saturating_sub(self.curr))
    }
}

/// Yields all indices `0..len` once, in Fisher–Yates order.
#[derive(Debug, Clone)]
pub struct ShuffleSampler {
    indices: Vec<usize>,
    pos: usize,
}

impl ShuffleSampler {
    /// Shuffled sampler for `len` items. `Some(seed)` makes the order
    /// reproducible; `None` draws from the thread RNG.
    pub fn new(len: usize, seed: Option<u64>) -> Self {
        let indices = match seed {
            Some(s) => shuffled_indices_seeded(len, s),
            None => shuffled_indices(len),
        };
        Self { indices, pos: 0 }
    }
}

impl Sampler for ShuffleSampler {
    fn next_index(&mut self) -> Option<usize> {
        let i = *self.indices.get(self.pos)?;
        self.pos += 1;
        Some(i)
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.indices.len().saturating_sub(self.pos))
    }
}
