// src/shuffle.rs
//
// Index shuffler: uniformly random permutations of sample indices.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// In-place Fisher–Yates: for i from n-1 down to 1, draw j in [0, i] and swap.
pub fn shuffle_in_place<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// A random permutation of `0..n` drawn from the thread RNG (unseeded).
pub fn shuffled_indices(n: usize) -> Vec<usize> {
    shuffled_indices_with(n, &mut rand::rng())
}

/// A random permutation of `0..n` drawn from `rng`.
pub fn shuffled_indices_with<R>(n: usize, rng: &mut R) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    let mut indices: Vec<usize> = (0..n).collect();
    shuffle_in_place(&mut indices, rng);
    indices
}

/// Reproducible permutation of `0..n`: same `seed`, same order.
pub fn shuffled_indices_seeded(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    shuffled_indices_with(n, &mut rng)
}
