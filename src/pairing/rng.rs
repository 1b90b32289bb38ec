//! Random sources used by the pairing engine.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Randomness needed by pairing: a uniform shuffle and a uniform pick.
pub trait RandomSource {
    /// Put `slice` into a uniformly random order.
    fn shuffle<T>(&mut self, slice: &mut [T]);

    /// Pick an index in `0..len`. `len` is never zero.
    fn choose_index(&mut self, len: usize) -> usize;
}

/// Thread-local OS-seeded randomness for real draws.
#[derive(Clone, Debug, Default)]
pub struct SystemRng;

impl RandomSource for SystemRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut rand::thread_rng());
    }

    fn choose_index(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Deterministic RNG for tests and reproducible draws.
/// The same seed always yields the same pairings.
#[derive(Clone, Debug)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    fn choose_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }
}

impl<R: RandomSource> RandomSource for &mut R {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        (**self).shuffle(slice)
    }

    fn choose_index(&mut self, len: usize) -> usize {
        (**self).choose_index(len)
    }
}
