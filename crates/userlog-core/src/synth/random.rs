use crate::RandSource;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// A [`RandSource`] owning its own `StdRng`.
///
/// Each pipeline worker holds one of these, so no generator is ever shared
/// across tasks. Seeding with the same value yields the same sequence.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Creates a generator with a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates the generator for `worker_id`.
    ///
    /// With a base seed every worker gets a distinct but reproducible stream;
    /// without one each worker is seeded from the operating system.
    pub fn for_worker(base_seed: Option<u64>, worker_id: usize) -> Self {
        match base_seed {
            Some(seed) => Self::from_seed(seed.wrapping_add(worker_id as u64)),
            None => Self::from_entropy(),
        }
    }
}

impl RandSource for SeededRandom {
    fn below(&mut self, bound: usize) -> usize {
        self.rng.random_range(0..bound)
    }
}

/// A [`RandSource`] that uses the thread-local RNG (`rand::rng()`).
///
/// This type does not store the RNG; it reaches for the current thread's
/// generator on each call, so it is safe to move between tasks.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn below(&mut self, bound: usize) -> usize {
        rand::rng().random_range(0..bound)
    }
}
