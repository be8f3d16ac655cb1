use crate::engine::ValueType;
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

pub const DEFAULT_SEED: u64 = 42;

/// Source of initialization samples, one per call. Implementations are
/// seeded explicitly so runs are reproducible; tests substitute constant
/// sources.
pub trait Sampler {
    fn get(&mut self) -> ValueType;
}

/// Uniform samples on [-1, 1].
pub struct UniformSampler {
    rng: StdRng,
    dist: Uniform<ValueType>,
}

impl UniformSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            dist: Uniform::new_inclusive(-1.0, 1.0),
        }
    }
}

impl Default for UniformSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Sampler for UniformSampler {
    fn get(&mut self) -> ValueType {
        self.rng.sample(self.dist)
    }
}

/// Standard normal samples (mean 0, deviation 1).
pub struct NormalSampler {
    rng: StdRng,
}

impl NormalSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for NormalSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Sampler for NormalSampler {
    fn get(&mut self) -> ValueType {
        self.rng.sample(StandardNormal)
    }
}
