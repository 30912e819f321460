//! Synthetic CPU model and the noise sources that drive it

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AutoscalerConfig;
use crate::types::{ReplicaCount, Utilization};

/// Source of uniform samples in `[0, 1)` for the simulated load.
///
/// Implement this to make simulation outcomes deterministic.
#[cfg_attr(test, mockall::automock)]
pub trait NoiseSource: Send + Sync {
    /// Next sample, uniform in `[0, 1)`
    fn next_unit(&mut self) -> f64;
}

/// Entropy-seeded generator used by the running service
#[derive(Debug)]
pub struct RandomNoise {
    rng: StdRng,
}

impl RandomNoise {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseSource for RandomNoise {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Always returns the same sample
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(pub f64);

impl NoiseSource for FixedNoise {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

/// Simulated utilization: background load plus a share that shrinks as replicas are added.
///
/// `cpu = base_load_min + noise * base_load_spread + target / replicas`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuModel {
    pub target_utilization: Utilization,
    pub base_load_min: Utilization,
    pub base_load_spread: Utilization,
}

impl CpuModel {
    pub fn from_config(config: &AutoscalerConfig) -> Self {
        Self {
            target_utilization: config.target_utilization,
            base_load_min: config.base_load_min,
            base_load_spread: config.base_load_spread,
        }
    }

    /// Utilization for `replicas` given a noise sample in `[0, 1)`
    pub fn utilization(&self, replicas: ReplicaCount, noise: f64) -> Utilization {
        let base_load = self.base_load_min + noise * self.base_load_spread;
        // replicas >= 1 is guaranteed by the store bounds
        base_load + self.target_utilization / f64::from(replicas.max(1))
    }

    /// Draw fresh noise and simulate one reading
    pub fn sample(&self, replicas: ReplicaCount, noise: &mut dyn NoiseSource) -> Utilization {
        self.utilization(replicas, noise.next_unit())
    }
}
