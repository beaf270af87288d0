//! Estimation run configuration.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default sample budget per query.
pub const DEFAULT_SAMPLES: u64 = 30_000;

/// Settings for one estimation run.
///
/// Deserializes from partial input; omitted fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Forward samples to draw (N). Must be positive.
    pub samples: u64,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Worker threads. Values above 1 need the `parallel` feature.
    pub workers: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self { samples: DEFAULT_SAMPLES, seed: None, workers: 1 }
    }
}

impl EstimatorConfig {
    pub fn with_samples(mut self, samples: u64) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(Error::InvalidConfig("samples must be positive".into()));
        }
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be positive".into()));
        }
        Ok(())
    }

    /// The base seed: the configured one, or a fresh random one.
    pub fn base_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Random source for a sequential run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
