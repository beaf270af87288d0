//! Parallel rejection sampling.
//!
//! Draws are independent, so the budget is split across rayon workers,
//! each with its own `StdRng`, and the partial counts are merged. Results
//! depend only on `(seed, workers, samples)`, never on thread scheduling.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

use super::rejection::{log_outcome, Estimate, RejectionEstimator};
use crate::model::{Observations, Query};
use crate::{Error, Result};

/// Derive an independent seed per worker (SplitMix64 finalizer).
pub fn worker_seed(base: u64, worker: usize) -> u64 {
    let mut z = base.wrapping_add((worker as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Split `samples` into `workers` near-equal shares, dropping empty ones.
fn shares(samples: u64, workers: usize) -> Vec<u64> {
    let workers = workers as u64;
    let base = samples / workers;
    let extra = samples % workers;
    (0..workers)
        .map(|i| base + u64::from(i < extra))
        .filter(|&n| n > 0)
        .collect()
}

impl RejectionEstimator<'_> {
    /// Like [`RejectionEstimator::estimate`], spread over `workers` threads.
    pub fn estimate_parallel(
        &self,
        observations: &Observations,
        query: &Query,
        samples: u64,
        workers: usize,
        seed: u64,
    ) -> Result<Estimate> {
        if samples == 0 {
            return Err(Error::InvalidConfig("sample budget must be positive".into()));
        }
        if workers == 0 {
            return Err(Error::InvalidConfig("worker count must be positive".into()));
        }
        let compiled = self.compile(observations, query)?;
        let shares = shares(samples, workers);
        debug!(workers = shares.len(), samples, "parallel rejection sampling");

        let estimate = shares
            .into_par_iter()
            .enumerate()
            .map(|(worker, budget)| {
                let mut rng = StdRng::seed_from_u64(worker_seed(seed, worker));
                self.run(&compiled, budget, &mut rng)
            })
            .reduce(Estimate::default, Estimate::merge);

        log_outcome(query, &estimate);
        Ok(estimate)
    }
}
