//! Rejection sampling for `P(target = value | observations)`.
//!
//! Draw unconditional samples, discard the ones that disagree with the
//! evidence, and report the share of survivors that hit the target event.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::SampleGenerator;
use crate::model::*;
use crate::{Error, Result};

// ============================================================================
// Estimate
// ============================================================================

/// Result of one estimation run.
///
/// `probability` is `matched / accepted`, or `0.0` when nothing was
/// accepted. The raw counts are kept so callers can tell an estimated zero
/// from a run that never saw the evidence; see [`Estimate::conditional`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Estimate {
    pub probability: f64,
    /// Samples drawn.
    pub samples: u64,
    /// Samples consistent with the observations.
    pub accepted: u64,
    /// Accepted samples where the target event held.
    pub matched: u64,
}

impl Estimate {
    pub fn from_counts(samples: u64, accepted: u64, matched: u64) -> Self {
        let probability = if accepted == 0 {
            0.0
        } else {
            matched as f64 / accepted as f64
        };
        Self { probability, samples, accepted, matched }
    }

    /// The estimate, or `None` if no sample matched the observations.
    pub fn conditional(&self) -> Option<f64> {
        (self.accepted > 0).then_some(self.probability)
    }

    /// No sample survived rejection.
    pub fn is_degenerate(&self) -> bool { self.accepted == 0 }

    pub fn acceptance_rate(&self) -> f64 {
        if self.samples == 0 { 0.0 } else { self.accepted as f64 / self.samples as f64 }
    }

    /// Combine partial runs (e.g. per-worker or time-boxed batches).
    pub fn merge(self, other: Estimate) -> Estimate {
        Estimate::from_counts(
            self.samples + other.samples,
            self.accepted + other.accepted,
            self.matched + other.matched,
        )
    }
}

// ============================================================================
// RejectionEstimator
// ============================================================================

/// Evidence and target resolved to sampler slots.
#[derive(Debug, Clone)]
pub(crate) struct CompiledQuery<'q> {
    evidence: Vec<(usize, &'q Value)>,
    target: usize,
    value: &'q Value,
}

impl CompiledQuery<'_> {
    fn accepts(&self, values: &[SampleValue]) -> bool {
        self.evidence
            .iter()
            .all(|&(slot, required)| values[slot].as_ref() == Some(required))
    }

    fn hits(&self, values: &[SampleValue]) -> bool {
        values[self.target].as_ref() == Some(self.value)
    }
}

/// Drives a [`SampleGenerator`] and counts accepted / matching samples.
#[derive(Debug, Clone, Copy)]
pub struct RejectionEstimator<'g> {
    generator: &'g SampleGenerator,
}

impl<'g> RejectionEstimator<'g> {
    pub fn new(generator: &'g SampleGenerator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &'g SampleGenerator { self.generator }

    /// Estimate `P(query | observations)` from `samples` forward draws.
    ///
    /// Fails before sampling if the budget is zero or a variable is unknown;
    /// nothing during the loop can fail.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        observations: &Observations,
        query: &Query,
        samples: u64,
        rng: &mut R,
    ) -> Result<Estimate> {
        if samples == 0 {
            return Err(Error::InvalidConfig("sample budget must be positive".into()));
        }
        let compiled = self.compile(observations, query)?;
        let estimate = self.run(&compiled, samples, rng);
        log_outcome(query, &estimate);
        Ok(estimate)
    }

    pub(crate) fn compile<'q>(
        &self,
        observations: &'q Observations,
        query: &'q Query,
    ) -> Result<CompiledQuery<'q>> {
        let evidence = observations
            .iter()
            .map(|(variable, value)| {
                self.generator
                    .slot(variable)
                    .map(|slot| (slot, value))
                    .ok_or_else(|| Error::UnknownVariable(variable.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        let target = self
            .generator
            .slot(&query.target)
            .ok_or_else(|| Error::UnknownVariable(query.target.clone()))?;
        Ok(CompiledQuery { evidence, target, value: &query.value })
    }

    /// The sampling loop proper.
    pub(crate) fn run<R: Rng + ?Sized>(
        &self,
        query: &CompiledQuery<'_>,
        samples: u64,
        rng: &mut R,
    ) -> Estimate {
        let mut accepted = 0u64;
        let mut matched = 0u64;
        let mut values = Vec::with_capacity(self.generator.variables().len());

        for _ in 0..samples {
            self.generator.draw_into(rng, &mut values);
            if query.accepts(&values) {
                accepted += 1;
                if query.hits(&values) {
                    matched += 1;
                }
            }
        }

        Estimate::from_counts(samples, accepted, matched)
    }
}

pub(crate) fn log_outcome(query: &Query, estimate: &Estimate) {
    if estimate.is_degenerate() {
        warn!(
            target_variable = %query.target,
            samples = estimate.samples,
            "no sample was consistent with the observations; reporting 0.0"
        );
    } else {
        info!(
            target_variable = %query.target,
            target_value = %query.value,
            samples = estimate.samples,
            accepted = estimate.accepted,
            matched = estimate.matched,
            probability = estimate.probability,
            "rejection sampling finished"
        );
    }
}

/// One-shot estimate over `cpts` and `structure`.
pub fn estimate<R: Rng + ?Sized>(
    cpts: &CptCollection,
    structure: &NetworkStructure,
    observations: &Observations,
    query: &Query,
    samples: u64,
    rng: &mut R,
) -> Result<Estimate> {
    let generator = SampleGenerator::new(structure, cpts)?;
    RejectionEstimator::new(&generator).estimate(observations, query, samples, rng)
}
