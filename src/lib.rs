//! # bayesnet-rs: Sampling Inference over Empirical Bayesian Networks
//!
//! Estimates `P(target = value | observations)` on a discrete Bayesian
//! network whose conditional probability tables were counted from data.
//!
//! ## Design Principles
//!
//! 1. **Validate once, sample forever**: configuration mistakes surface when
//!    a `SampleGenerator` is built; the sampling loop itself cannot fail
//! 2. **Sparse data is not an error**: zero mass, unseen parent combinations
//!    and undefined parents all have a defined fallback
//! 3. **Explicit randomness**: every run takes a caller-owned `rand::Rng`
//! 4. **Counts, not just ratios**: an `Estimate` keeps accepted / matched
//!    counts so "no evidence seen" is distinguishable from "estimated zero"
//!
//! ## Quick Start
//!
//! ```rust
//! use bayesnet::{BayesNet, ConditionalTable, CptCollection, EstimatorConfig,
//!     NetworkStructure, Observations, Query};
//!
//! # fn example() -> bayesnet::Result<()> {
//! let structure = NetworkStructure::from_pairs([("A", vec![]), ("B", vec!["A"])])?;
//! let cpts = CptCollection::new()
//!     .with_table("A", ConditionalTable::root([(0, 0.3), (1, 0.7)]))
//!     .with_table("B", ConditionalTable::conditional([
//!         (vec![0], "x", 0.9), (vec![0], "y", 0.1),
//!         (vec![1], "x", 0.2), (vec![1], "y", 0.8),
//!     ]));
//!
//! let net = BayesNet::new(structure, cpts)?;
//! let config = EstimatorConfig::default().with_samples(10_000).with_seed(7);
//! let estimate = net.query(&Observations::new().with("A", 1), &Query::new("B", "x"), &config)?;
//! assert!(estimate.conditional().is_some());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `parallel` | Split the sample budget across rayon workers |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod sampling;
pub mod builder;
pub mod export;
pub mod config;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Value, NetworkStructure, VariableSpec,
    ConditionalTable, CptCollection, CptRow, ParentKey,
    Sample, SampleValue, Observations, Query,
};

// ============================================================================
// Re-exports: Sampling
// ============================================================================

pub use sampling::{draw_sample, estimate, Estimate, RejectionEstimator, SampleGenerator};

// ============================================================================
// Re-exports: Builder, Export, Config
// ============================================================================

pub use builder::{build_cpts, Dataset};
pub use export::{read_bundle, write_bundle, NetworkBundle};
pub use config::EstimatorConfig;

use rand::Rng;

// ============================================================================
// Top-level BayesNet handle
// ============================================================================

/// The primary entry point. A `BayesNet` owns a validated network and an
/// indexed sampler, and answers conditional queries.
#[derive(Debug, Clone)]
pub struct BayesNet {
    structure: NetworkStructure,
    cpts: CptCollection,
    generator: SampleGenerator,
}

impl BayesNet {
    /// Validate the network and index its tables.
    pub fn new(structure: NetworkStructure, cpts: CptCollection) -> Result<Self> {
        let generator = SampleGenerator::new(&structure, &cpts)?;
        Ok(Self { structure, cpts, generator })
    }

    /// Load from a persisted bundle.
    pub fn from_bundle(bundle: NetworkBundle) -> Result<Self> {
        let (structure, cpts) = bundle.into_parts();
        Self::new(structure, cpts)
    }

    /// Count CPTs from `dataset` for `structure` and build the network.
    pub fn from_dataset(dataset: &Dataset, structure: NetworkStructure) -> Result<Self> {
        let cpts = build_cpts(dataset, &structure)?;
        Self::new(structure, cpts)
    }

    /// Package the network for persistence.
    pub fn to_bundle(&self) -> Result<NetworkBundle> {
        NetworkBundle::new(self.structure.clone(), self.cpts.clone())
    }

    pub fn structure(&self) -> &NetworkStructure { &self.structure }
    pub fn cpts(&self) -> &CptCollection { &self.cpts }
    pub fn generator(&self) -> &SampleGenerator { &self.generator }

    /// Draw one complete assignment.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Sample {
        self.generator.draw(rng)
    }

    /// Estimate `P(query | observations)` with an explicit random source.
    pub fn estimate<R: Rng + ?Sized>(
        &self,
        observations: &Observations,
        query: &Query,
        samples: u64,
        rng: &mut R,
    ) -> Result<Estimate> {
        RejectionEstimator::new(&self.generator).estimate(observations, query, samples, rng)
    }

    /// Estimate `P(query | observations)` as configured.
    pub fn query(
        &self,
        observations: &Observations,
        query: &Query,
        config: &EstimatorConfig,
    ) -> Result<Estimate> {
        config.validate()?;
        let estimator = RejectionEstimator::new(&self.generator);
        if config.workers > 1 {
            return self.query_parallel(&estimator, observations, query, config);
        }
        estimator.estimate(observations, query, config.samples, &mut config.rng())
    }

    #[cfg(feature = "parallel")]
    fn query_parallel(
        &self,
        estimator: &RejectionEstimator<'_>,
        observations: &Observations,
        query: &Query,
        config: &EstimatorConfig,
    ) -> Result<Estimate> {
        estimator.estimate_parallel(
            observations,
            query,
            config.samples,
            config.workers,
            config.base_seed(),
        )
    }

    #[cfg(not(feature = "parallel"))]
    fn query_parallel(
        &self,
        estimator: &RejectionEstimator<'_>,
        observations: &Observations,
        query: &Query,
        config: &EstimatorConfig,
    ) -> Result<Estimate> {
        tracing::warn!(workers = config.workers, "built without `parallel`; sampling sequentially");
        estimator.estimate(observations, query, config.samples, &mut config.rng())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Variable '{variable}' references parent '{parent}' before it is defined")]
    NotTopological { variable: String, parent: String },

    #[error("No conditional table for variable '{0}'")]
    MissingTable(String),

    #[error("Invalid table for '{variable}': {message}")]
    InvalidTable { variable: String, message: String },

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported bundle format version {0}")]
    UnsupportedFormat(u32),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
