//! # Network Model
//!
//! Plain data shared by the sampler, the estimator, the table builder and
//! the bundle format. No randomness, no I/O.

pub mod value;
pub mod structure;
pub mod cpt;
pub mod sample;

pub use value::{Value, MISSING_CODE, MISSING_LABEL};
pub use structure::{NetworkStructure, VariableSpec};
pub use cpt::{ConditionalTable, CptCollection, CptRow, ParentKey};
pub use sample::{Observations, Query, Sample, SampleValue};
