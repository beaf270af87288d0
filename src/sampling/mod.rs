//! # Sampling Engine
//!
//! ```text
//! RejectionEstimator ──loop N──▶ SampleGenerator::draw_into
//!        │                              │
//!        └── evidence check ◀── slot buffer
//!                 │
//!        accepted / matched counters ──▶ Estimate
//! ```
//!
//! Randomness is always supplied by the caller. Seed an `StdRng` for
//! reproducible runs; with the `parallel` feature every worker derives its
//! own generator from one base seed.

pub mod forward;
pub mod rejection;
#[cfg(feature = "parallel")]
pub mod parallel;

pub use forward::{draw_sample, SampleGenerator};
pub use rejection::{estimate, Estimate, RejectionEstimator};
