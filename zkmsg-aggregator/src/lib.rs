//! zkmsg-aggregator
//!
//! Folds a batch of [`AgentReport`]s into one [`AggregateProof`] whose public
//! output is the largest report number among the valid reports, and tracks
//! the maximum across batches with [`MaxTracker`].
//!
//! The proof system itself is the opaque keyed attestation from
//! `zkmsg_common::proof`; every proof in a chain commits to the attestation
//! of the proof it extends.

pub mod config;
pub mod error;
pub mod prover;
pub mod report;
pub mod tracker;

pub use config::AggregatorConfig;
pub use error::{AggregatorError, Result};
pub use prover::{AggregateProof, MessageProver, StepOutcome};
pub use report::AgentReport;
pub use tracker::{MaxTracker, TrackerState};
