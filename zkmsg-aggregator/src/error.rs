//! Error types for the aggregation fold.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    /// A proof's attestation does not match its public values.
    #[error("proof verification failed: {0}")]
    ProofVerification(String),

    /// Previous proof was produced for a different seed.
    #[error("seed mismatch: expected {expected}, got {actual}")]
    SeedMismatch { expected: u32, actual: u32 },

    /// Step counter overflow.
    #[error("step counter overflow")]
    Overflow,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
