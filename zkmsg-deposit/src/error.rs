//! Error types for the deposit state machine.

use thiserror::Error;
use zkmsg_common::{CommonError, Digest};

/// Reasons a registry or deposit operation is rejected.
///
/// Every variant aborts the whole operation; no state is written.
#[derive(Error, Debug)]
pub enum DepositError {
    /// Caller is not the registered admin, or a required signature is missing
    /// or invalid.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Eligibility witness does not derive the committed eligibility root.
    #[error("not eligible: {0}")]
    NotEligible(String),

    /// Identity already holds the eligibility marker.
    #[error("already eligible: {key}")]
    AlreadyEligible { key: Digest },

    /// Nullifier witness derives the current root: the action was already taken.
    #[error("already deposited: {key}")]
    AlreadyConsumed { key: Digest },

    /// Witness path encodes a different key than the acting identity.
    #[error("witness key mismatch: expected {expected}, got {actual}")]
    KeyMismatch { expected: Digest, actual: Digest },

    /// Witness was built against an outdated copy of the map.
    #[error("stale witness: {0}")]
    StaleWitness(String),

    /// Message fails the flag rules.
    #[error("malformed message: {0}")]
    Validation(String),

    /// Eligibility registry is full.
    #[error("eligibility registry full: {max} addresses")]
    CapacityExceeded { max: u64 },

    /// Counter overflow.
    #[error("counter overflow: {0}")]
    Overflow(&'static str),

    /// Witness is structurally invalid.
    #[error(transparent)]
    Witness(#[from] CommonError),
}

/// Result type for deposit operations.
pub type Result<T> = std::result::Result<T, DepositError>;
