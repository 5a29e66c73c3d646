//! Error types for the shared primitives.

use thiserror::Error;

/// Errors raised while decoding or constructing shared primitives.
#[derive(Error, Debug)]
pub enum CommonError {
    /// Hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Encoded value has the wrong length.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Bytes do not encode a valid ed25519 public key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Witness does not have one sibling per tree level.
    #[error("malformed witness: expected {expected} levels, got {actual}")]
    MalformedWitness { expected: usize, actual: usize },
}

/// Result type for shared primitives.
pub type Result<T> = std::result::Result<T, CommonError>;
