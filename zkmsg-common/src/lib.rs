//! zkmsg-common
//!
//! Shared primitives for the zkmsg state-transition protocol.
//!
//! # Contents
//!
//! - [`Digest`]: 32-byte commitment value used for roots, keys and map values
//! - [`AuthenticatedMap`] / [`MapWitness`]: sparse Merkle map keyed by 256-bit
//!   keys, with witnesses that re-derive both the root and the key
//! - [`Account`]: ed25519 identity whose map key is `H(public_key)`
//! - [`ProgramKey`] / [`Attestation`]: the opaque "prove / verify" capability
//!   that recursive programs use to bind their public values
//! - [`MessageValidator`]: validity predicate for fixed-shape message kinds
//!
//! # Hashing
//!
//! Every hash in the workspace is BLAKE3 with a fixed domain tag:
//!
//! ```text
//! node     = H("zkmsg_map_node_v1"  || left || right)
//! identity = H("zkmsg_identity_v1"  || public_key)
//! code     = H("zkmsg_security_code_v1" || code_bytes)
//! ```

pub mod digest;
pub mod error;
pub mod hash;
pub mod identity;
pub mod map;
pub mod proof;
pub mod validate;

pub use digest::Digest;
pub use error::{CommonError, Result};
pub use hash::{hash_bytes_hex, hash_pair, hash_with_domain};
pub use identity::{identity_key, Account};
pub use map::{empty_root, AuthenticatedMap, MapWitness, MAP_DEPTH};
pub use proof::{Attestation, ProgramKey, ProvableStatement};
pub use validate::MessageValidator;

/// Committed root of an [`AuthenticatedMap`].
pub type Root = Digest;

/// Key of an [`AuthenticatedMap`] entry.
pub type MapKey = Digest;

/// Value stored at a key of an [`AuthenticatedMap`].
pub type MapValue = Digest;

/// Value of an absent entry.
pub const EMPTY_VALUE: MapValue = Digest::ZERO;

/// Sentinel value marking a key as present ("eligible", "consumed").
pub const MARKER_VALUE: MapValue = Digest::from_u64(1);
