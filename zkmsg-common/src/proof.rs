//! Opaque proving capability.
//!
//! Programs in this workspace (the aggregation fold, the security-code prover)
//! do not implement a succinct proof system. They rely on a keyed BLAKE3
//! commitment that stands in for "produce / verify a proof that this statement
//! was checked by the program":
//!
//! ```text
//! attestation = BLAKE3_keyed(program_key, program_id || statement)
//! program_key = BLAKE3_derive_key("zkmsg program key v1", secret || program_id)
//! ```
//!
//! Anyone holding the [`ProgramKey`] can both prove and verify, so the key
//! plays the role of the proving/verifying key pair of a real backend. The
//! key depends on a 32-byte secret; knowing the program name alone is not
//! enough to attest. A statement whose public values were altered after
//! proving no longer verifies.

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::digest::Digest;

const PROGRAM_KEY_CONTEXT: &str = "zkmsg program key v1";

/// Public values a program commits to when proving.
pub trait ProvableStatement {
    /// Absorb every public value of the statement, in a fixed order.
    fn absorb(&self, hasher: &mut blake3::Hasher);
}

/// Commitment produced by [`ProgramKey::attest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation(pub Digest);

/// Proving/verifying key of one program.
#[derive(Clone)]
pub struct ProgramKey {
    program_id: String,
    key: [u8; 32],
}

impl ProgramKey {
    /// Key of the program named `program_id` under `secret`.
    pub fn from_secret(program_id: &str, secret: &Digest) -> Self {
        let mut material = Vec::with_capacity(32 + program_id.len());
        material.extend_from_slice(secret.as_bytes());
        material.extend_from_slice(program_id.as_bytes());
        Self {
            program_id: program_id.to_string(),
            key: blake3::derive_key(PROGRAM_KEY_CONTEXT, &material),
        }
    }

    /// Key of the program named `program_id` under a fresh random secret.
    pub fn generate(program_id: &str) -> Self {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        Self::from_secret(program_id, &Digest::from_bytes(secret))
    }

    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    /// Attest to `statement`.
    pub fn attest<S: ProvableStatement + ?Sized>(&self, statement: &S) -> Attestation {
        Attestation(self.commit(statement).into())
    }

    /// Check that `attestation` was produced for `statement` by this program.
    pub fn verify<S: ProvableStatement + ?Sized>(
        &self,
        statement: &S,
        attestation: &Attestation,
    ) -> bool {
        let expected = self.commit(statement);
        // blake3::Hash equality is constant time.
        expected == blake3::Hash::from(attestation.0.to_bytes())
    }

    fn commit<S: ProvableStatement + ?Sized>(&self, statement: &S) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(&(self.program_id.len() as u64).to_le_bytes());
        hasher.update(self.program_id.as_bytes());
        statement.absorb(&mut hasher);
        hasher.finalize()
    }
}

impl std::fmt::Debug for ProgramKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramKey")
            .field("program_id", &self.program_id)
            .finish_non_exhaustive()
    }
}
