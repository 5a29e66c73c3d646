//! Proof that a message carries an agent's security code, without the code.
//!
//! Public input is the code hash the mailbox already stores; public output is
//! the `(agent_id, msg_number)` pair the proof authorizes. The program also
//! checks the message shape, so the mailbox can skip that step.
//!
//! Attestations are keyed by a secret, so the public code hash alone is not
//! enough to authorize a message.

use serde::{Deserialize, Serialize};
use tracing::debug;
use zkmsg_common::{Attestation, Digest, ProgramKey, ProvableStatement};

use crate::{
    config::MailboxConfig,
    error::{MailboxError, Result},
    types::{hash_security_code, AgentId, AgentMessage, BODY_LEN, SECURITY_CODE_LEN},
};

/// Program name of the security-code prover.
pub const SECURITY_CODE_PROGRAM_ID: &str = "zkmsg-security-code";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCodeProof {
    pub security_code_hash: Digest,
    pub agent_id: AgentId,
    pub msg_number: u64,
    pub attestation: Attestation,
}

impl ProvableStatement for SecurityCodeProof {
    fn absorb(&self, hasher: &mut blake3::Hasher) {
        hasher.update(self.security_code_hash.as_bytes());
        hasher.update(&self.agent_id.to_le_bytes());
        hasher.update(&self.msg_number.to_le_bytes());
    }
}

#[derive(Clone, Debug)]
pub struct SecurityCodeProver {
    key: ProgramKey,
    body_len: usize,
    security_code_len: usize,
}

impl Default for SecurityCodeProver {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityCodeProver {
    /// Prover with default message shape and a freshly generated key.
    pub fn new() -> Self {
        Self {
            key: ProgramKey::generate(SECURITY_CODE_PROGRAM_ID),
            body_len: BODY_LEN,
            security_code_len: SECURITY_CODE_LEN,
        }
    }

    /// Prover enforcing the message shape of `config`, keyed by its
    /// `prover_secret` when set.
    pub fn for_config(config: &MailboxConfig) -> Self {
        let key = match &config.prover_secret {
            Some(secret) => ProgramKey::from_secret(SECURITY_CODE_PROGRAM_ID, secret),
            None => ProgramKey::generate(SECURITY_CODE_PROGRAM_ID),
        };
        Self {
            key,
            body_len: config.body_len,
            security_code_len: config.security_code_len,
        }
    }

    /// Prove that `message` is well formed and carries its security code.
    pub fn prove(&self, message: &AgentMessage) -> Result<SecurityCodeProof> {
        if let Some(reason) = message.shape_violation(self.body_len, self.security_code_len) {
            return Err(MailboxError::Validation(reason));
        }
        let mut proof = SecurityCodeProof {
            security_code_hash: hash_security_code(&message.security_code),
            agent_id: message.agent_id,
            msg_number: message.msg_number,
            attestation: Attestation(Digest::ZERO),
        };
        proof.attestation = self.key.attest(&proof);
        debug!(agent_id = proof.agent_id, msg_number = proof.msg_number, "security code proven");
        Ok(proof)
    }

    pub fn verify(&self, proof: &SecurityCodeProof) -> Result<()> {
        if self.key.verify(proof, &proof.attestation) {
            Ok(())
        } else {
            Err(MailboxError::ProofVerification(format!(
                "security code proof for agent {} message {} does not verify",
                proof.agent_id, proof.msg_number
            )))
        }
    }
}
