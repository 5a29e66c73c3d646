//! Error types for the agent mailbox.

use thiserror::Error;

use crate::types::AgentId;

#[derive(Error, Debug)]
pub enum MailboxError {
    #[error("agent {0} not registered")]
    NotRegistered(AgentId),

    #[error("agent {0} already registered")]
    AlreadyRegistered(AgentId),

    #[error("invalid security code for agent {agent_id}")]
    InvalidSecurityCode { agent_id: AgentId },

    /// Message number does not advance past the last accepted one.
    #[error("invalid message number for agent {agent_id}: last {last}, got {got}")]
    Sequence {
        agent_id: AgentId,
        last: u64,
        got: u64,
    },

    #[error("malformed message: {0}")]
    Validation(String),

    #[error("proof verification failed: {0}")]
    ProofVerification(String),

    /// Raw security codes are refused when proofs are required.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

pub type Result<T> = std::result::Result<T, MailboxError>;
