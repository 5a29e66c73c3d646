//! Agents, messages and transaction context.

use serde::{Deserialize, Serialize};
use zkmsg_common::{
    hash::{hash_with_domain, SECURITY_CODE_DOMAIN},
    Account, Digest,
};

/// Agent identifier.
pub type AgentId = u64;

/// Characters in a message body.
pub const BODY_LEN: usize = 12;

/// Characters in a security code.
pub const SECURITY_CODE_LEN: usize = 2;

/// Commitment to a security code. The code itself is never stored.
pub fn hash_security_code(code: &str) -> Digest {
    hash_with_domain(SECURITY_CODE_DOMAIN, &[code.as_bytes()])
}

/// Stored per-agent state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    pub last_msg_number: u64,
    pub security_code_hash: Digest,
}

/// Request to register an agent; carries the code in the clear once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRegistration {
    pub agent_id: AgentId,
    #[serde(default)]
    pub last_msg_number: u64,
    pub security_code: String,
}

impl AgentRegistration {
    pub fn new(agent_id: AgentId, security_code: impl Into<String>) -> Self {
        Self {
            agent_id,
            last_msg_number: 0,
            security_code: security_code.into(),
        }
    }

    /// Agent record stored for this registration.
    pub fn to_agent(&self) -> Agent {
        Agent {
            agent_id: self.agent_id,
            last_msg_number: self.last_msg_number,
            security_code_hash: hash_security_code(&self.security_code),
        }
    }
}

/// Message sent by an agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub msg_number: u64,
    pub agent_id: AgentId,
    pub body: String,
    pub security_code: String,
}

impl AgentMessage {
    pub fn new(
        msg_number: u64,
        agent_id: AgentId,
        body: impl Into<String>,
        security_code: impl Into<String>,
    ) -> Self {
        Self {
            msg_number,
            agent_id,
            body: body.into(),
            security_code: security_code.into(),
        }
    }

    /// First shape rule the message breaks for the given lengths, if any.
    pub fn shape_violation(&self, body_len: usize, code_len: usize) -> Option<String> {
        let body = self.body.chars().count();
        if body != body_len {
            return Some(format!("body must be {body_len} characters, got {body}"));
        }
        let code = self.security_code.chars().count();
        if code != code_len {
            return Some(format!(
                "security code must be {code_len} characters, got {code}"
            ));
        }
        None
    }
}

/// Transaction context of an accepted message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTx {
    pub block_height: u64,
    pub sender: Account,
    pub nonce: u64,
}
