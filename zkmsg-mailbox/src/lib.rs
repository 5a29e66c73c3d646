//! zkmsg-mailbox
//!
//! Replay-protected message intake for registered agents.
//!
//! ```text
//! receive(msg):
//!   agent = agents[msg.agent_id]                  else NotRegistered
//!   H(msg.code) == agent.code_hash   (or proof)   else InvalidSecurityCode
//!   msg.number > agent.last_msg_number            else Sequence
//!   |body| == 12, |code| == 2                     else Validation
//!   agent.last_msg_number = msg.number
//! ```

pub mod config;
pub mod error;
pub mod mailbox;
pub mod proof;
pub mod types;

pub use config::MailboxConfig;
pub use error::{MailboxError, Result};
pub use mailbox::Mailbox;
pub use proof::{SecurityCodeProof, SecurityCodeProver, SECURITY_CODE_PROGRAM_ID};
pub use types::{
    hash_security_code, Agent, AgentId, AgentMessage, AgentRegistration, AgentTx, BODY_LEN,
    SECURITY_CODE_LEN,
};
