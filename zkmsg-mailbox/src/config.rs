//! Mailbox configuration.

use serde::{Deserialize, Serialize};
use zkmsg_common::Digest;

use crate::types::{BODY_LEN, SECURITY_CODE_LEN};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    /// Characters in an agent security code.
    pub security_code_len: usize,
    /// Characters in a message body.
    pub body_len: usize,
    /// Keep the transaction context of each agent's last accepted message.
    pub record_audit: bool,
    /// Only accept messages authenticated by a security-code proof.
    pub require_proof: bool,
    /// Secret the security-code prover key is derived from. Without it each
    /// mailbox generates its own and only its own prover can authorize.
    pub prover_secret: Option<Digest>,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            security_code_len: SECURITY_CODE_LEN,
            body_len: BODY_LEN,
            record_audit: true,
            require_proof: false,
            prover_secret: None,
        }
    }
}
