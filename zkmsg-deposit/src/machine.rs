//! One-shot deposit state machine.

use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zkmsg_common::{Account, MapKey, MapWitness, MessageValidator, Root};

use crate::{
    config::DepositConfig,
    error::{DepositError, Result},
    message::FlagMessage,
    registry::{DepositStatus, EligibilityRegistry, NullifierRegistry},
};

/// Domain tag prefixed to every signed deposit payload.
pub const DEPOSIT_SIGNING_DOMAIN: &[u8] = b"zkmsg_deposit_v1";

/// Bytes a depositor signs: `domain || message (u64 BE) || identity key`.
pub fn deposit_payload(message: &FlagMessage, key: &MapKey) -> Vec<u8> {
    let mut payload = Vec::with_capacity(DEPOSIT_SIGNING_DOMAIN.len() + 8 + 32);
    payload.extend_from_slice(DEPOSIT_SIGNING_DOMAIN);
    payload.extend_from_slice(&message.word().to_be_bytes());
    payload.extend_from_slice(key.as_bytes());
    payload
}

/// Emitted once per successful deposit, in commit order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub depositor: Account,
    pub message: FlagMessage,
    /// 1-based position of this deposit in the global counter.
    pub sequence: u64,
}

/// Result of a committed deposit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub event: DepositEvent,
    pub nullifier_root: Root,
}

/// Eligibility set, nullifier set and message counter behind one atomic
/// `deposit_message` transition.
#[derive(Clone, Debug)]
pub struct DepositStateMachine {
    config: DepositConfig,
    eligibility: EligibilityRegistry,
    nullifiers: NullifierRegistry,
    total_messages: u64,
    events: Vec<DepositEvent>,
}

impl DepositStateMachine {
    /// Fresh machine with empty registries, administered by `admin`.
    pub fn new(admin: &Account, config: DepositConfig) -> Self {
        let eligibility = EligibilityRegistry::new(admin, config.max_total_addresses);
        Self {
            config,
            eligibility,
            nullifiers: NullifierRegistry::new(),
            total_messages: 0,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &DepositConfig {
        &self.config
    }

    pub fn eligibility_root(&self) -> Root {
        self.eligibility.root()
    }

    pub fn nullifier_root(&self) -> Root {
        self.nullifiers.root()
    }

    pub fn total_messages(&self) -> u64 {
        self.total_messages
    }

    pub fn total_addresses(&self) -> u64 {
        self.eligibility.total_addresses()
    }

    /// Every deposit event emitted so far.
    pub fn events(&self) -> &[DepositEvent] {
        &self.events
    }

    pub fn add_eligible(&mut self, sender: &Account, witness: &MapWitness) -> Result<Root> {
        self.eligibility.add_eligible(sender, witness)
    }

    pub fn check_eligibility(&self, witness: &MapWitness) -> Result<MapKey> {
        self.eligibility.check_eligibility(witness)
    }

    /// Read-only nullifier check for `key`.
    pub fn check_not_consumed(&self, witness: &MapWitness, key: &MapKey) -> Result<()> {
        self.nullifiers.check_not_consumed(witness, key).map(|_| ())
    }

    pub fn deposit_status(&self, witness: &MapWitness, key: &MapKey) -> Result<DepositStatus> {
        self.nullifiers.status(witness, key)
    }

    /// Deposit `message` on behalf of `account`.
    ///
    /// Every check runs before anything is written; on error the machine is
    /// unchanged.
    pub fn deposit_message(
        &mut self,
        account: &Account,
        message: FlagMessage,
        eligibility_witness: &MapWitness,
        nullifier_witness: &MapWitness,
        signature: Option<&Signature>,
    ) -> Result<DepositReceipt> {
        let key = account.key();

        let eligible_key = self.eligibility.check_eligibility(eligibility_witness)?;
        if eligible_key != key {
            return Err(DepositError::KeyMismatch {
                expected: key,
                actual: eligible_key,
            });
        }

        let update = self.nullifiers.check_not_consumed(nullifier_witness, &key)?;

        if !message.is_valid() {
            let reason = message.violation().unwrap_or("invalid flag word");
            warn!(%key, %message, reason, "malformed deposit message");
            return Err(DepositError::Validation(reason.to_string()));
        }

        self.check_signature(account, &message, signature)?;

        let sequence = self
            .total_messages
            .checked_add(1)
            .ok_or(DepositError::Overflow("total_messages"))?;

        let nullifier_root = self.nullifiers.apply(update)?;
        self.total_messages = sequence;
        let event = DepositEvent {
            depositor: *account,
            message,
            sequence,
        };
        self.events.push(event.clone());

        info!(%key, %message, sequence, root = %nullifier_root, "deposit committed");
        Ok(DepositReceipt {
            event,
            nullifier_root,
        })
    }

    fn check_signature(
        &self,
        account: &Account,
        message: &FlagMessage,
        signature: Option<&Signature>,
    ) -> Result<()> {
        match signature {
            Some(signature) => {
                let payload = deposit_payload(message, &account.key());
                if !account.verify(&payload, signature) {
                    return Err(DepositError::Unauthorized(
                        "deposit signature does not verify".into(),
                    ));
                }
                Ok(())
            }
            None if self.config.require_signature => Err(DepositError::Unauthorized(
                "deposit signature required".into(),
            )),
            None => Ok(()),
        }
    }
}
