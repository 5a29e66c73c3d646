//! zkmsg-deposit
//!
//! Eligibility and nullifier registries, each committed as a single root, and
//! the deposit state machine that combines them.
//!
//! # Deposit transition
//!
//! ```text
//! deposit_message(account, message, w_elig, w_null, sig?):
//!   1. w_elig.root(MARKER) == eligibility_root, w_elig.key == H(account)
//!   2. w_null.key == H(account), w_null.root(MARKER) != nullifier_root
//!   3. message passes the flag rules
//!   4. sig (if any) verifies over domain || message || H(account)
//!   -> nullifier_root = w_null.root(MARKER), total_messages += 1, event
//! ```
//!
//! Either all steps pass and all writes happen, or none do.

pub mod config;
pub mod error;
pub mod machine;
pub mod message;
pub mod registry;

pub use config::DepositConfig;
pub use error::{DepositError, Result};
pub use machine::{deposit_payload, DepositEvent, DepositReceipt, DepositStateMachine};
pub use message::FlagMessage;
pub use registry::{
    would_change_root, DepositStatus, EligibilityRegistry, NullifierRegistry, NullifierUpdate,
};
