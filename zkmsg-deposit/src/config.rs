//! Configuration for the deposit state machine.

use serde::{Deserialize, Serialize};

/// Default cap on the number of eligible addresses.
pub const DEFAULT_MAX_TOTAL_ADDRESSES: u64 = 100;

/// Policy knobs for [`DepositStateMachine`](crate::DepositStateMachine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositConfig {
    /// Reject deposits that carry no signature.
    #[serde(default)]
    pub require_signature: bool,

    /// Maximum number of identities the admin may add.
    #[serde(default = "default_max_total_addresses")]
    pub max_total_addresses: u64,
}

fn default_max_total_addresses() -> u64 {
    DEFAULT_MAX_TOTAL_ADDRESSES
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            require_signature: false,
            max_total_addresses: DEFAULT_MAX_TOTAL_ADDRESSES,
        }
    }
}
