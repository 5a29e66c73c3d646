//! Numeric agent reports.

use serde::{Deserialize, Serialize};
use zkmsg_common::MessageValidator;

pub const MAX_AGENT_ID: u32 = 3000;
pub const MAX_X: u32 = 15000;
pub const MIN_Y: u32 = 5000;
pub const MAX_Y: u32 = 20000;

/// One record of a batch: a sequence number plus the agent's details.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentReport {
    pub number: u32,
    pub id: u32,
    pub x: u32,
    pub y: u32,
    pub checksum: u32,
}

impl AgentReport {
    /// Report with the checksum filled in as `id + x + y`.
    ///
    /// Returns `None` if the sum does not fit in a `u32`.
    pub fn with_checksum(number: u32, id: u32, x: u32, y: u32) -> Option<Self> {
        let checksum = id.checked_add(x)?.checked_add(y)?;
        Some(Self {
            number,
            id,
            x,
            y,
            checksum,
        })
    }
}

impl MessageValidator for AgentReport {
    /// Agent id 0 is always valid. Otherwise every range rule must hold and
    /// the checksum must equal `id + x + y`.
    fn is_valid(&self) -> bool {
        if self.id == 0 {
            return true;
        }
        let checksum_ok = self
            .id
            .checked_add(self.x)
            .and_then(|sum| sum.checked_add(self.y))
            .is_some_and(|sum| sum == self.checksum);

        self.id <= MAX_AGENT_ID
            && self.x <= MAX_X
            && (MIN_Y..=MAX_Y).contains(&self.y)
            && self.y > self.x
            && checksum_ok
    }
}
