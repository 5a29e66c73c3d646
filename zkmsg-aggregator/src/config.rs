//! Configuration for the message prover and max tracker.

use serde::{Deserialize, Serialize};
use zkmsg_common::Digest;

/// Default program name the attestation key is derived from.
pub const DEFAULT_PROGRAM_ID: &str = "zkmsg-message-prove";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Program name; prover and tracker must agree on it.
    pub program_id: String,

    /// Public input of every proof in a batch.
    pub seed: u32,

    /// Attestation secret shared by prover and tracker. A fresh one is
    /// generated per prover when absent, so proofs only verify in-process.
    pub secret: Option<Digest>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID.to_string(),
            seed: 0,
            secret: None,
        }
    }
}
