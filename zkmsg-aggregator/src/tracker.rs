//! Running maximum across independently proven batches.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::Result,
    prover::{AggregateProof, MessageProver},
};

/// Snapshot of a [`MaxTracker`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerState {
    pub max: u32,
    pub batches: u64,
}

/// Keeps the largest output of every verified batch proof.
///
/// Order of submission does not matter and resubmitting a proof is a no-op.
/// The tracker only trusts proofs sealed under its verifier's key.
#[derive(Clone, Debug)]
pub struct MaxTracker {
    verifier: MessageProver,
    state: TrackerState,
}

impl MaxTracker {
    pub fn new(verifier: MessageProver) -> Self {
        Self {
            verifier,
            state: TrackerState::default(),
        }
    }

    pub fn max(&self) -> u32 {
        self.state.max
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Verify `proof` and raise the stored maximum to its output.
    pub fn step(&mut self, proof: &AggregateProof) -> Result<u32> {
        self.verifier.verify(proof)?;
        let max = self.state.max.max(proof.public_output);
        self.state = TrackerState {
            max,
            batches: self.state.batches.saturating_add(1),
        };
        info!(batch_output = proof.public_output, max, "batch proof accepted");
        Ok(max)
    }
}
