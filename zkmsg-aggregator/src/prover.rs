//! Proof-carrying fold over agent reports.
//!
//! Each step takes the previous proof and one report. A valid report forces
//! verification of the previous proof and raises the running maximum to the
//! report number; an invalid report carries the previous output forward
//! untouched.
//!
//! ```text
//! start(seed)                     -> { in: seed, out: seed, steps: 0 }
//! step(seed, prev, valid r)       -> { in: seed, out: max(prev.out, r.number) }
//! step(seed, prev, invalid r)     -> { in: seed, out: prev.out if prev is
//!                                     attested for seed, else seed }
//! ```
//!
//! An invalid step never fails on a bad `prev`, but it also never re-seals a
//! `prev` output that does not carry a matching attestation.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zkmsg_common::{Attestation, MessageValidator, ProgramKey, ProvableStatement};

use crate::{
    config::AggregatorConfig,
    error::{AggregatorError, Result},
    report::AgentReport,
};

/// Public values of one link in the fold, plus its attestation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateProof {
    /// Seed the batch was started from.
    pub public_input: u32,
    /// Running maximum.
    pub public_output: u32,
    /// Number of steps folded since `start`.
    pub steps: u64,
    /// Attestation of the proof this one extends.
    pub previous: Option<Attestation>,
    pub attestation: Attestation,
}

impl AggregateProof {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl ProvableStatement for AggregateProof {
    fn absorb(&self, hasher: &mut blake3::Hasher) {
        hasher.update(&self.public_input.to_le_bytes());
        hasher.update(&self.public_output.to_le_bytes());
        hasher.update(&self.steps.to_le_bytes());
        match &self.previous {
            Some(previous) => {
                hasher.update(&[1]);
                hasher.update(previous.0.as_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
    }
}

/// What a step does with the running maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Report is valid: verify the previous proof, fold in `number`.
    Extend { number: u32 },
    /// Report is invalid: keep the previous output without failing the step.
    CarryForward,
}

impl StepOutcome {
    pub fn for_report(report: &AgentReport) -> Self {
        if report.is_valid() {
            StepOutcome::Extend {
                number: report.number,
            }
        } else {
            StepOutcome::CarryForward
        }
    }
}

/// Produces and verifies [`AggregateProof`]s.
#[derive(Clone, Debug)]
pub struct MessageProver {
    config: AggregatorConfig,
    key: ProgramKey,
}

impl Default for MessageProver {
    fn default() -> Self {
        Self::new(AggregatorConfig::default())
    }
}

impl MessageProver {
    pub fn new(config: AggregatorConfig) -> Self {
        let key = match &config.secret {
            Some(secret) => ProgramKey::from_secret(&config.program_id, secret),
            None => ProgramKey::generate(&config.program_id),
        };
        Self { config, key }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Base case: output equals `seed`.
    pub fn start(&self, seed: u32) -> AggregateProof {
        self.seal(seed, seed, 0, None)
    }

    /// Fold one report on top of `prev`.
    pub fn step(
        &self,
        seed: u32,
        prev: &AggregateProof,
        report: &AgentReport,
    ) -> Result<AggregateProof> {
        let steps = prev.steps.checked_add(1).ok_or(AggregatorError::Overflow)?;

        let output = match StepOutcome::for_report(report) {
            StepOutcome::Extend { number } => {
                self.verify(prev)?;
                if prev.public_input != seed {
                    return Err(AggregatorError::SeedMismatch {
                        expected: seed,
                        actual: prev.public_input,
                    });
                }
                prev.public_output.max(number)
            }
            StepOutcome::CarryForward => {
                debug!(number = report.number, id = report.id, "invalid report carried forward");
                if prev.public_input == seed && self.key.verify(prev, &prev.attestation) {
                    prev.public_output
                } else {
                    warn!(
                        claimed = prev.public_output,
                        seed, "unattested previous output dropped"
                    );
                    seed
                }
            }
        };

        Ok(self.seal(seed, output, steps, Some(prev.attestation)))
    }

    /// Fold `reports` in order, starting from `prev` or from `start(seed)`.
    pub fn batch_messages(
        &self,
        reports: &[AgentReport],
        prev: Option<AggregateProof>,
    ) -> Result<AggregateProof> {
        let seed = self.config.seed;
        let initial = match prev {
            Some(proof) => proof,
            None => self.start(seed),
        };
        let proof = reports
            .iter()
            .try_fold(initial, |proof, report| self.step(seed, &proof, report))?;

        info!(
            reports = reports.len(),
            output = proof.public_output,
            steps = proof.steps,
            "batch folded"
        );
        Ok(proof)
    }

    /// Check the attestation of `proof` against its public values.
    pub fn verify(&self, proof: &AggregateProof) -> Result<()> {
        if self.key.verify(proof, &proof.attestation) {
            Ok(())
        } else {
            Err(AggregatorError::ProofVerification(format!(
                "attestation does not match output {} after {} steps",
                proof.public_output, proof.steps
            )))
        }
    }

    fn seal(
        &self,
        public_input: u32,
        public_output: u32,
        steps: u64,
        previous: Option<Attestation>,
    ) -> AggregateProof {
        let mut proof = AggregateProof {
            public_input,
            public_output,
            steps,
            previous,
            attestation: Attestation(Default::default()),
        };
        proof.attestation = self.key.attest(&proof);
        proof
    }
}
