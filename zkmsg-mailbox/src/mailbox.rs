//! Per-agent mailbox with replay protection.
//!
//! A message is accepted only if its agent is registered, it authenticates
//! against the stored security-code hash (directly or through a
//! [`SecurityCodeProof`]), its number is strictly above the last accepted one
//! and it is well formed. Any failure leaves the mailbox untouched.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::{
    config::MailboxConfig,
    error::{MailboxError, Result},
    proof::{SecurityCodeProof, SecurityCodeProver},
    types::{hash_security_code, Agent, AgentId, AgentMessage, AgentRegistration, AgentTx},
};

#[derive(Clone, Debug)]
pub struct Mailbox {
    config: MailboxConfig,
    agents: HashMap<AgentId, Agent>,
    audit: HashMap<AgentId, AgentTx>,
    verifier: SecurityCodeProver,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new(MailboxConfig::default())
    }
}

impl Mailbox {
    pub fn new(config: MailboxConfig) -> Self {
        let verifier = SecurityCodeProver::for_config(&config);
        Self {
            config,
            agents: HashMap::new(),
            audit: HashMap::new(),
            verifier,
        }
    }

    pub fn config(&self) -> &MailboxConfig {
        &self.config
    }

    /// Prover whose proofs this mailbox accepts.
    pub fn prover(&self) -> &SecurityCodeProver {
        &self.verifier
    }

    pub fn agent(&self, agent_id: AgentId) -> Option<&Agent> {
        self.agents.get(&agent_id)
    }

    /// Transaction context of the agent's last accepted message.
    pub fn audit(&self, agent_id: AgentId) -> Option<&AgentTx> {
        self.audit.get(&agent_id)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Register a new agent.
    pub fn add_agent(&mut self, registration: &AgentRegistration) -> Result<Agent> {
        let agent_id = registration.agent_id;
        if self.agents.contains_key(&agent_id) {
            return Err(MailboxError::AlreadyRegistered(agent_id));
        }
        let len = registration.security_code.chars().count();
        if len != self.config.security_code_len {
            return Err(MailboxError::Validation(format!(
                "security code must be {} characters, got {len}",
                self.config.security_code_len
            )));
        }

        let agent = registration.to_agent();
        self.agents.insert(agent_id, agent);
        info!(agent_id, "agent registered");
        Ok(agent)
    }

    /// Accept `message`, authenticated by its raw security code.
    pub fn receive_message(&mut self, message: &AgentMessage, tx: Option<&AgentTx>) -> Result<Agent> {
        if self.config.require_proof {
            return Err(MailboxError::Unauthorized(
                "messages must be authenticated with a security code proof".into(),
            ));
        }

        let agent = self.lookup(message.agent_id)?;
        if hash_security_code(&message.security_code) != agent.security_code_hash {
            warn!(agent_id = agent.agent_id, "security code mismatch");
            return Err(MailboxError::InvalidSecurityCode {
                agent_id: agent.agent_id,
            });
        }
        check_sequence(&agent, message.msg_number)?;
        if let Some(reason) =
            message.shape_violation(self.config.body_len, self.config.security_code_len)
        {
            return Err(MailboxError::Validation(reason));
        }

        Ok(self.commit(agent, message.msg_number, tx))
    }

    /// Accept the message authorized by `proof` without seeing its code.
    pub fn receive_message_with_proof(
        &mut self,
        proof: &SecurityCodeProof,
        tx: Option<&AgentTx>,
    ) -> Result<Agent> {
        let agent = self.lookup(proof.agent_id)?;
        self.verifier.verify(proof)?;
        if proof.security_code_hash != agent.security_code_hash {
            warn!(agent_id = agent.agent_id, "proof bound to another security code");
            return Err(MailboxError::InvalidSecurityCode {
                agent_id: agent.agent_id,
            });
        }
        check_sequence(&agent, proof.msg_number)?;

        Ok(self.commit(agent, proof.msg_number, tx))
    }

    fn lookup(&self, agent_id: AgentId) -> Result<Agent> {
        self.agents
            .get(&agent_id)
            .copied()
            .ok_or(MailboxError::NotRegistered(agent_id))
    }

    fn commit(&mut self, mut agent: Agent, msg_number: u64, tx: Option<&AgentTx>) -> Agent {
        agent.last_msg_number = msg_number;
        self.agents.insert(agent.agent_id, agent);
        if let (true, Some(tx)) = (self.config.record_audit, tx) {
            self.audit.insert(agent.agent_id, *tx);
        }
        info!(agent_id = agent.agent_id, msg_number, "message received");
        agent
    }
}

fn check_sequence(agent: &Agent, msg_number: u64) -> Result<()> {
    if msg_number <= agent.last_msg_number {
        return Err(MailboxError::Sequence {
            agent_id: agent.agent_id,
            last: agent.last_msg_number,
            got: msg_number,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkmsg_common::{Attestation, Digest, ProgramKey};
    use zkmsg_test_fixtures::fixtures;

    use crate::proof::SECURITY_CODE_PROGRAM_ID;

    const BODY: &str = "abcdefghijkl";

    fn mailbox_with_agent(config: MailboxConfig) -> Mailbox {
        let mut mailbox = Mailbox::new(config);
        mailbox.add_agent(&AgentRegistration::new(1, "ab")).unwrap();
        mailbox
    }

    #[test]
    fn duplicate_agent_is_rejected() {
        let mut mailbox = mailbox_with_agent(MailboxConfig::default());
        assert!(matches!(
            mailbox.add_agent(&AgentRegistration::new(1, "cd")),
            Err(MailboxError::AlreadyRegistered(1))
        ));
        assert_eq!(mailbox.agent_count(), 1);
    }

    #[test]
    fn security_code_length_is_enforced_on_registration() {
        let mut mailbox = Mailbox::default();
        assert!(matches!(
            mailbox.add_agent(&AgentRegistration::new(2, "abc")),
            Err(MailboxError::Validation(_))
        ));
        assert!(mailbox.agent(2).is_none());
    }

    #[test]
    fn unknown_agent_is_rejected() {
        let mut mailbox = Mailbox::default();
        let err = mailbox
            .receive_message(&AgentMessage::new(1, 5, BODY, "ab"), None)
            .unwrap_err();
        assert!(matches!(err, MailboxError::NotRegistered(5)));
    }

    #[test]
    fn wrong_code_is_rejected() {
        let mut mailbox = mailbox_with_agent(MailboxConfig::default());
        let err = mailbox
            .receive_message(&AgentMessage::new(1, 1, BODY, "zz"), None)
            .unwrap_err();
        assert!(matches!(err, MailboxError::InvalidSecurityCode { agent_id: 1 }));
        assert_eq!(mailbox.agent(1).unwrap().last_msg_number, 0);
    }

    #[test]
    fn malformed_body_is_rejected_after_sequence_check() {
        let mut mailbox = mailbox_with_agent(MailboxConfig::default());
        let err = mailbox
            .receive_message(&AgentMessage::new(3, 1, "short", "ab"), None)
            .unwrap_err();
        assert!(matches!(err, MailboxError::Validation(_)));
        assert_eq!(mailbox.agent(1).unwrap().last_msg_number, 0);
    }

    #[test]
    fn audit_record_written_on_success_only() {
        let f = fixtures();
        let mut mailbox = mailbox_with_agent(MailboxConfig::default());
        let tx = AgentTx {
            block_height: 12,
            sender: f.alice.account,
            nonce: 3,
        };

        assert!(mailbox
            .receive_message(&AgentMessage::new(1, 1, BODY, "zz"), Some(&tx))
            .is_err());
        assert!(mailbox.audit(1).is_none());

        mailbox
            .receive_message(&AgentMessage::new(1, 1, BODY, "ab"), Some(&tx))
            .unwrap();
        assert_eq!(mailbox.audit(1), Some(&tx));
    }

    #[test]
    fn audit_can_be_disabled() {
        let f = fixtures();
        let mut mailbox = mailbox_with_agent(MailboxConfig {
            record_audit: false,
            ..MailboxConfig::default()
        });
        let tx = AgentTx {
            block_height: 1,
            sender: f.bob.account,
            nonce: 0,
        };
        mailbox
            .receive_message(&AgentMessage::new(1, 1, BODY, "ab"), Some(&tx))
            .unwrap();
        assert!(mailbox.audit(1).is_none());
    }

    #[test]
    fn proof_path_accepts_and_advances() {
        let mut mailbox = mailbox_with_agent(MailboxConfig {
            require_proof: true,
            ..MailboxConfig::default()
        });
        let message = AgentMessage::new(4, 1, BODY, "ab");
        assert!(matches!(
            mailbox.receive_message(&message, None),
            Err(MailboxError::Unauthorized(_))
        ));

        let proof = mailbox.prover().prove(&message).unwrap();
        let agent = mailbox.receive_message_with_proof(&proof, None).unwrap();
        assert_eq!(agent.last_msg_number, 4);

        assert!(matches!(
            mailbox.receive_message_with_proof(&proof, None),
            Err(MailboxError::Sequence { last: 4, got: 4, .. })
        ));
    }

    #[test]
    fn proof_for_other_code_is_rejected() {
        let mut mailbox = mailbox_with_agent(MailboxConfig::default());
        let proof = mailbox
            .prover()
            .prove(&AgentMessage::new(2, 1, BODY, "zz"))
            .unwrap();
        assert!(matches!(
            mailbox.receive_message_with_proof(&proof, None),
            Err(MailboxError::InvalidSecurityCode { agent_id: 1 })
        ));
    }

    #[test]
    fn proof_attested_from_public_data_is_rejected() {
        let mut mailbox = Mailbox::new(MailboxConfig {
            prover_secret: Some(Digest::from_u64(42)),
            ..MailboxConfig::default()
        });
        mailbox.add_agent(&AgentRegistration::new(1, "q7")).unwrap();

        let mut forged = SecurityCodeProof {
            security_code_hash: mailbox.agent(1).unwrap().security_code_hash,
            agent_id: 1,
            msg_number: 99,
            attestation: Attestation(Digest::ZERO),
        };
        for key in [
            ProgramKey::from_secret(SECURITY_CODE_PROGRAM_ID, &Digest::ZERO),
            ProgramKey::generate(SECURITY_CODE_PROGRAM_ID),
        ] {
            forged.attestation = key.attest(&forged);
            assert!(matches!(
                mailbox.receive_message_with_proof(&forged, None),
                Err(MailboxError::ProofVerification(_))
            ));
        }
        assert_eq!(mailbox.agent(1).unwrap().last_msg_number, 0);
    }
}
