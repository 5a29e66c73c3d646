//! Scripted scenarios run by the `deposit-demo` and `mailbox-demo` commands.

use anyhow::{ensure, Result};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use serde::Serialize;
use tracing::info;
use zkmsg_common::{Account, AuthenticatedMap, Root, MARKER_VALUE};
use zkmsg_deposit::{
    deposit_payload, DepositConfig, DepositEvent, DepositStateMachine, FlagMessage,
};
use zkmsg_mailbox::{
    Agent, AgentMessage, AgentRegistration, AgentTx, Mailbox, MailboxConfig,
};

#[derive(Debug, Serialize)]
pub struct DepositDemoReport {
    pub eligibility_root: Root,
    pub nullifier_root: Root,
    pub total_addresses: u64,
    pub total_messages: u64,
    pub events: Vec<DepositEvent>,
    pub rejected: Vec<String>,
}

struct Depositor {
    signing_key: SigningKey,
    account: Account,
}

impl Depositor {
    fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let account = Account::new(signing_key.verifying_key());
        Self {
            signing_key,
            account,
        }
    }
}

/// Admin adds two depositors; the first deposits twice, the second once.
pub fn run_deposit(config: DepositConfig) -> Result<DepositDemoReport> {
    let admin = Depositor::generate();
    let alice = Depositor::generate();
    let bob = Depositor::generate();

    let mut machine = DepositStateMachine::new(&admin.account, config);
    let mut eligible = AuthenticatedMap::new();
    let mut nullifiers = AuthenticatedMap::new();
    let mut rejected = Vec::new();

    for depositor in [&alice, &bob] {
        let key = depositor.account.key();
        machine.add_eligible(&admin.account, &eligible.witness(&key))?;
        eligible.set(key, MARKER_VALUE);
    }

    let attempts = [
        (&alice, FlagMessage(0b000001)),
        (&alice, FlagMessage(0b000110)),
        (&bob, FlagMessage(0b001000)),
    ];
    for (depositor, message) in attempts {
        let key = depositor.account.key();
        let signature = depositor
            .signing_key
            .sign(&deposit_payload(&message, &key));
        match machine.deposit_message(
            &depositor.account,
            message,
            &eligible.witness(&key),
            &nullifiers.witness(&key),
            Some(&signature),
        ) {
            Ok(receipt) => {
                nullifiers.set(key, MARKER_VALUE);
                ensure!(
                    receipt.nullifier_root == nullifiers.root(),
                    "nullifier mirror diverged from the state machine"
                );
            }
            Err(err) => {
                info!(%key, %err, "deposit rejected");
                rejected.push(err.to_string());
            }
        }
    }

    Ok(DepositDemoReport {
        eligibility_root: machine.eligibility_root(),
        nullifier_root: machine.nullifier_root(),
        total_addresses: machine.total_addresses(),
        total_messages: machine.total_messages(),
        events: machine.events().to_vec(),
        rejected,
    })
}

#[derive(Debug, Serialize)]
pub struct MailboxDemoReport {
    pub agent: Option<Agent>,
    pub last_tx: Option<AgentTx>,
    pub rejected: Vec<String>,
}

/// One agent sends message 10, then replays message 1.
pub fn run_mailbox(config: MailboxConfig) -> Result<MailboxDemoReport> {
    const AGENT_ID: u64 = 1;
    const CODE: &str = "ab";

    let use_proof = config.require_proof;
    let mut mailbox = Mailbox::new(config);
    mailbox.add_agent(&AgentRegistration::new(AGENT_ID, CODE))?;

    let sender = Account::new(SigningKey::generate(&mut OsRng).verifying_key());
    let mut rejected = Vec::new();

    for (nonce, msg_number) in [10u64, 1].into_iter().enumerate() {
        let message = AgentMessage::new(msg_number, AGENT_ID, "rendezvous@9", CODE);
        let tx = AgentTx {
            block_height: 100 + nonce as u64,
            sender,
            nonce: nonce as u64,
        };
        let outcome = if use_proof {
            let proof = mailbox.prover().prove(&message)?;
            mailbox.receive_message_with_proof(&proof, Some(&tx))
        } else {
            mailbox.receive_message(&message, Some(&tx))
        };
        if let Err(err) = outcome {
            info!(msg_number, %err, "message rejected");
            rejected.push(err.to_string());
        }
    }

    Ok(MailboxDemoReport {
        agent: mailbox.agent(AGENT_ID).copied(),
        last_tx: mailbox.audit(AGENT_ID).copied(),
        rejected,
    })
}
