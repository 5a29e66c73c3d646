//! Anti-replay behaviour of the mailbox.

use proptest::prelude::*;
use zkmsg_mailbox::{AgentMessage, AgentRegistration, Mailbox, MailboxError};

const BODY: &str = "hello-world!";

#[test]
fn replayed_lower_number_is_rejected() {
    let mut mailbox = Mailbox::default();
    mailbox.add_agent(&AgentRegistration::new(7, "k9")).unwrap();

    mailbox
        .receive_message(&AgentMessage::new(10, 7, BODY, "k9"), None)
        .unwrap();
    let err = mailbox
        .receive_message(&AgentMessage::new(1, 7, BODY, "k9"), None)
        .unwrap_err();
    assert!(matches!(
        err,
        MailboxError::Sequence {
            agent_id: 7,
            last: 10,
            got: 1
        }
    ));
    assert_eq!(mailbox.agent(7).unwrap().last_msg_number, 10);
}

#[test]
fn agents_have_independent_sequences() {
    let mut mailbox = Mailbox::default();
    mailbox.add_agent(&AgentRegistration::new(1, "aa")).unwrap();
    mailbox.add_agent(&AgentRegistration::new(2, "bb")).unwrap();

    mailbox
        .receive_message(&AgentMessage::new(50, 1, BODY, "aa"), None)
        .unwrap();
    mailbox
        .receive_message(&AgentMessage::new(3, 2, BODY, "bb"), None)
        .unwrap();
    assert_eq!(mailbox.agent(1).unwrap().last_msg_number, 50);
    assert_eq!(mailbox.agent(2).unwrap().last_msg_number, 3);
}

#[test]
fn raw_and_proof_paths_share_one_sequence() {
    let mut mailbox = Mailbox::default();
    mailbox.add_agent(&AgentRegistration::new(1, "aa")).unwrap();

    let proof = mailbox
        .prover()
        .prove(&AgentMessage::new(5, 1, BODY, "aa"))
        .unwrap();
    mailbox.receive_message_with_proof(&proof, None).unwrap();

    assert!(matches!(
        mailbox.receive_message(&AgentMessage::new(5, 1, BODY, "aa"), None),
        Err(MailboxError::Sequence { .. })
    ));
    mailbox
        .receive_message(&AgentMessage::new(6, 1, BODY, "aa"), None)
        .unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn last_number_is_running_maximum(numbers in prop::collection::vec(1u64..1000, 1..20)) {
        let mut mailbox = Mailbox::default();
        mailbox.add_agent(&AgentRegistration::new(1, "aa")).unwrap();

        let mut last = 0u64;
        for n in numbers {
            let accepted = mailbox
                .receive_message(&AgentMessage::new(n, 1, BODY, "aa"), None)
                .is_ok();
            prop_assert_eq!(accepted, n > last);
            last = last.max(n);
            prop_assert_eq!(mailbox.agent(1).unwrap().last_msg_number, last);
        }
    }
}
