//! Batch folding and tracking properties.

use proptest::prelude::*;
use zkmsg_aggregator::{AgentReport, AggregatorConfig, MaxTracker, MessageProver};
use zkmsg_common::MessageValidator;

fn arb_report() -> impl Strategy<Value = AgentReport> {
    let valid = (0u32..10_000, 1u32..=3000, 0u32..=4999, 5000u32..=20000).prop_map(
        |(number, id, x, y)| AgentReport {
            number,
            id,
            x,
            y,
            checksum: id + x + y,
        },
    );
    let arbitrary = (0u32..10_000, any::<u32>(), any::<u32>(), any::<u32>(), any::<u32>())
        .prop_map(|(number, id, x, y, checksum)| AgentReport {
            number,
            id,
            x,
            y,
            checksum,
        });
    prop_oneof![valid, arbitrary]
}

#[test]
fn reference_batches() {
    let prover = MessageProver::default();
    let one = AgentReport::with_checksum(1, 100, 1500, 5500).unwrap();
    let ten = AgentReport::with_checksum(10, 3000, 1000, 5000).unwrap();
    let bad = AgentReport {
        number: 1000,
        id: 3500,
        x: 1500,
        y: 5500,
        checksum: 10500,
    };

    assert_eq!(prover.batch_messages(&[one, ten], None).unwrap().public_output, 10);
    assert_eq!(
        prover.batch_messages(&[one, ten, bad], None).unwrap().public_output,
        10
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn output_is_max_of_valid_numbers(
        seed in 0u32..100,
        reports in prop::collection::vec(arb_report(), 0..12),
    ) {
        let prover = MessageProver::new(AggregatorConfig { seed, ..AggregatorConfig::default() });
        let proof = prover.batch_messages(&reports, None).unwrap();

        let expected = reports
            .iter()
            .filter(|r| r.is_valid())
            .map(|r| r.number)
            .fold(seed, u32::max);
        prop_assert_eq!(proof.public_output, expected);
        prop_assert_eq!(proof.steps, reports.len() as u64);
        prop_assert!(prover.verify(&proof).is_ok());
    }

    #[test]
    fn tracker_is_order_independent(
        batches in prop::collection::vec(prop::collection::vec(arb_report(), 0..5), 1..5),
    ) {
        let prover = MessageProver::default();
        let proofs: Vec<_> = batches
            .iter()
            .map(|b| prover.batch_messages(b, None).unwrap())
            .collect();

        let mut forward = MaxTracker::new(prover.clone());
        let mut backward = MaxTracker::new(prover.clone());
        for proof in &proofs {
            forward.step(proof).unwrap();
        }
        for proof in proofs.iter().rev() {
            backward.step(proof).unwrap();
            backward.step(proof).unwrap();
        }
        prop_assert_eq!(forward.max(), backward.max());
    }
}
