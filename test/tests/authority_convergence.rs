/// PROPERTY-BASED TESTS: Authority arbitration
///
/// Key invariants:
/// 1. Concurrent claims with equal seq converge to the same record in
///    either arrival order, lowest peer id winning
/// 2. A higher seq always wins, a lower seq never does
/// 3. Ownership changes made with take_authority reach every peer
use proptest::prelude::*;

use meshsync_shared::{AuthorityLedger, ClaimOutcome, Vec3};
use meshsync_test::{ComponentValue, LocalMesh, CRATE};

const ENTITY: u32 = 42;

fn ledger_with(owner: u8, seq: u32) -> AuthorityLedger {
    let mut ledger = AuthorityLedger::new(200);
    ledger.claim(ENTITY, owner, seq, 0);
    ledger
}

#[test]
fn equal_seq_tie_goes_to_lower_peer_in_both_orders() {
    let mut forward = ledger_with(7, 4);
    forward.claim(ENTITY, 2, 5, 0);
    forward.claim(ENTITY, 3, 5, 0);

    let mut backward = ledger_with(7, 4);
    backward.claim(ENTITY, 3, 5, 0);
    backward.claim(ENTITY, 2, 5, 0);

    assert_eq!(forward.owner_of(&ENTITY), Some(2));
    assert_eq!(backward.owner_of(&ENTITY), Some(2));
    assert_eq!(forward.get(&ENTITY), backward.get(&ENTITY));
}

#[test]
fn stale_redelivery_leaves_ledger_unchanged() {
    let mut ledger = AuthorityLedger::new(9);
    assert_eq!(ledger.claim(ENTITY, 1, 1, 6), ClaimOutcome::Accepted);
    let before = *ledger.get(&ENTITY).expect("claimed");

    assert_eq!(ledger.claim(ENTITY, 1, 1, 3), ClaimOutcome::Rejected);
    assert_eq!(ledger.get(&ENTITY), Some(&before));

    // the same message delivered twice is idempotent
    assert_eq!(ledger.claim(ENTITY, 1, 1, 6), ClaimOutcome::Accepted);
    assert_eq!(ledger.get(&ENTITY), Some(&before));
}

proptest! {
    #[test]
    fn prop_equal_seq_claims_commute(
        initial_owner in 0u8..16,
        a in 0u8..16,
        b in 0u8..16,
        seq in 1u32..1000,
        update_a in 0u32..100,
        update_b in 0u32..100,
    ) {
        let mut forward = ledger_with(initial_owner, seq - 1);
        forward.claim(ENTITY, a, seq, update_a);
        forward.claim(ENTITY, b, seq, update_b);

        let mut backward = ledger_with(initial_owner, seq - 1);
        backward.claim(ENTITY, b, seq, update_b);
        backward.claim(ENTITY, a, seq, update_a);

        prop_assert_eq!(forward.get(&ENTITY), backward.get(&ENTITY));
        prop_assert_eq!(forward.owner_of(&ENTITY), Some(a.min(b)));
    }

    #[test]
    fn prop_seq_dominates_owner(
        owner in 0u8..16,
        claimant in 0u8..16,
        seq in 1u32..1000,
        delta in 1u32..10,
        update_seq in 0u32..100,
    ) {
        let mut ledger = ledger_with(owner, seq);

        prop_assert_eq!(
            ledger.claim(ENTITY, claimant, seq.saturating_sub(delta), update_seq),
            ClaimOutcome::Rejected
        );
        prop_assert_eq!(ledger.owner_of(&ENTITY), Some(owner));

        prop_assert_eq!(
            ledger.claim(ENTITY, claimant, seq + delta, update_seq),
            ClaimOutcome::Accepted
        );
        prop_assert_eq!(ledger.owner_of(&ENTITY), Some(claimant));
        prop_assert_eq!(ledger.get(&ENTITY).map(|record| record.seq), Some(seq + delta));
    }
}

#[test]
fn taken_authority_converges_across_mesh() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut mesh = LocalMesh::new(1, &[1, 2, 3]);
    mesh.spawn(
        2,
        ENTITY,
        CRATE,
        &[
            ComponentValue::Color(5),
            ComponentValue::Position(Vec3::new(1.0, 2.0, 3.0)),
        ],
    );
    mesh.run(5);

    for peer in [1, 2, 3] {
        assert_eq!(mesh.dispatcher(&peer).ledger().owner_of(&ENTITY), Some(2));
        assert_eq!(mesh.world(&peer).color(&ENTITY), Some(5));
    }

    let seq = mesh
        .node_mut(&3)
        .dispatcher
        .take_authority(&ENTITY)
        .expect("entity is replicated");
    assert_eq!(seq, 2);
    mesh.set_component(3, ENTITY, ComponentValue::Position(Vec3::new(9.0, 9.0, 9.0)));
    mesh.run(5);

    for peer in [1, 2, 3] {
        let record = mesh.dispatcher(&peer).ledger().get(&ENTITY).copied();
        assert_eq!(record.map(|record| (record.owner, record.seq)), Some((3, 2)));
        assert_eq!(mesh.world(&peer).position(&ENTITY), Some(Vec3::new(9.0, 9.0, 9.0)));
    }
    assert_eq!(mesh.dispatcher(&2).ledger().locally_owned(), Vec::<u32>::new());
}
