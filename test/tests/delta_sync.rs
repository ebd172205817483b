/// Delta synchronization: packing state updates under a byte budget,
/// applying them on the receiving side, and ack-driven promotion of entities
/// from Full to Dynamic sync.
use std::collections::HashSet;

use proptest::prelude::*;

use meshsync_shared::{
    AuthorityLedger, ByteReader, DesyncReason, EntityId, EntityTypeId, Instant, MessageType,
    PackOutcome, PackedStateUpdate, PeerId, Predictor, Protocol, Quat, ReplicatedEntities,
    ReplicationError, StateUpdateReader, StateUpdateTarget, StateUpdateWriter, SyncState,
    UpdateSeq, Vec3,
};
use meshsync_test::{protocol, ComponentValue, TestWorld, CRATE, SHIP};

// tag + update seq + timestamp + entity count
const HEADER_BYTES: usize = 10;
// a Full CRATE record: color and position
const FULL_CRATE_BYTES: usize = 37;
// a Dynamic CRATE record: position only
const DYNAMIC_CRATE_BYTES: usize = 27;

struct Endpoint {
    peer: PeerId,
    ledger: AuthorityLedger,
    replicated: ReplicatedEntities,
    predictor: Predictor,
    world: TestWorld,
    sync: SyncState,
}

impl Endpoint {
    fn new(peer: PeerId) -> Self {
        Self {
            peer,
            ledger: AuthorityLedger::new(peer),
            replicated: ReplicatedEntities::new(),
            predictor: Predictor::new(),
            world: TestWorld::new(),
            sync: SyncState::new(),
        }
    }

    fn spawn(&mut self, entity: EntityId, type_id: EntityTypeId, components: &[ComponentValue]) {
        self.world.spawn(entity, type_id, self.peer, components);
        self.ledger.insert_local(entity);
        self.replicated.insert(entity, type_id, self.peer);
    }

    fn write(&mut self, to: PeerId, protocol: &Protocol, now: &Instant) -> Option<PackedStateUpdate> {
        StateUpdateWriter::write_state_update(
            to,
            &mut self.sync,
            &self.ledger,
            &self.replicated,
            &protocol.entity_types,
            &self.world,
            now,
            &protocol.config,
        )
        .expect("state update encodes")
    }

    // Returns the read result and how many bytes were left unread
    fn read(
        &mut self,
        from: PeerId,
        payload: &[u8],
        protocol: &Protocol,
        now: &Instant,
    ) -> (Result<UpdateSeq, ReplicationError>, usize) {
        let mut reader = ByteReader::new(payload);
        assert_eq!(reader.read::<MessageType>(), Ok(MessageType::StateUpdate));

        let mut target = StateUpdateTarget {
            world: &mut self.world,
            ledger: &mut self.ledger,
            replicated: &mut self.replicated,
            entity_types: &protocol.entity_types,
            predictor: &mut self.predictor,
        };
        let result = StateUpdateReader::read_state_update(
            from,
            &mut reader,
            &mut self.sync,
            &mut target,
            0.0,
            now,
            &protocol.config,
        );
        (result, reader.remaining())
    }
}

fn crate_at(x: f32) -> [ComponentValue; 2] {
    [
        ComponentValue::Color(3),
        ComponentValue::Position(Vec3::new(x, 0.0, 0.0)),
    ]
}

#[test]
fn round_trip_preserves_component_values() {
    let protocol = protocol();
    let now = Instant::from_millis(1000.0);
    let mut sender = Endpoint::new(1);
    let mut receiver = Endpoint::new(2);

    sender.spawn(
        42,
        SHIP,
        &[
            ComponentValue::Color(0xABCD_EF01),
            ComponentValue::Position(Vec3::new(1.25, -2.5, 1.0e6)),
            ComponentValue::Velocity(Vec3::new(0.1, 0.2, 0.3)),
            ComponentValue::Rotation(Quat::new(0.0, 0.6, 0.0, 0.8)),
            ComponentValue::AngularVelocity(Vec3::ZERO),
        ],
    );

    let packed = sender.write(2, &protocol, &now).expect("one entity to send");
    assert_eq!(packed.outcome, PackOutcome::Complete(1));

    let (result, remaining) = receiver.read(1, &packed.payload, &protocol, &now);
    assert_eq!(result, Ok(packed.update_seq));
    assert_eq!(remaining, 0);

    assert_eq!(receiver.world.entities.get(&42), sender.world.entities.get(&42));
    assert_eq!(receiver.ledger.owner_of(&42), Some(1));
    assert_eq!(receiver.replicated.get(&42).map(|e| (e.type_id, e.creator)), Some((SHIP, 1)));
}

#[test]
fn stale_message_is_decoded_but_not_applied() {
    let protocol = protocol();
    let now = Instant::from_millis(0.0);
    let mut sender = Endpoint::new(1);
    let mut receiver = Endpoint::new(2);

    sender.spawn(42, CRATE, &crate_at(1.0));
    sender.spawn(43, CRATE, &crate_at(10.0));
    let older = sender.write(2, &protocol, &now).expect("update 0");

    sender.world.insert(42, ComponentValue::Color(8));
    sender.world.insert(43, ComponentValue::Position(Vec3::new(20.0, 0.0, 0.0)));
    let newer = sender.write(2, &protocol, &now).expect("update 1");

    let (result, _) = receiver.read(1, &newer.payload, &protocol, &now);
    assert_eq!(result, Ok(1));
    let record = receiver.ledger.get(&42).copied();

    // the reordered, older message arrives last
    let (result, remaining) = receiver.read(1, &older.payload, &protocol, &now);
    assert_eq!(result, Ok(0));
    assert_eq!(remaining, 0);

    assert_eq!(receiver.ledger.get(&42).copied(), record);
    assert_eq!(receiver.world.color(&42), Some(8));
    assert_eq!(receiver.world.position(&43), Some(Vec3::new(20.0, 0.0, 0.0)));
}

#[test]
fn acked_full_sync_switches_to_dynamic() {
    let protocol = protocol();
    let now = Instant::from_millis(0.0);
    let mut sender = Endpoint::new(1);
    let mut receiver = Endpoint::new(2);
    sender.spawn(42, CRATE, &crate_at(1.0));

    let first = sender.write(2, &protocol, &now).expect("full sync");
    assert_eq!(first.payload.len(), HEADER_BYTES + FULL_CRATE_BYTES);

    // unacked: still Full
    let second = sender.write(2, &protocol, &now).expect("full sync again");
    assert_eq!(second.payload.len(), HEADER_BYTES + FULL_CRATE_BYTES);

    let (result, _) = receiver.read(1, &first.payload, &protocol, &now);
    sender.sync.process_ack(result.expect("applied"));
    assert!(sender.sync.is_known(&42));

    sender.world.insert(42, ComponentValue::Position(Vec3::new(4.0, 0.0, 0.0)));
    let third = sender.write(2, &protocol, &now).expect("dynamic sync");
    assert_eq!(third.payload.len(), HEADER_BYTES + DYNAMIC_CRATE_BYTES);

    let (result, remaining) = receiver.read(1, &third.payload, &protocol, &now);
    assert_eq!(result, Ok(third.update_seq));
    assert_eq!(remaining, 0);
    assert_eq!(receiver.world.position(&42), Some(Vec3::new(4.0, 0.0, 0.0)));
}

#[test]
fn truncation_keeps_whole_records() {
    let mut protocol = protocol();
    protocol.config.max_message_bytes = HEADER_BYTES + 2 * FULL_CRATE_BYTES;
    let now = Instant::from_millis(0.0);
    let mut sender = Endpoint::new(1);
    let mut receiver = Endpoint::new(2);
    for entity in 1..=5 {
        sender.spawn(entity, CRATE, &crate_at(entity as f32));
    }

    let first = sender.write(2, &protocol, &now).expect("some entities fit");
    assert_eq!(first.outcome, PackOutcome::Truncated(2));
    assert_eq!(first.payload.len(), protocol.config.max_message_bytes);

    let (result, remaining) = receiver.read(1, &first.payload, &protocol, &now);
    assert_eq!(result, Ok(0));
    assert_eq!(remaining, 0);
    assert_eq!(receiver.world.entities.keys().copied().collect::<Vec<_>>(), vec![1, 2]);

    // skipped entities carry their priority into the next tick
    let second = sender.write(2, &protocol, &now).expect("next batch");
    assert_eq!(second.outcome, PackOutcome::Truncated(2));
    receiver.read(1, &second.payload, &protocol, &now).0.expect("applied");
    assert_eq!(
        receiver.world.entities.keys().copied().collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn dynamic_update_for_unknown_entity_is_deferred_then_desyncs() {
    let protocol = protocol();
    let start = Instant::from_millis(0.0);
    let mut sender = Endpoint::new(1);
    let mut receiver = Endpoint::new(2);
    sender.spawn(42, CRATE, &crate_at(1.0));

    // the Full sync is acked but never reaches this receiver
    let lost = sender.write(2, &protocol, &start).expect("full sync");
    sender.sync.process_ack(lost.update_seq);
    let dynamic = sender.write(2, &protocol, &start).expect("dynamic sync");

    let (result, remaining) = receiver.read(1, &dynamic.payload, &protocol, &start);
    assert_eq!(result, Ok(dynamic.update_seq));
    assert_eq!(remaining, 0);
    assert!(receiver.world.entities.is_empty());
    assert!(!receiver.ledger.contains(&42));

    let late = start.add_millis(protocol.config.max_deferral_millis() + 1.0);
    let (result, _) = receiver.read(1, &dynamic.payload, &protocol, &late);
    assert_eq!(
        result,
        Err(ReplicationError::Desync {
            peer: 1,
            reason: DesyncReason::UnknownDynamicEntity { entity: 42 },
        })
    );
}

#[derive(Clone, Debug)]
enum SyncOp {
    Pack(Vec<EntityId>),
    Ack(UpdateSeq),
}

fn sync_op() -> impl Strategy<Value = SyncOp> {
    prop_oneof![
        prop::collection::vec(0u32..16, 0..6).prop_map(SyncOp::Pack),
        (0u32..40).prop_map(SyncOp::Ack),
    ]
}

proptest! {
    #[test]
    fn prop_known_entities_never_shrink(ops in prop::collection::vec(sync_op(), 0..60)) {
        let mut state = SyncState::new();
        let mut ever_packed = HashSet::new();

        for op in ops {
            let before = state.entities_known().clone();
            match op {
                SyncOp::Pack(entities) => {
                    let update_seq = state.take_update_seq();
                    let full: HashSet<EntityId> = entities
                        .iter()
                        .copied()
                        .filter(|entity| !state.is_known(entity))
                        .collect();
                    ever_packed.extend(entities.iter().copied());
                    state.record_packed(update_seq, &entities, full);
                }
                SyncOp::Ack(update_seq) => state.process_ack(update_seq),
            }
            prop_assert!(before.is_subset(state.entities_known()));
            prop_assert!(state.entities_known().is_subset(&ever_packed));
        }
    }

    #[test]
    fn prop_every_entity_is_eventually_packed(
        entity_count in 1u32..20,
        per_message in 1usize..4,
        slack in 0usize..FULL_CRATE_BYTES,
    ) {
        let mut protocol = protocol();
        protocol.config.max_message_bytes = HEADER_BYTES + per_message * FULL_CRATE_BYTES + slack;
        let now = Instant::from_millis(0.0);
        let mut sender = Endpoint::new(1);
        for entity in 0..entity_count {
            sender.spawn(entity, CRATE, &crate_at(0.0));
        }

        let mut packed = HashSet::new();
        for _ in 0..entity_count {
            let update = sender.write(2, &protocol, &now).expect("something fits");
            prop_assert_eq!(update.outcome.packed(), per_message.min(entity_count as usize));
            for entity in 0..entity_count {
                if sender.sync.priority(&entity) == 0.0 {
                    packed.insert(entity);
                }
            }
        }
        prop_assert_eq!(packed.len(), entity_count as usize);
    }
}
