use std::collections::BTreeMap;

use log::{debug, info, trace, warn};

use meshsync_shared::{
    encode_empty, encode_message, Ack, AuthorityLedger, ByteReader, ClockSync, DesyncReason,
    EntityId, EntityTypeId, EntityTypes, Event, EventBatch, EventLog, EventReplicator, GameRules,
    HostType, Instant, JoinResponse, MessageType, PackOutcome, PeerId, Ping, Pong, Predictor,
    Protocol, ReplicatedEntities, ReplicationConfig, ReplicationError, Serde, SerdeErr,
    StateUpdateReader, StateUpdateTarget, StateUpdateWriter, SubmitOutcome, Timer, Transport,
    WorldMutType, WorldRefType,
};

use crate::{
    connection::peer_session::PeerSession,
    events::PeerEvent,
};

/// Replication endpoint of one peer in the mesh.
///
/// Incoming messages are queued with [`Dispatcher::receive`] as the
/// transport delivers them and only processed inside [`Dispatcher::tick`],
/// which is the sole place replication state changes.
pub struct Dispatcher {
    local_peer: PeerId,
    host_peer: PeerId,
    host_type: HostType,
    // Protocol
    entity_types: EntityTypes,
    config: ReplicationConfig,
    // Entities
    ledger: AuthorityLedger,
    replicated: ReplicatedEntities,
    predictor: Predictor,
    // Events
    events: EventReplicator,
    // Peers
    sessions: BTreeMap<PeerId, PeerSession>,
    ping_timer: Timer,
    outstanding_events: Vec<PeerEvent>,
}

impl Dispatcher {
    /// Create the endpoint for `local_peer`. The peer whose id equals
    /// `host_peer` owns the committed event log.
    pub fn new(local_peer: PeerId, host_peer: PeerId, protocol: Protocol) -> Self {
        let Protocol {
            entity_types,
            config,
            ..
        } = protocol;

        let host_type = if local_peer == host_peer {
            HostType::Host
        } else {
            HostType::Guest
        };

        Self {
            local_peer,
            host_peer,
            host_type,
            ledger: AuthorityLedger::new(local_peer),
            replicated: ReplicatedEntities::new(),
            predictor: Predictor::new(),
            events: EventReplicator::new(host_type, &config),
            sessions: BTreeMap::new(),
            ping_timer: Timer::new(config.ping_interval),
            outstanding_events: Vec::new(),
            entity_types,
            config,
        }
    }

    // Accessors

    pub fn local_peer(&self) -> PeerId {
        self.local_peer
    }

    pub fn host_peer(&self) -> PeerId {
        self.host_peer
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn is_host(&self) -> bool {
        self.host_type.is_host()
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    pub fn ledger(&self) -> &AuthorityLedger {
        &self.ledger
    }

    pub fn replicated(&self) -> &ReplicatedEntities {
        &self.replicated
    }

    pub fn event_log(&self) -> &EventLog {
        self.events.log()
    }

    /// Events originated here that the host has not yet acknowledged (on a
    /// guest) or not yet committed (on the host)
    pub fn pending_events(&self) -> usize {
        self.events.pending_requests()
    }

    pub fn session(&self, peer: &PeerId) -> Option<&PeerSession> {
        self.sessions.get(peer)
    }

    pub fn peers(&self) -> impl Iterator<Item = &PeerId> {
        self.sessions.keys()
    }

    /// Drain the session lifecycle notifications raised since the last call
    pub fn take_events(&mut self) -> Vec<PeerEvent> {
        std::mem::take(&mut self.outstanding_events)
    }

    // Peers

    /// Open a session with `peer` once the transport reports a connection.
    /// A guest connecting to the host starts the Join handshake.
    pub fn connect_peer<T: Transport>(&mut self, peer: PeerId, transport: &mut T) {
        if peer == self.local_peer {
            warn!("refusing to open a session with ourselves ({})", peer);
            return;
        }
        if self.sessions.contains_key(&peer) {
            warn!("peer {} is already connected", peer);
            return;
        }

        self.sessions
            .insert(peer, PeerSession::new(peer, &self.config));
        info!("peer {} connected", peer);
        self.outstanding_events.push(PeerEvent::Connected(peer));

        if !self.is_host() && peer == self.host_peer {
            match encode_empty(MessageType::Join) {
                Ok(bytes) => transport.send(&peer, bytes, MessageType::Join.is_reliable()),
                Err(error) => warn!("cannot encode Join for peer {}: {}", peer, error),
            }
        }
    }

    /// Close the session with `peer` after the transport reports teardown
    pub fn disconnect_peer(&mut self, peer: &PeerId) {
        if self.sessions.remove(peer).is_some() {
            info!("peer {} disconnected", peer);
            self.outstanding_events.push(PeerEvent::Disconnected(*peer));
        }
    }

    /// Queue a message delivered by the transport for the next tick
    pub fn receive(&mut self, from: PeerId, bytes: &[u8]) {
        let Some(session) = self.sessions.get_mut(&from) else {
            warn!("dropping message from unconnected peer {}", from);
            return;
        };
        if let Err(reason) = session.inbox.receive(bytes) {
            self.sessions.remove(&from);
            self.report_desync(from, reason);
        }
    }

    // Entities

    /// Register a locally created entity for replication. The caller has
    /// already created it in the world.
    pub fn spawn_entity(
        &mut self,
        entity: EntityId,
        type_id: EntityTypeId,
    ) -> Result<(), ReplicationError> {
        if !self.entity_types.contains(&type_id) {
            return Err(ReplicationError::UnknownEntityType { type_id });
        }
        self.ledger.insert_local(entity);
        self.replicated.insert(entity, type_id, self.local_peer);
        debug!("spawned entity {} of type {}", entity, type_id);
        Ok(())
    }

    /// Issue a fresh claim on `entity`, returning the new authority seq.
    /// Peers adopt it when the next state update carrying it arrives.
    pub fn take_authority(&mut self, entity: &EntityId) -> Result<u32, ReplicationError> {
        let seq = self
            .ledger
            .take_authority(entity)
            .ok_or(ReplicationError::UnknownEntity { entity: *entity })?;
        debug!("claimed entity {} with seq {}", entity, seq);
        Ok(seq)
    }

    /// Retire `entity`: it is no longer replicated from here and every
    /// session forgets what the remote side knew of it. Removing it from the
    /// world is up to the caller.
    pub fn despawn_entity(&mut self, entity: &EntityId) -> Result<(), ReplicationError> {
        let in_ledger = self.ledger.remove(entity).is_some();
        let replicated = self.replicated.remove(entity).is_some();
        if !in_ledger && !replicated {
            return Err(ReplicationError::UnknownEntity { entity: *entity });
        }
        self.predictor.forget(entity);
        for session in self.sessions.values_mut() {
            session.sync.forget(entity);
        }
        debug!("despawned entity {}", entity);
        Ok(())
    }

    // Events

    /// Originate an event detected by local simulation
    pub fn submit_event<W: WorldRefType, R: GameRules<W>>(
        &mut self,
        world: &W,
        rules: &R,
        event: Event,
        now: &Instant,
    ) -> SubmitOutcome {
        self.events.submit(world, rules, &self.ledger, event, now)
    }

    // Tick

    /// Run one simulation tick: process everything received since the last
    /// tick, commit and apply events, dead-reckon fresh replicas, then send
    /// pings, state updates and event traffic.
    pub fn tick<W: WorldMutType, R: GameRules<W>, T: Transport>(
        &mut self,
        now: &Instant,
        world: &mut W,
        rules: &mut R,
        transport: &mut T,
    ) {
        self.process_inboxes(now, world, rules, transport);

        let committed = self.events.commit(world, now, &self.config);
        if committed > 0 {
            debug!("committed {} events", committed);
        }
        self.apply_events(now, world, rules);

        let predicted = self.predictor.apply(world);
        if predicted > 0 {
            trace!("dead-reckoned {} entities", predicted);
        }

        self.send_pings(now, transport);
        self.send_state_updates(now, world, transport);
        self.send_events(now, transport);
    }

    // Incoming

    fn process_inboxes<W: WorldMutType, R: GameRules<W>, T: Transport>(
        &mut self,
        now: &Instant,
        world: &mut W,
        rules: &R,
        transport: &mut T,
    ) {
        let peers: Vec<PeerId> = self.sessions.keys().copied().collect();

        for peer in peers {
            let Some(mut session) = self.sessions.remove(&peer) else {
                continue;
            };

            match self.process_session(&mut session, now, world, rules, transport) {
                Ok(()) => {
                    self.sessions.insert(peer, session);
                }
                Err(ReplicationError::Desync { reason, .. }) => {
                    self.report_desync(peer, reason);
                }
                Err(error) => {
                    warn!("error handling messages from peer {}: {}", peer, error);
                    self.sessions.insert(peer, session);
                }
            }
        }
    }

    // Message types are handled in tag order, each type oldest first
    fn process_session<W: WorldMutType, R: GameRules<W>, T: Transport>(
        &mut self,
        session: &mut PeerSession,
        now: &Instant,
        world: &mut W,
        rules: &R,
        transport: &mut T,
    ) -> Result<(), ReplicationError> {
        for message_type in MessageType::ALL {
            for payload in session.inbox.drain(message_type) {
                self.handle_message(session, message_type, &payload, now, world, rules, transport)?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_message<W: WorldMutType, R: GameRules<W>, T: Transport>(
        &mut self,
        session: &mut PeerSession,
        message_type: MessageType,
        payload: &[u8],
        now: &Instant,
        world: &mut W,
        rules: &R,
        transport: &mut T,
    ) -> Result<(), ReplicationError> {
        let peer = session.peer_id();
        let malformed = |error: SerdeErr| ReplicationError::malformed(peer, error);
        let mut reader = ByteReader::new(payload);

        match message_type {
            MessageType::Join => {
                if !self.is_host() {
                    warn!("peer {} sent Join but we are not hosting", peer);
                    return Ok(());
                }
                session.reset_events(&self.config);
                let response = JoinResponse {
                    host: self.local_peer,
                };
                self.send(transport, peer, MessageType::JoinResponse, &response)?;
                info!("peer {} joined", peer);
                self.outstanding_events.push(PeerEvent::Joined(peer));
            }
            MessageType::JoinResponse => {
                let response = reader.read::<JoinResponse>().map_err(malformed)?;
                if response.host != self.host_peer {
                    warn!(
                        "peer {} answered Join claiming host {}, expected {}",
                        peer, response.host, self.host_peer
                    );
                    return Ok(());
                }
                session.mark_joined();
                info!("joined host {}", peer);
                self.outstanding_events.push(PeerEvent::Joined(peer));
            }
            MessageType::Events => {
                let batch = EventBatch::read(&mut reader).map_err(malformed)?;
                if peer != self.host_peer {
                    warn!("ignoring event log segment from non-host peer {}", peer);
                    return Ok(());
                }
                let ack = self
                    .events
                    .process_segment(batch)
                    .map_err(|reason| ReplicationError::desync(peer, reason))?;
                self.send(transport, peer, MessageType::AckEvents, &ack)?;
            }
            MessageType::AckEvents => {
                let ack = reader.read::<Ack>().map_err(malformed)?;
                self.events.process_log_ack(&mut session.events, &ack);
            }
            MessageType::EventRequests => {
                let batch = EventBatch::read(&mut reader).map_err(malformed)?;
                let ack = self
                    .events
                    .process_requests(peer, &mut session.events, batch, world, rules, now);
                self.send(transport, peer, MessageType::AckEventRequests, &ack)?;
            }
            MessageType::AckEventRequests => {
                let ack = reader.read::<Ack>().map_err(malformed)?;
                if peer == self.host_peer {
                    self.events.process_request_ack(&ack);
                }
            }
            MessageType::StateUpdate => {
                let mut target = StateUpdateTarget {
                    world: &mut *world,
                    ledger: &mut self.ledger,
                    replicated: &mut self.replicated,
                    entity_types: &self.entity_types,
                    predictor: &mut self.predictor,
                };
                let update_seq = StateUpdateReader::read_state_update(
                    peer,
                    &mut reader,
                    &mut session.sync,
                    &mut target,
                    session.clock.skew_estimate(),
                    now,
                    &self.config,
                )?;
                self.send(
                    transport,
                    peer,
                    MessageType::StateUpdateResponse,
                    &Ack::new(update_seq),
                )?;
            }
            MessageType::StateUpdateResponse => {
                let ack = reader.read::<Ack>().map_err(malformed)?;
                session.sync.process_ack(ack.watermark);
            }
            MessageType::Ping => {
                let ping = reader.read::<Ping>().map_err(malformed)?;
                let pong = ClockSync::answer_ping(&ping, now);
                self.send(transport, peer, MessageType::Pong, &pong)?;
            }
            MessageType::Pong => {
                let pong = reader.read::<Pong>().map_err(malformed)?;
                session.clock.process_pong(&pong, now);
            }
            MessageType::ReserveIds | MessageType::ReserveIdsResponse => {
                debug!("ignoring reserved message {:?} from peer {}", message_type, peer);
            }
        }

        Ok(())
    }

    fn apply_events<W: WorldMutType, R: GameRules<W>>(
        &mut self,
        now: &Instant,
        world: &mut W,
        rules: &mut R,
    ) {
        let reason = match self.events.apply(world, rules, now, &self.config) {
            Ok(applied) => {
                if applied > 0 {
                    trace!("applied {} events", applied);
                }
                return;
            }
            Err(reason) => reason,
        };

        if self.is_host() {
            warn!("committed event log is not advancing: {}", reason);
        } else if self.sessions.remove(&self.host_peer).is_some() {
            self.report_desync(self.host_peer, reason);
        }
    }

    // Outgoing

    fn send_pings<T: Transport>(&mut self, now: &Instant, transport: &mut T) {
        if !self.ping_timer.ringing(now) {
            return;
        }
        self.ping_timer.reset(now);

        for (peer, session) in self.sessions.iter_mut() {
            let ping = session.clock.next_ping(now);
            match encode_message(MessageType::Ping, &ping, self.config.max_message_bytes) {
                Ok(bytes) => transport.send(peer, bytes, MessageType::Ping.is_reliable()),
                Err(error) => warn!("cannot encode ping for peer {}: {}", peer, error),
            }
        }
    }

    fn send_state_updates<W: WorldRefType, T: Transport>(
        &mut self,
        now: &Instant,
        world: &W,
        transport: &mut T,
    ) {
        for (peer, session) in self.sessions.iter_mut() {
            let packed = match StateUpdateWriter::write_state_update(
                *peer,
                &mut session.sync,
                &self.ledger,
                &self.replicated,
                &self.entity_types,
                world,
                now,
                &self.config,
            ) {
                Ok(Some(packed)) => packed,
                Ok(None) => continue,
                Err(error) => {
                    warn!("cannot encode state update for peer {}: {}", peer, error);
                    continue;
                }
            };

            if let PackOutcome::Truncated(count) = packed.outcome {
                debug!(
                    "state update {} to peer {} truncated after {} entities",
                    packed.update_seq, peer, count
                );
            }
            transport.send(peer, packed.payload, MessageType::StateUpdate.is_reliable());
        }
    }

    fn send_events<T: Transport>(&mut self, now: &Instant, transport: &mut T) {
        let max_bytes = self.config.max_message_bytes;

        match self.host_type {
            HostType::Host => {
                for (peer, session) in self.sessions.iter_mut() {
                    if !session.is_joined() {
                        continue;
                    }
                    match self.events.write_segment(&mut session.events, now, max_bytes) {
                        Ok(Some(bytes)) => {
                            transport.send(peer, bytes, MessageType::Events.is_reliable())
                        }
                        Ok(None) => {}
                        Err(error) => {
                            warn!("cannot encode event segment for peer {}: {}", peer, error)
                        }
                    }
                }
            }
            HostType::Guest => {
                let joined = self
                    .sessions
                    .get(&self.host_peer)
                    .is_some_and(PeerSession::is_joined);
                if !joined {
                    return;
                }
                match self.events.write_requests(now, max_bytes) {
                    Ok(Some(bytes)) => transport.send(
                        &self.host_peer,
                        bytes,
                        MessageType::EventRequests.is_reliable(),
                    ),
                    Ok(None) => {}
                    Err(error) => warn!("cannot encode event requests: {}", error),
                }
            }
        }
    }

    fn send<T: Transport, P: Serde>(
        &self,
        transport: &mut T,
        peer: PeerId,
        message_type: MessageType,
        payload: &P,
    ) -> Result<(), ReplicationError> {
        let bytes = encode_message(message_type, payload, self.config.max_message_bytes)?;
        transport.send(&peer, bytes, message_type.is_reliable());
        Ok(())
    }

    fn report_desync(&mut self, peer: PeerId, reason: DesyncReason) {
        warn!("dropping peer {}: {}", peer, reason);
        self.outstanding_events
            .push(PeerEvent::Desynced(peer, reason));
    }
}
