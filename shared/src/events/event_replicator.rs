use log::{debug, trace, warn};
use meshsync_serde::SerdeErr;

use super::{
    event::Event, event_batch::EventBatch, event_log::EventLog, event_sender::EventSender,
    event_sync_state::EventSyncState, game_rules::GameRules, request_queue::RequestQueue,
};
use crate::{
    messages::{ack::Ack, MessageType},
    AuthorityLedger, DesyncReason, EventId, HostType, Instant, PeerId, ReplicationConfig,
    WorldMutType, WorldRefType,
};

/// What happened to a locally detected event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Buffered for the host under this request id
    Requested(EventId),
    /// Queued on the host for commit
    Queued,
    /// Its authority entity is owned elsewhere; that owner will originate it
    NotAuthority,
    /// Failed the local legality check
    Illegal,
}

/// Host-authoritative ordered event replication. A process is either the
/// host, committing requested events into the log and broadcasting it, or
/// a guest, proposing events and mirroring the host's log.
pub struct EventReplicator {
    host_type: HostType,
    sender: EventSender,
    requests: RequestQueue,
    log: EventLog,
}

impl EventReplicator {
    pub fn new(host_type: HostType, config: &ReplicationConfig) -> Self {
        Self {
            host_type,
            sender: EventSender::new(config.event_resend_interval),
            requests: RequestQueue::new(),
            log: EventLog::new(),
        }
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn pending_requests(&self) -> usize {
        match self.host_type {
            HostType::Host => self.requests.len(),
            HostType::Guest => self.sender.len(),
        }
    }

    // Origination

    /// Originate a locally detected event. Only the owner of the event's
    /// authority entity originates it.
    pub fn submit<W: WorldRefType, R: GameRules<W>>(
        &mut self,
        world: &W,
        rules: &R,
        ledger: &AuthorityLedger,
        event: Event,
        now: &Instant,
    ) -> SubmitOutcome {
        let owned = rules
            .authority_entity(&event)
            .is_some_and(|entity| ledger.is_locally_owned(&entity));
        if !owned {
            return SubmitOutcome::NotAuthority;
        }
        if !rules.is_legal(world, &event) {
            warn!("locally detected event {:?} is not legal", event.kind);
            return SubmitOutcome::Illegal;
        }

        match self.host_type {
            HostType::Host => {
                self.requests.push(event, ledger.local_peer(), now);
                SubmitOutcome::Queued
            }
            HostType::Guest => SubmitOutcome::Requested(self.sender.push(event)),
        }
    }

    // Host side

    /// Handle an EventRequests batch from `peer`. Requests below the peer's
    /// watermark are replays and skipped; the rest are legality-checked and
    /// queued. Returns the ack to send back.
    pub fn process_requests<W: WorldRefType, R: GameRules<W>>(
        &mut self,
        peer: PeerId,
        state: &mut EventSyncState,
        batch: EventBatch,
        world: &W,
        rules: &R,
        now: &Instant,
    ) -> Ack {
        if !self.host_type.is_host() {
            warn!("ignoring event requests from peer {}: not hosting", peer);
            return Ack::new(state.next_id);
        }

        let first = batch.first;
        let count = batch.events.len() as u32;
        let mut newly_processed = false;

        for (offset, event) in batch.events.into_iter().enumerate() {
            let id = first.wrapping_add(offset as u32);
            if id < state.next_id {
                continue;
            }
            newly_processed = true;
            if rules.is_legal(world, &event) {
                self.requests.push(event, peer, now);
            } else {
                warn!("dropping illegal event {:?} (id {}) from peer {}", event.kind, id, peer);
            }
        }

        if newly_processed {
            state.next_id = first.wrapping_add(count);
        }
        trace!("event requests from peer {} acked up to {}", peer, state.next_id);
        Ack::new(state.next_id)
    }

    /// Commit every requested event whose entities are all present
    pub fn commit<W: WorldRefType>(&mut self, world: &W, now: &Instant, config: &ReplicationConfig) -> usize {
        if !self.host_type.is_host() {
            return 0;
        }
        self.requests
            .commit_ready(world, &mut self.log, now, config.max_deferral_millis())
    }

    /// Encode the log segment `peer` is missing, if one is due
    pub fn write_segment(
        &self,
        state: &mut EventSyncState,
        now: &Instant,
        max_bytes: usize,
    ) -> Result<Option<Box<[u8]>>, SerdeErr> {
        if !self.host_type.is_host() || !state.should_send_segment(self.log.len(), now) {
            return Ok(None);
        }

        let first = state.next_seq;
        let Some((payload, count)) = EventBatch::write_message(
            MessageType::Events,
            first,
            self.log.entries_from(first).iter(),
            max_bytes,
        )?
        else {
            return Ok(None);
        };

        state.mark_segment_sent(first.wrapping_add(count as u32), now);
        Ok(Some(payload))
    }

    pub fn process_log_ack(&self, state: &mut EventSyncState, ack: &Ack) {
        state.process_ack(ack.watermark, self.log.len());
    }

    // Guest side

    pub fn write_requests(
        &mut self,
        now: &Instant,
        max_bytes: usize,
    ) -> Result<Option<Box<[u8]>>, SerdeErr> {
        if self.host_type.is_host() || !self.sender.should_send(now) {
            return Ok(None);
        }
        self.sender.write_requests(now, max_bytes)
    }

    pub fn process_request_ack(&mut self, ack: &Ack) {
        self.sender.process_ack(ack.watermark);
    }

    /// Mirror a log segment from the host, returning the ack (new local log
    /// length) to send back
    pub fn process_segment(&mut self, batch: EventBatch) -> Result<Ack, DesyncReason> {
        if self.host_type.is_host() {
            warn!("host received an event log segment, ignoring");
            return Ok(Ack::new(self.log.len()));
        }
        let appended = self.log.receive_segment(batch)?;
        if appended > 0 {
            debug!("appended {} events, log length {}", appended, self.log.len());
        }
        Ok(Ack::new(self.log.len()))
    }

    // Both roles

    /// Apply committed events in order; see [`EventLog::apply_ready`]
    pub fn apply<W: WorldMutType, R: GameRules<W>>(
        &mut self,
        world: &mut W,
        rules: &mut R,
        now: &Instant,
        config: &ReplicationConfig,
    ) -> Result<usize, DesyncReason> {
        self.log
            .apply_ready(world, rules, now, config.max_deferral_millis())
    }
}
