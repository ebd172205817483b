use std::collections::VecDeque;

use log::warn;

use super::{event::Event, event_log::EventLog};
use crate::{Instant, PeerId, WorldRefType};

struct RequestedEvent {
    event: Event,
    origin: PeerId,
    queued_at: Instant,
}

/// Events accepted by the host and waiting to be committed to the log
pub struct RequestQueue {
    requested: VecDeque<RequestedEvent>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self {
            requested: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: Event, origin: PeerId, now: &Instant) {
        self.requested.push_back(RequestedEvent {
            event,
            origin,
            queued_at: *now,
        });
    }

    pub fn len(&self) -> usize {
        self.requested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }

    /// Move every event whose entities are all present into the log, in
    /// FIFO order. Events still waiting on an entity stay queued, in order,
    /// without holding back the ones behind them; those that waited longer
    /// than `max_deferral_millis` are dropped. Returns how many committed.
    pub fn commit_ready<W: WorldRefType>(
        &mut self,
        world: &W,
        log: &mut EventLog,
        now: &Instant,
        max_deferral_millis: f64,
    ) -> usize {
        let mut committed = 0;
        let mut deferred = VecDeque::new();

        while let Some(requested) = self.requested.pop_front() {
            if world.has_entities(&requested.event.entities) {
                log.commit(requested.event);
                committed += 1;
            } else if requested.queued_at.elapsed_millis(now) > max_deferral_millis {
                warn!(
                    "dropping event {:?} from peer {}: entities {:?} never arrived",
                    requested.event.kind, requested.origin, requested.event.entities
                );
            } else {
                deferred.push_back(requested);
            }
        }

        self.requested = deferred;
        committed
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new()
    }
}
