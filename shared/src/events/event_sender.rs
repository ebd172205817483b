use std::{collections::VecDeque, time::Duration};

use log::{trace, warn};
use meshsync_serde::SerdeErr;

use super::{event::Event, event_batch::EventBatch};
use crate::{messages::MessageType, EventId, Instant, Timer};

/// Outgoing event requests of a non-host peer, kept until the host
/// acknowledges them
pub struct EventSender {
    events: VecDeque<(EventId, Event)>,
    next_id: EventId,
    has_new: bool,
    resend_timer: Timer,
}

impl EventSender {
    pub fn new(resend_interval: Duration) -> Self {
        Self {
            events: VecDeque::new(),
            next_id: 0,
            has_new: false,
            resend_timer: Timer::new(resend_interval),
        }
    }

    /// Buffer a locally originated event, returning its request id
    pub fn push(&mut self, event: Event) -> EventId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.events.push_back((id, event));
        self.has_new = true;
        id
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn should_send(&self, now: &Instant) -> bool {
        !self.events.is_empty() && (self.has_new || self.resend_timer.ringing(now))
    }

    /// Encode as many buffered requests as fit, oldest first. A request too
    /// large for any message is dropped so it cannot block the ones behind it.
    pub fn write_requests(
        &mut self,
        now: &Instant,
        max_bytes: usize,
    ) -> Result<Option<Box<[u8]>>, SerdeErr> {
        while let Some((first_id, _)) = self.events.front() {
            let written = EventBatch::write_message(
                MessageType::EventRequests,
                *first_id,
                self.events.iter().map(|(_, event)| event),
                max_bytes,
            )?;

            match written {
                Some((payload, count)) => {
                    self.has_new = false;
                    self.resend_timer.reset(now);
                    trace!("sending {} of {} event requests", count, self.events.len());
                    return Ok(Some(payload));
                }
                None => {
                    if let Some((id, event)) = self.events.pop_front() {
                        warn!(
                            "dropping event request {} ({:?}): larger than a {} byte message",
                            id, event.kind, max_bytes
                        );
                    }
                }
            }
        }

        Ok(None)
    }

    /// Drop every request below the host's watermark
    pub fn process_ack(&mut self, next_id: EventId) {
        while let Some((id, _)) = self.events.front() {
            if *id >= next_id {
                break;
            }
            self.events.pop_front();
        }
    }
}
