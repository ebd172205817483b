use log::{debug, warn};

use super::{event::Event, event_batch::EventBatch, game_rules::GameRules};
use crate::{DesyncReason, EventSeq, Instant, WorldMutType};

/// Append-only, seq-dense log of committed events. `entries[i]` is the
/// event with seq `i`. The host commits into it; every other peer mirrors a
/// prefix of the host's log.
pub struct EventLog {
    entries: Vec<Event>,
    applied: usize,
    stalled_since: Option<Instant>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            applied: 0,
            stalled_since: None,
        }
    }

    pub fn len(&self) -> u32 {
        u32::try_from(self.entries.len()).unwrap_or(u32::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, seq: EventSeq) -> Option<&Event> {
        self.entries.get(seq as usize)
    }

    /// Entries from `seq` to the end of the log
    pub fn entries_from(&self, seq: EventSeq) -> &[Event] {
        let start = (seq as usize).min(self.entries.len());
        &self.entries[start..]
    }

    /// Seq of the next entry to apply
    pub fn applied(&self) -> EventSeq {
        u32::try_from(self.applied).unwrap_or(u32::MAX)
    }

    /// Append an event on the host, assigning it the next seq
    pub fn commit(&mut self, event: Event) -> EventSeq {
        let seq = self.len();
        debug!("committed event {:?} at seq {}", event.kind, seq);
        self.entries.push(event);
        seq
    }

    /// Mirror a segment of the host's log. Entries already held are skipped,
    /// so duplicate deliveries are harmless. A segment that starts past the
    /// end of the local log means entries were lost in between.
    ///
    /// Returns how many entries were appended.
    pub fn receive_segment(&mut self, batch: EventBatch) -> Result<usize, DesyncReason> {
        let local_len = self.len();
        if batch.first > local_len {
            return Err(DesyncReason::EventSegmentGap {
                first: batch.first,
                local_len,
            });
        }

        let mut appended = 0;
        for (offset, event) in batch.events.into_iter().enumerate() {
            let seq = batch.first.wrapping_add(offset as u32);
            if seq < self.len() {
                continue;
            }
            if seq != self.len() {
                return Err(DesyncReason::EventSeqMismatch {
                    expected: self.len(),
                    actual: seq,
                });
            }
            self.entries.push(event);
            appended += 1;
        }
        Ok(appended)
    }

    /// Apply committed entries strictly in seq order, halting at the first
    /// entry whose entities are not all present and resuming there on a
    /// later call. Returns how many entries were applied, or an error once
    /// one entry has been blocked for longer than `max_deferral_millis`.
    pub fn apply_ready<W: WorldMutType, R: GameRules<W>>(
        &mut self,
        world: &mut W,
        rules: &mut R,
        now: &Instant,
        max_deferral_millis: f64,
    ) -> Result<usize, DesyncReason> {
        let mut applied = 0;

        while let Some(event) = self.entries.get(self.applied) {
            let seq = self.applied();
            if !world.has_entities(&event.entities) {
                let since = self.stalled_since.get_or_insert(*now);
                if since.elapsed_millis(now) > max_deferral_millis {
                    warn!("event {} still waiting on entities {:?}", seq, event.entities);
                    return Err(DesyncReason::ApplyStalled { seq });
                }
                break;
            }

            rules.apply(world, seq, event);
            self.applied += 1;
            self.stalled_since = None;
            applied += 1;
        }

        Ok(applied)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
