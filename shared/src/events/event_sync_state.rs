use std::time::Duration;

use crate::{EventId, EventSeq, Instant, Timer};

/// Per-peer event replication watermarks, kept by the host
pub struct EventSyncState {
    /// Lowest request id from this peer not yet processed
    pub next_id: EventId,
    /// First log entry this peer has not acknowledged
    pub next_seq: EventSeq,
    // log length covered by the last segment sent
    sent_len: u32,
    resend_timer: Timer,
}

impl EventSyncState {
    pub fn new(resend_interval: Duration) -> Self {
        Self {
            next_id: 0,
            next_seq: 0,
            sent_len: 0,
            resend_timer: Timer::new(resend_interval),
        }
    }

    /// A segment should go out when the peer is behind and either entries
    /// were committed since the last send or the resend interval elapsed
    pub fn should_send_segment(&self, log_len: u32, now: &Instant) -> bool {
        self.next_seq < log_len && (log_len > self.sent_len || self.resend_timer.ringing(now))
    }

    pub fn mark_segment_sent(&mut self, sent_len: u32, now: &Instant) {
        self.sent_len = self.sent_len.max(sent_len);
        self.resend_timer.reset(now);
    }

    /// Advance the acknowledged watermark; never moves backwards or past
    /// the end of the log
    pub fn process_ack(&mut self, watermark: EventSeq, log_len: u32) {
        self.next_seq = self.next_seq.max(watermark.min(log_len));
    }
}
