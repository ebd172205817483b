use std::time::Duration;

use meshsync_serde::MAX_MESSAGE_BYTES;

/// Contains config properties which will be shared by every peer session
#[derive(Clone, Debug)]
pub struct ReplicationConfig {
    /// Interval between Ping messages sent to every connected peer
    pub ping_interval: Duration,
    /// Weight given to the previous estimate when blending a new clock
    /// sample, in `[0, 1)`
    pub clock_smoothing: f64,
    /// Priority added each tick to an entity the peer does not know yet
    pub first_sync_priority: f32,
    /// Priority added each tick to an entity the peer already knows
    pub keep_fresh_priority: f32,
    /// Hard cap on every encoded message, tag byte included
    pub max_message_bytes: usize,
    /// How long an unacknowledged event batch waits before being resent
    pub event_resend_interval: Duration,
    /// How long an event or update may wait on an entity that is not known
    /// locally before the situation is treated as lost sync
    pub max_deferral: Duration,
}

impl ReplicationConfig {
    pub fn event_resend_interval_millis(&self) -> f64 {
        self.event_resend_interval.as_secs_f64() * 1000.0
    }

    pub fn max_deferral_millis(&self) -> f64 {
        self.max_deferral.as_secs_f64() * 1000.0
    }
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(1),
            clock_smoothing: 0.5,
            first_sync_priority: 1000.0,
            keep_fresh_priority: 1.0,
            max_message_bytes: MAX_MESSAGE_BYTES,
            event_resend_interval: Duration::from_millis(250),
            max_deferral: Duration::from_secs(5),
        }
    }
}
