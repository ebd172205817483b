use std::time::Duration;

use super::Instant;

/// A Timer with a given duration after which it will enter into a "Ringing"
/// state. Unlike a wall-clock timer it is driven by the `now` handed to each
/// tick, and a Timer that was never reset rings immediately.
#[derive(Clone, Debug)]
pub struct Timer {
    duration_millis: f64,
    last: Option<Instant>,
}

impl Timer {
    /// Creates a new Timer with a given Duration
    pub fn new(duration: Duration) -> Self {
        Self {
            duration_millis: duration.as_secs_f64() * 1000.0,
            last: None,
        }
    }

    /// Reset the Timer to stop ringing and wait till 'Duration' has elapsed
    /// again
    pub fn reset(&mut self, now: &Instant) {
        self.last = Some(*now);
    }

    /// Gets whether or not the Timer is "Ringing" (i.e. the given Duration has
    /// elapsed since the last "reset")
    pub fn ringing(&self, now: &Instant) -> bool {
        match &self.last {
            None => true,
            Some(last) => last.elapsed_millis(now) >= self.duration_millis,
        }
    }

    /// Manually causes the Timer to enter into a "Ringing" state
    pub fn ring_manual(&mut self) {
        self.last = None;
    }
}
