use std::{sync::OnceLock, time::Instant as StdInstant};

static EPOCH: OnceLock<StdInstant> = OnceLock::new();

/// A point in local time, measured in milliseconds since a process-wide
/// epoch. Wire timestamps are the `f32` projection of this value.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Instant {
    millis: f64,
}

impl Instant {
    /// Read the monotonic clock
    pub fn now() -> Self {
        let epoch = EPOCH.get_or_init(StdInstant::now);
        Self {
            millis: epoch.elapsed().as_secs_f64() * 1000.0,
        }
    }

    pub fn from_millis(millis: f64) -> Self {
        Self { millis }
    }

    pub fn as_millis(&self) -> f64 {
        self.millis
    }

    pub fn to_wire(&self) -> f32 {
        self.millis as f32
    }

    /// Milliseconds from `self` to `now`, zero if `now` is earlier
    pub fn elapsed_millis(&self, now: &Instant) -> f64 {
        (now.millis - self.millis).max(0.0)
    }

    pub fn add_millis(&self, millis: f64) -> Self {
        Self {
            millis: self.millis + millis,
        }
    }
}
