use log::trace;

use crate::{
    messages::ping::{Ping, Pong},
    Instant,
};

/// Round-trip and clock-skew estimates for one peer, refined from Ping/Pong
/// exchanges with an exponential moving average.
///
/// Skew is the remote clock minus the local clock, in milliseconds: a
/// remote timestamp `t` corresponds to local time `t - skew`.
pub struct ClockSync {
    smoothing: f64,
    next_seq: u32,
    outstanding: Option<(u32, Instant)>,
    skew_estimate: Option<f64>,
    ping_estimate: Option<f64>,
}

impl ClockSync {
    pub fn new(smoothing: f64) -> Self {
        Self {
            smoothing,
            next_seq: 0,
            outstanding: None,
            skew_estimate: None,
            ping_estimate: None,
        }
    }

    /// Build the next Ping. Any Ping still unanswered is superseded.
    pub fn next_ping(&mut self, now: &Instant) -> Ping {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.outstanding = Some((seq, *now));
        Ping { seq }
    }

    /// Answer a Ping from the remote side with our local time
    pub fn answer_ping(ping: &Ping, now: &Instant) -> Pong {
        Pong {
            seq: ping.seq,
            remote_time: now.to_wire(),
        }
    }

    /// Fold in a Pong. Only the answer to the most recent Ping counts;
    /// returns whether the estimates moved.
    pub fn process_pong(&mut self, pong: &Pong, now: &Instant) -> bool {
        let Some((seq, sent)) = self.outstanding else {
            return false;
        };
        if seq != pong.seq {
            return false;
        }
        self.outstanding = None;

        let rtt = sent.elapsed_millis(now);
        let one_way = rtt / 2.0;
        let skew = f64::from(pong.remote_time) - (sent.as_millis() + one_way);

        self.skew_estimate = Some(self.blend(self.skew_estimate, skew));
        self.ping_estimate = Some(self.blend(self.ping_estimate, one_way));
        trace!(
            "pong {}: rtt {:.1}ms, skew {:.1}ms, estimates skew {:.1}ms one-way {:.1}ms",
            seq,
            rtt,
            skew,
            self.skew_estimate(),
            self.ping_estimate()
        );
        true
    }

    // The first sample seeds the estimate instead of blending against zero
    fn blend(&self, estimate: Option<f64>, sample: f64) -> f64 {
        match estimate {
            None => sample,
            Some(previous) => self.smoothing * previous + (1.0 - self.smoothing) * sample,
        }
    }

    /// Estimated remote-minus-local clock offset in ms, 0 before any sample
    pub fn skew_estimate(&self) -> f64 {
        self.skew_estimate.unwrap_or(0.0)
    }

    /// Estimated one-way latency in ms, 0 before any sample
    pub fn ping_estimate(&self) -> f64 {
        self.ping_estimate.unwrap_or(0.0)
    }

    pub fn has_sample(&self) -> bool {
        self.skew_estimate.is_some()
    }
}
