//! Outbound force throttling

use crate::core_types::Newtons;
use std::time::{Duration, Instant};

/// Decides when a new force command is worth sending
///
/// A command goes out when the force moved by more than `threshold` since the
/// last send, or when more than `interval` has elapsed (keep-alive). The first
/// command is always sent.
#[derive(Debug, Clone)]
pub struct ForceRateLimiter {
    threshold: Newtons,
    interval: Duration,
    last: Option<(Newtons, Instant)>,
}

impl ForceRateLimiter {
    pub fn new(threshold: Newtons, interval: Duration) -> Self {
        Self {
            threshold: threshold.abs(),
            interval,
            last: None,
        }
    }

    pub fn should_send(&self, force: Newtons, now: Instant) -> bool {
        match self.last {
            None => true,
            Some((sent, at)) => {
                (force - sent).abs() > self.threshold || now.saturating_duration_since(at) > self.interval
            }
        }
    }

    /// Remember a command that was actually written
    pub fn record(&mut self, force: Newtons, now: Instant) {
        self.last = Some((force, now));
    }

    /// Forget history so the next command is sent unconditionally
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last_sent(&self) -> Option<Newtons> {
        self.last.map(|(force, _)| force)
    }
}
