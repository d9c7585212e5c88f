//! Delay applied before a relogin attempt.

use rand::Rng;
use std::time::Duration;

/// Bounded exponential backoff with random jitter.
///
/// Each disconnect or error still leads to exactly one relogin attempt; the
/// policy only decides how long to wait before making it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: Duration,
}

impl ReconnectPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration, jitter: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
            jitter,
        }
    }

    /// Relogin without waiting.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Deterministic part of the delay after `failures` consecutive failed
    /// relogins.
    pub fn backoff(&self, failures: u32) -> Duration {
        let factor = 1u32 << failures.min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Full delay including jitter.
    pub fn delay(&self, failures: u32) -> Duration {
        let backoff = self.backoff(failures);
        if self.jitter.is_zero() || backoff.is_zero() {
            return backoff;
        }

        let jitter_ms = self.jitter.as_millis().min(u64::MAX as u128) as u64;
        let extra = rand::thread_rng().gen_range(0..=jitter_ms);
        backoff + Duration::from_millis(extra)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(1),
            Duration::from_secs(60),
            Duration::from_millis(500),
        )
    }
}
