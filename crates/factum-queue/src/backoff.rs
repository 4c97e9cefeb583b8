// SPDX-License-Identifier: Apache-2.0
//! Exponential backoff schedule for the outbound saver (spec.md §4.10):
//! 1s, 2s, 4s, ... doubling, capped at 60s, for a bounded number of
//! immediate retries before the caller defers to a periodic timer.

use std::time::Duration;

const CAP: Duration = Duration::from_secs(60);
const MAX_IMMEDIATE_RETRIES: u32 = 6;

/// Tracks retry attempts for a single in-progress send. `next_delay`
/// returns `None` once the immediate-retry budget is exhausted; the
/// caller is expected to fall back to a periodic timer at that point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Backoff {
    attempt: u32,
}

impl Backoff {
    /// A fresh schedule, starting at attempt zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The delay before the next immediate retry, or `None` if the
    /// immediate-retry budget (six attempts) is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= MAX_IMMEDIATE_RETRIES {
            return None;
        }
        let secs = 1u64.checked_shl(self.attempt).unwrap_or(u64::MAX);
        self.attempt += 1;
        Some(Duration::from_secs(secs).min(CAP))
    }

    /// Reset the schedule after a successful send.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_doubles_and_caps_at_sixty_seconds() {
        let mut backoff = Backoff::new();
        let delays: Vec<Duration> = std::iter::from_fn(|| backoff.next_delay()).collect();
        assert_eq!(
            delays,
            vec![1, 2, 4, 8, 16, 32].into_iter().map(Duration::from_secs).collect::<Vec<_>>()
        );
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn reset_restarts_the_schedule() {
        let mut backoff = Backoff::new();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(1)));
    }
}
