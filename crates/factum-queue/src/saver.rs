// SPDX-License-Identifier: Apache-2.0
//! Drains the outbound queue into a transport, retrying on failure
//! (spec.md §4.10).

use crate::backoff::Backoff;
use crate::queue::OutboundQueue;
use crate::sink::OutboundSink;
use std::sync::Arc;
use tracing::warn;

/// Outcome of one [`Saver::drain_once`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// The queue was empty; nothing to send.
    Empty,
    /// Every queued envelope was sent and dequeued.
    Sent {
        /// Number of envelopes sent.
        count: usize,
    },
    /// Every immediate retry was exhausted without success. The caller
    /// should fall back to a periodic timer before calling again.
    Deferred,
}

/// Drains an [`OutboundQueue`] into an [`OutboundSink`], retrying failed
/// sends with an exponential backoff before deferring to the caller's
/// own periodic schedule.
pub struct Saver<Q, S> {
    queue: Arc<Q>,
    sink: Arc<S>,
}

impl<Q: OutboundQueue, S: OutboundSink> Saver<Q, S> {
    /// Build a saver draining `queue` into `sink`.
    pub fn new(queue: Arc<Q>, sink: Arc<S>) -> Self {
        Self { queue, sink }
    }

    /// Attempt one full drain cycle: peek the queue, send, and on
    /// success dequeue exactly what was sent. On failure, retry with
    /// backoff up to the immediate-retry budget before returning
    /// [`DrainOutcome::Deferred`].
    pub async fn drain_once(&self) -> DrainOutcome {
        let envelopes = self.queue.peek().await;
        if envelopes.is_empty() {
            return DrainOutcome::Empty;
        }

        let mut backoff = Backoff::new();
        loop {
            match self.sink.send(&envelopes).await {
                Ok(()) => {
                    self.queue.dequeue(&envelopes).await;
                    return DrainOutcome::Sent { count: envelopes.len() };
                }
                Err(err) => {
                    let Some(delay) = backoff.next_delay() else {
                        warn!(?err, "immediate retry budget exhausted, deferring");
                        return DrainOutcome::Deferred;
                    };
                    warn!(?err, delay_secs = delay.as_secs(), "send failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
