// SPDX-License-Identifier: Apache-2.0
//! Durable FIFO of envelopes awaiting remote acknowledgment (spec.md
//! §4.10). `enqueue`, `peek`, `dequeue` are each atomic.

use async_trait::async_trait;
use factum_core::Envelope;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Outbound durability port. A concrete backend persists across restart;
/// [`MemoryQueue`] is the in-process reference implementation.
#[async_trait]
pub trait OutboundQueue: Send + Sync {
    /// Append `envelopes` to the tail of the queue. Envelopes already
    /// present (by reference) are not duplicated.
    async fn enqueue(&self, envelopes: Vec<Envelope>);

    /// A snapshot of every envelope currently queued, in FIFO order.
    async fn peek(&self) -> Vec<Envelope>;

    /// Remove exactly `envelopes` (matched by reference) from the head of
    /// the queue. Envelopes not present are ignored.
    async fn dequeue(&self, envelopes: &[Envelope]);

    /// Number of envelopes currently queued.
    async fn len(&self) -> usize;

    /// `true` iff the queue holds nothing.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// In-process FIFO backed by a mutex-guarded deque. Durability across
/// restart is a backend concern left to a real implementation (e.g. a
/// write-ahead file or database table); this one resets on process
/// start, matching `factum_storage::MemoryStore`'s scope.
#[derive(Default)]
pub struct MemoryQueue {
    inner: Mutex<VecDeque<Envelope>>,
}

impl MemoryQueue {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OutboundQueue for MemoryQueue {
    async fn enqueue(&self, envelopes: Vec<Envelope>) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for envelope in envelopes {
            let reference = envelope.fact.reference();
            if inner.iter().any(|e| e.fact.reference() == reference) {
                continue;
            }
            inner.push_back(envelope);
        }
    }

    async fn peek(&self) -> Vec<Envelope> {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.iter().cloned().collect()
    }

    async fn dequeue(&self, envelopes: &[Envelope]) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let references: Vec<_> = envelopes.iter().map(|e| e.fact.reference()).collect();
        inner.retain(|e| !references.contains(&e.fact.reference()));
    }

    async fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.len()
    }
}
