// SPDX-License-Identifier: Apache-2.0
//! Bounded in-memory coalescing layer: batches small bursts of
//! `submit` calls for a configurable quiet period before flushing into
//! the underlying queue (spec.md §4.10).

use crate::queue::OutboundQueue;
use factum_core::Envelope;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

struct Buffer {
    envelopes: Vec<Envelope>,
    generation: u64,
}

/// Wraps an [`OutboundQueue`], delaying each `submit` by `delay` so that
/// envelopes arriving in a burst flush to the underlying queue as one
/// batch rather than one `enqueue` call apiece.
///
/// Each `submit` bumps a generation counter and (re)schedules a flush
/// `delay` later; only the flush that still sees its own generation as
/// current actually drains the buffer, so a burst of submits collapses
/// to a single flush.
pub struct CoalescingQueue<Q> {
    inner: Arc<Q>,
    buffer: Arc<Mutex<Buffer>>,
    delay: Duration,
}

impl<Q: OutboundQueue + 'static> CoalescingQueue<Q> {
    /// Wrap `inner`, flushing `delay` after the last `submit` in a
    /// burst.
    pub fn new(inner: Arc<Q>, delay: Duration) -> Self {
        Self {
            inner,
            buffer: Arc::new(Mutex::new(Buffer { envelopes: Vec::new(), generation: 0 })),
            delay,
        }
    }

    /// Buffer `envelopes`, scheduling a flush `delay` from now. A submit
    /// arriving before the previous schedule fires extends the wait.
    pub async fn submit(&self, envelopes: Vec<Envelope>) {
        let generation = {
            let mut buffer = self.buffer.lock().await;
            buffer.envelopes.extend(envelopes);
            buffer.generation += 1;
            buffer.generation
        };

        let buffer = Arc::clone(&self.buffer);
        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut buffer = buffer.lock().await;
            if buffer.generation != generation {
                return;
            }
            let pending = std::mem::take(&mut buffer.envelopes);
            drop(buffer);
            if !pending.is_empty() {
                inner.enqueue(pending).await;
            }
        });
    }

    /// Flush whatever is currently buffered immediately, bypassing the
    /// delay. Used at shutdown so nothing is lost to a pending timer.
    pub async fn flush_now(&self) {
        let mut buffer = self.buffer.lock().await;
        buffer.generation += 1;
        let pending = std::mem::take(&mut buffer.envelopes);
        drop(buffer);
        if !pending.is_empty() {
            self.inner.enqueue(pending).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::MemoryQueue;
    use factum_core::FactRecord;

    fn envelope(fact_type: &str) -> Envelope {
        Envelope { fact: FactRecord::new(fact_type, vec![], vec![]), signatures: vec![] }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_submits_coalesces_into_one_enqueue() {
        let inner = Arc::new(MemoryQueue::new());
        let coalescer = CoalescingQueue::new(inner.clone(), Duration::from_millis(50));

        coalescer.submit(vec![envelope("A")]).await;
        tokio::time::advance(Duration::from_millis(10)).await;
        coalescer.submit(vec![envelope("B")]).await;
        tokio::time::advance(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;

        assert_eq!(inner.len().await, 2);
    }

    #[tokio::test]
    async fn flush_now_bypasses_the_delay() {
        let inner = Arc::new(MemoryQueue::new());
        let coalescer = CoalescingQueue::new(inner.clone(), Duration::from_secs(60));
        coalescer.submit(vec![envelope("A")]).await;
        coalescer.flush_now().await;
        assert_eq!(inner.len().await, 1);
    }
}
