// SPDX-License-Identifier: Apache-2.0
//! `Persistent` mode: as `Transient`, but the outbound queue survives
//! restart and is drained before any new saves are accepted.

use crate::error::ForkError;
use crate::fork::Fork;
use crate::remote::{RemoteFetch, Subscription};
use crate::transient::TransientFork;
use async_trait::async_trait;
use factum_core::{Envelope, FactReference};
use factum_queue::{DrainOutcome, OutboundQueue, OutboundSink, Saver};
use factum_storage::FactStorage;
use std::sync::Arc;

/// `Transient` plus a saver that drains the durable queue to completion
/// on `start`, before the mode accepts new writes.
pub struct PersistentFork<St, R, Sub, Q, Sink> {
    inner: TransientFork<St, R, Sub, Q>,
    saver: Saver<Q, Sink>,
}

impl<St, R, Sub, Q, Sink> PersistentFork<St, R, Sub, Q, Sink>
where
    St: FactStorage,
    R: RemoteFetch,
    Sub: Subscription,
    Q: OutboundQueue,
    Sink: OutboundSink,
{
    /// Compose a persistent fork. `queue` is expected to be backed by
    /// durable storage surviving process restart; this crate only
    /// requires it to implement [`OutboundQueue`].
    pub fn new(store: Arc<St>, remote: Arc<R>, subscription: Arc<Sub>, queue: Arc<Q>, sink: Arc<Sink>) -> Self {
        let saver = Saver::new(queue.clone(), sink);
        Self { inner: TransientFork::new(store, remote, subscription, queue), saver }
    }

    /// Drain the durable queue to completion: keep calling the saver
    /// until it reports the queue empty or defers after exhausting its
    /// immediate-retry budget.
    async fn drain_queue(&self) {
        loop {
            match self.saver.drain_once().await {
                DrainOutcome::Sent { .. } => continue,
                DrainOutcome::Empty | DrainOutcome::Deferred => break,
            }
        }
    }
}

#[async_trait]
impl<St, R, Sub, Q, Sink> Fork for PersistentFork<St, R, Sub, Q, Sink>
where
    St: FactStorage,
    R: RemoteFetch,
    Sub: Subscription,
    Q: OutboundQueue,
    Sink: OutboundSink,
{
    async fn save(&self, envelopes: Vec<Envelope>) -> Result<Vec<Envelope>, ForkError> {
        self.inner.save(envelopes).await
    }

    async fn load(&self, references: &[FactReference]) -> Result<Vec<Envelope>, ForkError> {
        self.inner.load(references).await
    }

    async fn start(&self) -> Result<(), ForkError> {
        self.drain_queue().await;
        self.inner.start().await
    }

    async fn stop(&self) {
        self.inner.stop().await;
    }
}
