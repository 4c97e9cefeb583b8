// SPDX-License-Identifier: Apache-2.0
//! `Transient` mode: local store plus a remote, with outbound envelopes
//! queued (not blocked on) and load gaps filled on demand.

use crate::error::ForkError;
use crate::fork::Fork;
use crate::remote::{RemoteFetch, Subscription};
use async_trait::async_trait;
use factum_core::{Envelope, FactReference};
use factum_queue::OutboundQueue;
use factum_storage::FactStorage;
use std::collections::HashMap;
use std::sync::Arc;

/// Local store + remote. `save` writes locally then enqueues for
/// outbound delivery (never blocking on the transport); `load` fills
/// gaps from the remote, persisting what it fetches before returning.
pub struct TransientFork<St, R, Sub, Q> {
    store: Arc<St>,
    remote: Arc<R>,
    subscription: Arc<Sub>,
    queue: Arc<Q>,
}

impl<St: FactStorage, R: RemoteFetch, Sub: Subscription, Q: OutboundQueue> TransientFork<St, R, Sub, Q> {
    /// Compose a transient fork from its four collaborators.
    pub fn new(store: Arc<St>, remote: Arc<R>, subscription: Arc<Sub>, queue: Arc<Q>) -> Self {
        Self { store, remote, subscription, queue }
    }
}

#[async_trait]
impl<St: FactStorage, R: RemoteFetch, Sub: Subscription, Q: OutboundQueue> Fork
    for TransientFork<St, R, Sub, Q>
{
    async fn save(&self, envelopes: Vec<Envelope>) -> Result<Vec<Envelope>, ForkError> {
        let saved = self.store.save(envelopes).await?;
        self.queue.enqueue(saved.clone()).await;
        Ok(saved)
    }

    async fn load(&self, references: &[FactReference]) -> Result<Vec<Envelope>, ForkError> {
        let mut local = self.store.load(references).await?;
        let known: std::collections::HashSet<FactReference> =
            local.iter().map(|e| e.fact.reference()).collect();
        let missing: Vec<FactReference> =
            references.iter().filter(|r| !known.contains(*r)).cloned().collect();
        if missing.is_empty() {
            return Ok(local);
        }

        let fetched = self.remote.fetch(&missing).await?;
        let records = fetched.iter().map(|e| e.fact.clone()).collect();
        let ordered_records = factum_topo::sort(records)?;
        let by_reference: HashMap<FactReference, Envelope> =
            fetched.into_iter().map(|e| (e.fact.reference(), e)).collect();
        let ordered_envelopes: Vec<Envelope> = ordered_records
            .into_iter()
            .filter_map(|r| by_reference.get(&r.reference()).cloned())
            .collect();

        self.store.save(ordered_envelopes.clone()).await?;
        local.extend(ordered_envelopes);
        Ok(local)
    }

    async fn start(&self) -> Result<(), ForkError> {
        Ok(self.subscription.start().await?)
    }

    async fn stop(&self) {
        self.subscription.stop().await;
    }
}
