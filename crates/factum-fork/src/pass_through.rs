// SPDX-License-Identifier: Apache-2.0
//! `PassThrough` mode: local store only, no replication.

use crate::error::ForkError;
use crate::fork::Fork;
use async_trait::async_trait;
use factum_core::{Envelope, FactReference};
use factum_storage::FactStorage;
use std::sync::Arc;

/// Local store only. `save` and `load` hit `store` directly;
/// `start`/`stop` are no-ops.
pub struct PassThroughFork<St> {
    store: Arc<St>,
}

impl<St: FactStorage> PassThroughFork<St> {
    /// Wrap `store` with no replication.
    pub fn new(store: Arc<St>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<St: FactStorage> Fork for PassThroughFork<St> {
    async fn save(&self, envelopes: Vec<Envelope>) -> Result<Vec<Envelope>, ForkError> {
        Ok(self.store.save(envelopes).await?)
    }

    async fn load(&self, references: &[FactReference]) -> Result<Vec<Envelope>, ForkError> {
        Ok(self.store.load(references).await?)
    }

    async fn start(&self) -> Result<(), ForkError> {
        Ok(())
    }

    async fn stop(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use factum_core::FactRecord;
    use factum_storage::MemoryStore;

    #[tokio::test]
    async fn save_then_load_round_trips_locally() {
        let fork = PassThroughFork::new(Arc::new(MemoryStore::new()));
        let fact = FactRecord::new("A", vec![], vec![]);
        let reference = fact.reference();
        fork.save(vec![Envelope { fact, signatures: vec![] }]).await.unwrap();
        let loaded = fork.load(&[reference]).await.unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[tokio::test]
    async fn start_and_stop_are_no_ops() {
        let fork = PassThroughFork::new(Arc::new(MemoryStore::new()));
        fork.start().await.unwrap();
        fork.stop().await;
    }
}
