// SPDX-License-Identifier: Apache-2.0
//! Network Manager (spec.md §4.12): resolves a specification to feeds,
//! shares one subscriber per feed across callers, and reference-counts
//! releases.

use crate::bookmark::BookmarkStore;
use crate::error::NetError;
use crate::subscriber::Subscriber;
use crate::transport::Transport;
use factum_core::FactReference;
use factum_fork::Fork;
use factum_observable::ObservableSource;
use factum_query::Tuple;
use factum_spec::Specification;
use factum_storage::FactStorage;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Handle to a live subscription, returned by [`NetworkManager::subscribe`]
/// and consumed by [`NetworkManager::release`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionId(String);

struct Entry<T, F, St, B> {
    subscriber: Arc<Subscriber<T, F, St, B>>,
    ref_count: usize,
}

/// Resolves specifications to feeds (via `factum-feed`) and keeps one
/// [`Subscriber`] alive per distinct feed, shared across however many
/// callers asked for it.
pub struct NetworkManager<T, F, St, B> {
    transport: Arc<T>,
    fork: Arc<F>,
    store: Arc<St>,
    bookmarks: Arc<B>,
    observable: ObservableSource,
    refresh_interval: Duration,
    subscriptions: Mutex<HashMap<String, Entry<T, F, St, B>>>,
}

impl<T, F, St, B> NetworkManager<T, F, St, B>
where
    T: Transport + 'static,
    F: Fork + 'static,
    St: FactStorage + 'static,
    B: BookmarkStore + 'static,
{
    /// Build a manager over its collaborators. `refresh_interval` is
    /// passed through to each subscriber it creates.
    pub fn new(
        transport: Arc<T>,
        fork: Arc<F>,
        store: Arc<St>,
        bookmarks: Arc<B>,
        observable: ObservableSource,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            transport,
            fork,
            store,
            bookmarks,
            observable,
            refresh_interval,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// The feeds `specification` decomposes into (spec.md §4.6): the
    /// specification itself, plus one per top-level not-exists
    /// condition. Binding concrete starts for each — including feeds
    /// whose given is itself a result of the main feed — is the caller's
    /// responsibility.
    #[must_use]
    pub fn feeds_for(specification: &Specification) -> Vec<Specification> {
        factum_feed::decompose(specification)
    }

    /// Subscribe to `feed` bound at `starts`. If a subscriber for this
    /// exact (feed, starts) pair already exists, its reference count is
    /// bumped and no new stream is opened.
    pub async fn subscribe(&self, feed: &Specification, starts: &Tuple) -> Result<SubscriptionId, NetError> {
        let id = feed_key(feed, starts);
        let mut subscriptions = self.subscriptions.lock().await;
        if let Some(entry) = subscriptions.get_mut(&id) {
            entry.ref_count += 1;
            return Ok(SubscriptionId(id));
        }

        let subscriber = Arc::new(Subscriber::new(
            id.clone(),
            self.transport.clone(),
            self.fork.clone(),
            self.store.clone(),
            self.bookmarks.clone(),
            self.observable.clone(),
            self.refresh_interval,
        ));
        subscriber.start().await?;
        subscriptions.insert(id.clone(), Entry { subscriber, ref_count: 1 });
        Ok(SubscriptionId(id))
    }

    /// Release one reference to a subscription; the underlying stream
    /// stops once the last reference is released.
    pub async fn release(&self, id: SubscriptionId) {
        let mut subscriptions = self.subscriptions.lock().await;
        let Some(entry) = subscriptions.get_mut(&id.0) else { return };
        entry.ref_count -= 1;
        if entry.ref_count == 0 {
            entry.subscriber.stop();
            subscriptions.remove(&id.0);
        }
    }

    /// Number of distinct feeds currently subscribed, for observability.
    pub async fn active_count(&self) -> usize {
        self.subscriptions.lock().await.len()
    }
}

fn feed_key(feed: &Specification, starts: &Tuple) -> String {
    let skeleton = factum_feed::skeleton_of(feed);
    let mut entries: Vec<(&String, &FactReference)> = starts.iter().collect();
    entries.sort_by_key(|(label, _)| (*label).clone());
    let mut hasher = Sha256::new();
    hasher.update(format!("{skeleton:?}").as_bytes());
    for (label, reference) in entries {
        hasher.update(label.as_bytes());
        hasher.update(b"=");
        hasher.update(reference.to_string().as_bytes());
        hasher.update(b";");
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::MemoryBookmarkStore;
    use crate::transport::loopback::LoopbackTransport;
    use factum_core::FactRecord;
    use factum_fork::PassThroughFork;
    use factum_spec::Label;
    use factum_storage::MemoryStore;

    fn manager(
        transport: Arc<LoopbackTransport>,
    ) -> NetworkManager<LoopbackTransport, PassThroughFork<MemoryStore>, MemoryStore, MemoryBookmarkStore> {
        let store = Arc::new(MemoryStore::new());
        let fork = Arc::new(PassThroughFork::new(store.clone()));
        let bookmarks = Arc::new(MemoryBookmarkStore::new());
        NetworkManager::new(transport, fork, store, bookmarks, ObservableSource::new(), Duration::from_secs(90))
    }

    fn simple_feed() -> Specification {
        Specification {
            givens: vec![Label::new("p", "Project")],
            matches: vec![],
            projection: factum_spec::Projection::Label("p".into()),
        }
    }

    #[tokio::test]
    async fn subscribing_twice_to_the_same_feed_shares_one_stream() {
        let transport = Arc::new(LoopbackTransport::new());
        let manager = manager(transport.clone());
        let feed = simple_feed();
        let project = FactRecord::new("Project", vec![], vec![]);
        let mut starts = Tuple::new();
        starts.insert("p".to_string(), project.reference());

        let first = manager.subscribe(&feed, &starts).await.unwrap();
        let second = manager.subscribe(&feed, &starts).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.connect_calls(), 1);
        assert_eq!(manager.active_count().await, 1);
    }

    #[tokio::test]
    async fn releasing_the_last_reference_stops_the_stream() {
        let transport = Arc::new(LoopbackTransport::new());
        let manager = manager(transport.clone());
        let feed = simple_feed();
        let project = FactRecord::new("Project", vec![], vec![]);
        let mut starts = Tuple::new();
        starts.insert("p".to_string(), project.reference());

        let id = manager.subscribe(&feed, &starts).await.unwrap();
        manager.release(id).await;
        assert_eq!(manager.active_count().await, 0);
    }

    #[tokio::test]
    async fn distinct_starts_get_distinct_streams() {
        let transport = Arc::new(LoopbackTransport::new());
        let manager = manager(transport.clone());
        let feed = simple_feed();
        let project_a = FactRecord::new("Project", vec![], vec![]);
        let project_b = FactRecord::new("Project", vec![("n".into(), factum_core::FieldValue::Number(1.0))], vec![]);
        let mut starts_a = Tuple::new();
        starts_a.insert("p".to_string(), project_a.reference());
        let mut starts_b = Tuple::new();
        starts_b.insert("p".to_string(), project_b.reference());

        let id_a = manager.subscribe(&feed, &starts_a).await.unwrap();
        let id_b = manager.subscribe(&feed, &starts_b).await.unwrap();
        assert_ne!(id_a, id_b);
        assert_eq!(transport.connect_calls(), 2);
    }
}
