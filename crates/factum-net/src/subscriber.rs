// SPDX-License-Identifier: Apache-2.0
//! Per-feed subscriber (spec.md §4.12): holds a stream open against a
//! single feed, persisting and notifying on each response, reconnecting
//! with backoff and falling back to a periodic refresh timer.

use crate::bookmark::BookmarkStore;
use crate::error::NetError;
use crate::transport::{StreamEvent, StreamHandle, Transport};
use factum_core::{Envelope, FactReference};
use factum_fork::Fork;
use factum_observable::ObservableSource;
use factum_queue::Backoff;
use factum_storage::FactStorage;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tracing::{error, warn};

enum Disconnect {
    Stopped,
    Ended,
}

/// Keeps one feed's stream alive for the lifetime of the subscriber.
/// `start` resolves once the stream is first established; reconnection
/// after that happens in the background for as long as the subscriber
/// runs.
pub struct Subscriber<T, F, St, B> {
    feed_id: String,
    transport: Arc<T>,
    fork: Arc<F>,
    store: Arc<St>,
    bookmarks: Arc<B>,
    observable: ObservableSource,
    refresh_interval: Duration,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

impl<T, F, St, B> Subscriber<T, F, St, B>
where
    T: Transport + 'static,
    F: Fork + 'static,
    St: FactStorage + 'static,
    B: BookmarkStore + 'static,
{
    /// Build a subscriber for `feed_id`. `refresh_interval` is the
    /// fallback periodic retry once the immediate-retry budget is
    /// exhausted (spec.md §4.12 default: 90s).
    pub fn new(
        feed_id: impl Into<String>,
        transport: Arc<T>,
        fork: Arc<F>,
        store: Arc<St>,
        bookmarks: Arc<B>,
        observable: ObservableSource,
        refresh_interval: Duration,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            feed_id: feed_id.into(),
            transport,
            fork,
            store,
            bookmarks,
            observable,
            refresh_interval,
            stop_tx,
            stop_rx,
        }
    }

    /// The feed this subscriber serves.
    #[must_use]
    pub fn feed_id(&self) -> &str {
        &self.feed_id
    }

    /// Begin streaming. Resolves once the stream first establishes, or
    /// with [`NetError::Cancelled`] if `stop` is called first.
    pub async fn start(&self) -> Result<(), NetError> {
        let (established_tx, established_rx) = oneshot::channel();
        self.spawn_run_loop(established_tx);
        established_rx.await.unwrap_or(Err(NetError::Cancelled))
    }

    /// Tear down the stream, clear pending retries, and fail any
    /// in-flight `start()`.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    fn spawn_run_loop(&self, established_tx: oneshot::Sender<Result<(), NetError>>) {
        let transport = self.transport.clone();
        let fork = self.fork.clone();
        let store = self.store.clone();
        let bookmarks = self.bookmarks.clone();
        let observable = self.observable.clone();
        let feed_id = self.feed_id.clone();
        let refresh_interval = self.refresh_interval;
        let mut stop_rx = self.stop_rx.clone();

        tokio::spawn(async move {
            let mut established_tx = Some(established_tx);
            let mut backoff = Backoff::new();
            loop {
                if *stop_rx.borrow() {
                    if let Some(tx) = established_tx.take() {
                        let _ = tx.send(Err(NetError::Cancelled));
                    }
                    return;
                }

                let bookmark = bookmarks.bookmark(&feed_id).await;
                match transport.stream_feed(feed_id.clone(), bookmark).await {
                    Ok(mut handle) => {
                        backoff.reset();
                        if let Some(tx) = established_tx.take() {
                            let _ = tx.send(Ok(()));
                        }
                        let reason =
                            consume(&mut handle, &fork, &store, &bookmarks, &observable, &feed_id, &mut stop_rx).await;
                        handle.dispose();
                        if matches!(reason, Disconnect::Stopped) {
                            return;
                        }
                    }
                    Err(err) => {
                        warn!(?err, feed_id = %feed_id, "stream establishment failed");
                    }
                }

                let delay = backoff.next_delay().unwrap_or(refresh_interval);
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    _ = stop_rx.changed() => {
                        if let Some(tx) = established_tx.take() {
                            let _ = tx.send(Err(NetError::Cancelled));
                        }
                        return;
                    }
                }
            }
        });
    }
}

async fn consume<F: Fork, St: FactStorage, B: BookmarkStore>(
    handle: &mut StreamHandle,
    fork: &Arc<F>,
    store: &Arc<St>,
    bookmarks: &Arc<B>,
    observable: &ObservableSource,
    feed_id: &str,
    stop_rx: &mut watch::Receiver<bool>,
) -> Disconnect {
    loop {
        tokio::select! {
            _ = stop_rx.changed() => return Disconnect::Stopped,
            event = handle.events.recv() => {
                match event {
                    Some(StreamEvent::Response { references, bookmark }) => {
                        if let Err(err) = apply_response(fork, store, bookmarks, observable, feed_id, references, bookmark).await {
                            error!(?err, feed_id = %feed_id, "failed to apply stream response");
                        }
                    }
                    Some(StreamEvent::Error(err)) => {
                        warn!(?err, feed_id = %feed_id, "stream reported an error; reconnecting");
                        return Disconnect::Ended;
                    }
                    None => return Disconnect::Ended,
                }
            }
        }
    }
}

async fn apply_response<F: Fork, St: FactStorage, B: BookmarkStore>(
    fork: &Arc<F>,
    store: &Arc<St>,
    bookmarks: &Arc<B>,
    observable: &ObservableSource,
    feed_id: &str,
    references: Vec<FactReference>,
    bookmark: String,
) -> Result<(), NetError> {
    let known: HashSet<FactReference> = store.which_exist(&references).await?.into_iter().collect();
    let loaded = fork.load(&references).await?;
    let fresh: Vec<Envelope> = loaded.into_iter().filter(|e| !known.contains(&e.fact.reference())).collect();
    bookmarks.set_bookmark(feed_id, bookmark).await;
    observable.notify(store.as_ref(), &fresh).await;
    Ok(())
}
