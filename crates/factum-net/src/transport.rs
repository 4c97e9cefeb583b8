// SPDX-License-Identifier: Apache-2.0
//! The `Transport` port (spec.md §4.12): the sole collaborator a
//! `Subscriber` needs for the remote side of replication. Mirrors
//! `factum-fork`'s `RemoteFetch`/`Subscription` split in spirit, but
//! scoped to streaming feed responses rather than one-shot fetches.

use crate::error::TransportError;
use async_trait::async_trait;
use factum_core::{Envelope, FactReference};
use tokio::sync::mpsc;

/// One event arriving on an open feed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A batch of references plus the bookmark to resume after them.
    Response {
        /// References the remote reports as members of this feed as of
        /// `bookmark`.
        references: Vec<FactReference>,
        /// Opaque cursor superseding the one this response was requested
        /// with.
        bookmark: String,
    },
    /// The remote reported an error on this subscription.
    Error(TransportError),
}

/// A live feed stream: the event channel plus the means to tear it down.
pub struct StreamHandle {
    /// Events as they arrive. Closes when the remote ends the stream.
    pub events: mpsc::Receiver<StreamEvent>,
    disposer: Option<Box<dyn FnMut() + Send>>,
}

impl StreamHandle {
    /// Build a handle from an event channel and a disposer invoked at
    /// most once.
    pub fn new(events: mpsc::Receiver<StreamEvent>, disposer: impl FnMut() + Send + 'static) -> Self {
        Self { events, disposer: Some(Box::new(disposer)) }
    }

    /// Tear down the underlying stream. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(mut disposer) = self.disposer.take() {
            disposer();
        }
    }
}

/// The remote peer, as seen from the replication layer: saving outbound
/// envelopes (the `OutboundSink` a `Saver` drains into, reused here so a
/// single transport implementation satisfies both) and opening feed
/// streams.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open (or resume) a stream for `feed_id` starting after
    /// `bookmark`. An empty bookmark means from the beginning.
    async fn stream_feed(&self, feed_id: String, bookmark: String) -> Result<StreamHandle, TransportError>;
}
