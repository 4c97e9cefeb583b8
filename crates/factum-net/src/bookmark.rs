// SPDX-License-Identifier: Apache-2.0
//! Bookmark storage port (spec.md §4.12): "local metadata" recording
//! each feed's resume cursor. Kept local to this crate, parallel to how
//! `factum-fork` defines its own `RemoteFetch`/`Subscription` ports
//! rather than growing `factum-storage`'s contract.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Per-feed bookmark storage. An empty bookmark means "from the
/// beginning" (spec.md §6's feed-cursor contract).
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// The last bookmark recorded for `feed_id`, or `""` if none.
    async fn bookmark(&self, feed_id: &str) -> String;

    /// Record `bookmark` as the resume cursor for `feed_id`.
    async fn set_bookmark(&self, feed_id: &str, bookmark: String);
}

/// In-memory [`BookmarkStore`], the reference implementation.
#[derive(Debug, Default)]
pub struct MemoryBookmarkStore {
    bookmarks: Mutex<HashMap<String, String>>,
}

impl MemoryBookmarkStore {
    /// An empty bookmark store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookmarkStore for MemoryBookmarkStore {
    async fn bookmark(&self, feed_id: &str) -> String {
        self.bookmarks.lock().await.get(feed_id).cloned().unwrap_or_default()
    }

    async fn set_bookmark(&self, feed_id: &str, bookmark: String) {
        self.bookmarks.lock().await.insert(feed_id.to_string(), bookmark);
    }
}
