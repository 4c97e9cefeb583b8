// SPDX-License-Identifier: Apache-2.0
//! Fork errors.

use factum_core::InvalidGraphError;
use factum_storage::StorageError;
use thiserror::Error;

/// A remote fetch attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote fetch failed: {0}")]
pub struct FetchError(pub String);

/// A subscription start attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subscription failed: {0}")]
pub struct SubscriptionError(pub String);

/// Failure modes across the three fork modes.
#[derive(Debug, Error)]
pub enum ForkError {
    /// A local storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    /// Fetched envelopes could not be topologically ordered.
    #[error("invalid graph from remote: {0}")]
    InvalidGraph(#[from] InvalidGraphError),
    /// Fetching gap-filling facts from the remote failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Starting the subscription failed.
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
}
