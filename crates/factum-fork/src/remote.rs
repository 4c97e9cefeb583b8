// SPDX-License-Identifier: Apache-2.0
//! Remote-fetch and subscription ports. `factum-fork` composes local
//! storage with these without depending on transport details; a network
//! crate supplies the concrete implementations.

use crate::error::{FetchError, SubscriptionError};
use async_trait::async_trait;
use factum_core::{Envelope, FactReference};

/// Fills local load gaps from the remote peer.
#[async_trait]
pub trait RemoteFetch: Send + Sync {
    /// Fetch whatever the remote holds for `references`. Facts the
    /// remote doesn't have are simply absent from the result, not an
    /// error.
    async fn fetch(&self, references: &[FactReference]) -> Result<Vec<Envelope>, FetchError>;
}

/// Starts and stops a feed's remote subscription.
#[async_trait]
pub trait Subscription: Send + Sync {
    /// Begin streaming from the remote into local storage.
    async fn start(&self) -> Result<(), SubscriptionError>;
    /// Stop streaming and release any associated transport handle.
    async fn stop(&self);
}
