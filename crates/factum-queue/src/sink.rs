// SPDX-License-Identifier: Apache-2.0
//! The saver's sole external collaborator: something envelopes can be
//! sent to. A concrete network transport (`factum-net`) implements this;
//! the queue crate never depends on transport details.

use crate::error::SendError;
use async_trait::async_trait;
use factum_core::Envelope;

/// A destination the saver drains the outbound queue into.
#[async_trait]
pub trait OutboundSink: Send + Sync {
    /// Attempt to deliver `envelopes`. An `Err` means none were
    /// acknowledged and the saver should retry the whole batch.
    async fn send(&self, envelopes: &[Envelope]) -> Result<(), SendError>;
}
