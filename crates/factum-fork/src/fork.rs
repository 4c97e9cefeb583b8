// SPDX-License-Identifier: Apache-2.0
//! The `Fork` capability set (spec.md §4.11): save, load, start/stop
//! subscription, implemented three ways.

use crate::error::ForkError;
use async_trait::async_trait;
use factum_core::{Envelope, FactReference};

/// Polymorphic replication surface. `PassThrough`, `Transient`, and
/// `Persistent` each implement this over the same capability set.
#[async_trait]
pub trait Fork: Send + Sync {
    /// Persist `envelopes`, replicating outward per mode.
    async fn save(&self, envelopes: Vec<Envelope>) -> Result<Vec<Envelope>, ForkError>;

    /// The union of locally known envelopes and any the mode fetches
    /// from a remote to fill gaps.
    async fn load(&self, references: &[FactReference]) -> Result<Vec<Envelope>, ForkError>;

    /// Begin remote replication, if the mode has one.
    async fn start(&self) -> Result<(), ForkError>;

    /// Stop remote replication, if the mode has one.
    async fn stop(&self);
}
