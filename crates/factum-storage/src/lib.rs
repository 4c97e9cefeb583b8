// SPDX-License-Identifier: Apache-2.0
//! Storage port for the fact graph, plus an in-memory reference
//! implementation.
//!
//! The contract is split in two traits: [`Snapshot`] is the low-level,
//! index-shaped read surface the query evaluator (`factum-query`) walks
//! (direct predecessor lookup, inverse successor lookup); [`FactStorage`]
//! is the durable-set contract described in spec.md §4.3 (save,
//! which_exist, load, purge, mru-date bookkeeping). A concrete backend
//! implements both.
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

mod error;
mod memory;

pub use error::StorageError;
pub use memory::MemoryStore;

use async_trait::async_trait;
use factum_core::{Envelope, FactReference};

/// Unix-epoch milliseconds. Opaque beyond ordering; callers compare, they
/// don't parse.
pub type Timestamp = i64;

/// Low-level, suspendable read surface over a consistent store snapshot.
/// `factum-query` walks these to evaluate specifications; it never
/// touches a backend's storage details directly.
#[async_trait]
pub trait Snapshot: Send + Sync {
    /// Fetch a single fact by reference.
    async fn get(&self, reference: &FactReference) -> Result<Option<Envelope>, StorageError>;

    /// Facts of `successor_type` that hold `reference` as a predecessor
    /// under `role` — the inverse index used for "successor" edges.
    async fn successors(
        &self,
        reference: &FactReference,
        successor_type: &str,
        role: &str,
    ) -> Result<Vec<FactReference>, StorageError>;
}

/// Durable set of envelopes: the contract described in spec.md §4.3.
#[async_trait]
pub trait FactStorage: Snapshot {
    /// Persist `envelopes`, asserting predecessor existence (or accepting
    /// them in the same batch provided it is topologically ordered).
    /// Idempotent: returns only the envelopes newly persisted; signatures
    /// on an already-known fact are merged into the existing set.
    async fn save(&self, envelopes: Vec<Envelope>) -> Result<Vec<Envelope>, StorageError>;

    /// The subset of `references` already present in the store.
    async fn which_exist(
        &self,
        references: &[FactReference],
    ) -> Result<Vec<FactReference>, StorageError>;

    /// The requested facts together with their full ancestor closure.
    async fn load(&self, references: &[FactReference]) -> Result<Vec<Envelope>, StorageError>;

    /// Last-refresh timestamp recorded against a specification's skeleton
    /// hash, for refresh heuristics.
    async fn mru_date(&self, spec_hash: &str) -> Result<Option<Timestamp>, StorageError>;

    /// Record a refresh timestamp against a specification's skeleton
    /// hash.
    async fn set_mru_date(&self, spec_hash: &str, at: Timestamp) -> Result<(), StorageError>;

    /// Remove the given facts unconditionally. Returns the number
    /// actually removed (already-absent references are not an error).
    ///
    /// This is the low-level primitive the purge protocol (spec.md §6)
    /// is built on; `factum-query::purge`/`purge_descendants` compute
    /// which references to pass here by evaluating a purge condition
    /// specification against this same store.
    async fn delete(&self, references: &[FactReference]) -> Result<usize, StorageError>;
}
