// SPDX-License-Identifier: Apache-2.0
//! Storage error type.

use factum_core::FactReference;
use thiserror::Error;

/// Failures a storage backend may report. All [`crate::FactStorage`] and
/// [`crate::Snapshot`] operations may fail with this; callers decide
/// whether a given failure is retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A referenced fact does not exist in the store and was required to.
    #[error("fact not found: {0}")]
    NotFound(FactReference),
    /// A successor was presented before its predecessors existed.
    #[error("predecessor missing for {0}")]
    PredecessorMissing(FactReference),
    /// Backend-specific failure (I/O, serialization, connection).
    #[error("backend error: {0}")]
    Backend(String),
}
