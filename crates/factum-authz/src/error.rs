// SPDX-License-Identifier: Apache-2.0
//! Authorization errors.

use factum_core::InvalidGraphError;
use factum_query::QueryError;
use factum_storage::StorageError;
use thiserror::Error;

/// Failure modes of [`crate::authorize`].
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    /// Evaluating an authorized-population specification failed.
    #[error("query error: {0}")]
    Query(#[from] QueryError),
    /// The input batch could not be topologically ordered.
    #[error("invalid graph: {0}")]
    InvalidGraph(#[from] InvalidGraphError),
    /// At least one fact was rejected; the batch fails as a whole.
    #[error("forbidden: rejected fact types {0:?}")]
    Forbidden(Vec<String>),
}
