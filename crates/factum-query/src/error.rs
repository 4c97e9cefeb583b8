// SPDX-License-Identifier: Apache-2.0
//! Query evaluation error type.

use factum_storage::StorageError;
use thiserror::Error;

/// Failures that can occur while evaluating a specification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A projection or condition referenced a label not bound in scope.
    #[error("label not bound: {0}")]
    UnboundLabel(String),
    /// A field projection named a field the resolved fact does not carry.
    #[error("fact of type {0} has no field {1}")]
    MissingField(String, String),
    /// The store reported a failure while a condition or projection was
    /// being resolved.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A purge condition carried an existential clause, which would make
    /// purge results depend on the state of facts outside the
    /// deleted subgraph — rejected at registration (spec.md §6).
    #[error("purge condition may not contain existential clauses")]
    NonDeterministicPurgeCondition,
}
