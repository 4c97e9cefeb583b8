// SPDX-License-Identifier: Apache-2.0
//! The facade's unified error type (spec.md §7): each subsystem's error
//! surfaces through here unchanged, so callers can match on the
//! originating concern without the facade collapsing distinctions the
//! error-handling design relies on.

use factum_authz::AuthzError;
use factum_config::PurgeConditionError;
use factum_distribution::DistributionError;
use factum_fork::ForkError;
use factum_query::QueryError;
use factum_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by [`crate::Factum`]'s operations.
#[derive(Debug, Error)]
pub enum FactumError {
    /// `save` rejected one or more facts; the batch did not partially
    /// commit.
    #[error(transparent)]
    Authorization(#[from] AuthzError),
    /// A specification failed to evaluate.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// The replication layer failed to persist or fetch.
    #[error(transparent)]
    Fork(#[from] ForkError),
    /// A feed subscription was denied by distribution policy.
    #[error(transparent)]
    Distribution(#[from] DistributionError),
    /// The backing store failed outright.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A purge condition failed registration-time validation.
    #[error(transparent)]
    PurgeCondition(#[from] PurgeConditionError),
    /// `purge`/`purge_descendants` named an index with no registered
    /// condition.
    #[error("no purge condition registered at index {0}")]
    UnknownPurgeCondition(usize),
}
