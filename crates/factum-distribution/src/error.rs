// SPDX-License-Identifier: Apache-2.0
//! Distribution errors.

use factum_query::QueryError;
use thiserror::Error;

/// No rule authorized the requested feed. Carries a human-readable
/// reason per rule tried, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no distribution rule authorized the requested feed: {}", .reasons.join("; "))]
pub struct DistributionDenied {
    /// One line per rule explaining why it didn't apply.
    pub reasons: Vec<String>,
}

/// Failure modes of [`crate::authorize_feed`].
#[derive(Debug, Error)]
pub enum DistributionError {
    /// Evaluating a user specification failed.
    #[error("query error: {0}")]
    Query(#[from] QueryError),
    /// No rule authorized the feed.
    #[error(transparent)]
    Denied(#[from] DistributionDenied),
}
