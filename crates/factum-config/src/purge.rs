// SPDX-License-Identifier: Apache-2.0
//! Purge condition registration (spec.md §6): a purge condition is a
//! specification whose givens are the purge root and whose matches
//! define the descendant subgraph a purge removes. Registration-time
//! validation rejects conditions with existential clauses, since an
//! existential condition would make the removed subgraph depend on facts
//! that arrive after the purge runs.

use factum_query::QueryError;
use factum_spec::Specification;
use thiserror::Error;

/// A purge condition failed registration-time validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PurgeConditionError {
    /// The condition contains an existential clause somewhere in its
    /// match tree, making the purged subgraph non-deterministic.
    #[error(transparent)]
    Invalid(#[from] QueryError),
}

/// The set of purge conditions an application has registered.
#[derive(Debug, Default, Clone)]
pub struct PurgeRegistry {
    conditions: Vec<Specification>,
}

impl PurgeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register `condition`. Rejects conditions containing
    /// an existential clause anywhere in their match tree.
    pub fn register(&mut self, condition: Specification) -> Result<(), PurgeConditionError> {
        factum_query::validate_purge_condition(&condition)?;
        self.conditions.push(condition);
        Ok(())
    }

    /// The currently registered conditions, in registration order.
    #[must_use]
    pub fn conditions(&self) -> &[Specification] {
        &self.conditions
    }
}
