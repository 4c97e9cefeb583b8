// SPDX-License-Identifier: Apache-2.0
//! Error types for the fact model boundary.

use crate::reference::FactReference;
use thiserror::Error;

/// A fact failed structural or hash validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidFactError {
    /// Recomputing the hash over the canonical form did not match the
    /// stored hash.
    #[error("hash mismatch for fact {0}")]
    HashMismatch(FactReference),
    /// The fact type name was empty.
    #[error("fact is missing a type name")]
    MissingType,
}

/// Hydration or sorting encountered a malformed graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidGraphError {
    /// A predecessor reference was not present among the supplied
    /// records and was not otherwise marked as pre-satisfied.
    #[error("missing predecessor {0}")]
    MissingPredecessor(FactReference),
    /// The input graph contains a cycle (cannot happen for validly
    /// hashed facts; only reachable from malformed input).
    #[error("cyclic fact graph detected")]
    Cycle,
}
