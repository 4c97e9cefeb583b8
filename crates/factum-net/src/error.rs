// SPDX-License-Identifier: Apache-2.0
//! Transport, wire, and network-manager error types.

use factum_core::{FactReference, InvalidGraphError};
use factum_fork::ForkError;
use factum_storage::StorageError;
use thiserror::Error;

/// A transport-level failure, distinguishing terminal failures from ones
/// a caller should retry (spec.md §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Terminal: the request will not succeed on retry.
    #[error("transport failure: {0}")]
    Failure(String),
    /// Transient: back off and resume.
    #[error("transport retry: {0}")]
    Retry(String),
}

/// A graph-stream or save-envelope frame failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A line did not parse as the JSON shape expected at that position.
    #[error("malformed frame: {0}")]
    Malformed(String),
    /// A back-reference index pointed outside the facts emitted so far.
    #[error("back-reference {0} out of range")]
    BadBackReference(usize),
    /// A `SIG` frame named a key index no `PK` frame declared.
    #[error("signature referenced undeclared key index {0}")]
    UndeclaredKey(usize),
    /// A `SIG` frame appeared with no preceding record to attach to.
    #[error("signature frame with no preceding record")]
    DanglingSignature,
    /// A public key or signature field was not valid base64 of the
    /// expected length.
    #[error("invalid base64 for {0}")]
    InvalidBase64(&'static str),
    /// A predecessor reference named a fact the writer had not yet
    /// emitted (the caller must supply records in topological order).
    #[error("predecessor {0} not yet emitted in this stream")]
    UnemittedPredecessor(FactReference),
}

/// Errors from the network manager and subscriber (spec.md §4.12).
#[derive(Debug, Error)]
pub enum NetError {
    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A wire frame failed to parse.
    #[error(transparent)]
    Wire(#[from] WireError),
    /// The local store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The fork (C11) failed to persist fetched facts.
    #[error(transparent)]
    Fork(#[from] ForkError),
    /// Hydration encountered a malformed graph.
    #[error(transparent)]
    InvalidGraph(#[from] InvalidGraphError),
    /// The subscription was stopped before it established.
    #[error("subscription cancelled before establishment")]
    Cancelled,
    /// A stream response named a reference the local store never
    /// resolved to a known fact even after `load`.
    #[error("load did not resolve reference {0}")]
    UnresolvedReference(FactReference),
}
