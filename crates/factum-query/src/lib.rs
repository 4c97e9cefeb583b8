// SPDX-License-Identifier: Apache-2.0
//! Specification evaluator: executes a [`factum_spec::Specification`]
//! against a [`factum_storage::Snapshot`] and projects results.
//!
//! Also hosts purge orchestration (spec.md §6): computing which
//! references a purge condition selects is a specification evaluation,
//! so it lives here rather than in `factum-storage`, which only exposes
//! the low-level `delete` primitive this module calls into.
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

mod chain;
mod error;
mod evaluate;
mod project;
mod purge;
mod tuple;

pub use error::QueryError;
pub use project::{execute, Projected};
pub use purge::{purge, purge_descendants, validate_purge_condition};
pub use tuple::Tuple;
