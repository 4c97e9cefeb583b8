// SPDX-License-Identifier: Apache-2.0
//! Write-time authorization (spec.md §4.8): per-fact verdicts computed
//! in topological order, batch-atomic on rejection.
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

mod authorize;
mod error;
mod rule;

pub use authorize::{authorize, Verdict};
pub use error::AuthzError;
pub use rule::{AuthorizationRule, RuleSet};
