// SPDX-License-Identifier: Apache-2.0
//! Feed-to-rule distribution matching (spec.md §4.9): on read-subscribe,
//! match a requested feed against declared distribution rules under
//! given-permutation, evaluating each rule's user population against the
//! caller's identity.
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

mod distribute;
mod error;
mod rule;

pub use distribute::authorize_feed;
pub use error::{DistributionDenied, DistributionError};
pub use rule::{DistributionRule, RuleSet};
