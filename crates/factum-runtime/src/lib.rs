// SPDX-License-Identifier: Apache-2.0
//! Top-level facade wiring the fact model, query evaluator,
//! authorization and distribution engines, observable registry, and
//! replication layer into the client runtime described by spec.md §2.
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

mod error;
mod facade;
mod tracing_init;

pub use error::FactumError;
pub use facade::Factum;
pub use tracing_init::init_tracing;

pub use factum_authz::RuleSet as AuthorizationRules;
pub use factum_config::FactumConfig;
pub use factum_distribution::RuleSet as DistributionRules;
