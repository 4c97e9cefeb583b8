// SPDX-License-Identifier: Apache-2.0
//! Configuration loading and purge-condition registration (spec.md §6).
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

mod purge;
mod settings;
mod store;

pub use purge::{PurgeConditionError, PurgeRegistry};
pub use settings::FactumConfig;
pub use store::{ConfigError, ConfigService, ConfigStore, MemoryConfigStore};
