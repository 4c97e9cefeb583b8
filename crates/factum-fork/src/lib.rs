// SPDX-License-Identifier: Apache-2.0
//! Replication composition (spec.md §4.11): `PassThrough`, `Transient`,
//! and `Persistent` forks over the same `save`/`load`/`start`/`stop`
//! capability set.
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
mod fork;
mod pass_through;
mod persistent;
mod remote;
mod transient;

pub use error::{FetchError, ForkError, SubscriptionError};
pub use fork::Fork;
pub use pass_through::PassThroughFork;
pub use persistent::PersistentFork;
pub use remote::{RemoteFetch, Subscription};
pub use transient::TransientFork;
