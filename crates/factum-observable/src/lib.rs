// SPDX-License-Identifier: Apache-2.0
//! Listener registry and reactive notification dispatch (spec.md §4.7).
//!
//! On each batch of newly persisted envelopes, inverses keyed by fact
//! type are evaluated against the store and resolved to notifications
//! for the listeners registered against the matching specification.
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

mod notification;
mod registry;

pub use notification::{Notification, NotificationKind};
pub use registry::{ListenerId, ObservableSource};
