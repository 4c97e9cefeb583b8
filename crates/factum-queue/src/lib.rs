// SPDX-License-Identifier: Apache-2.0
//! Durable outbound queue, coalescing buffer, and retrying saver
//! (spec.md §4.10).
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

mod backoff;
mod coalesce;
mod error;
mod queue;
mod saver;
mod sink;

pub use backoff::Backoff;
pub use coalesce::CoalescingQueue;
pub use error::SendError;
pub use queue::{MemoryQueue, OutboundQueue};
pub use saver::{DrainOutcome, Saver};
pub use sink::OutboundSink;
