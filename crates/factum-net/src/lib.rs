// SPDX-License-Identifier: Apache-2.0
//! Wire formats, transport port, per-feed subscriber, and network
//! manager (spec.md §4.12 and §6).
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

mod bookmark;
mod error;
mod manager;
mod stream;
mod subscriber;
mod transport;
mod wire;

pub use bookmark::{BookmarkStore, MemoryBookmarkStore};
pub use error::{NetError, TransportError, WireError};
pub use manager::{NetworkManager, SubscriptionId};
pub use stream::{decode_graph_stream, GraphStreamWriter, StreamFrame};
pub use subscriber::Subscriber;
pub use transport::{StreamEvent, StreamHandle, Transport};
pub use wire::{from_wire, from_wire_batch, to_wire, to_wire_batch, WireBatch, WireEnvelope};
