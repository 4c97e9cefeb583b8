// SPDX-License-Identifier: Apache-2.0
//! Tracing initialization for applications embedding this runtime.
//! Every subsystem crate logs through `tracing`; this just wires a
//! subscriber, honoring `RUST_LOG` if set.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
/// Intended for application entry points; a library embedding this
/// runtime inside a larger process should install its own subscriber
/// instead.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
