// SPDX-License-Identifier: Apache-2.0
//! Outbound transport errors.

use thiserror::Error;

/// A transport attempt failed. Opaque beyond a human-readable reason —
/// the saver only needs to know whether to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("send failed: {0}")]
pub struct SendError(pub String);
