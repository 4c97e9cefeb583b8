// SPDX-License-Identifier: Apache-2.0
//! Notifications delivered to a registered listener.

use factum_query::Projected;

/// Whether a notification adds or removes a projected result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A new result appeared.
    Added,
    /// A previously-produced result no longer holds.
    Removed,
}

/// A single observer notification: a projected result plus whether it
/// was added or removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Add or remove.
    pub kind: NotificationKind,
    /// The affected result.
    pub result: Projected,
}
