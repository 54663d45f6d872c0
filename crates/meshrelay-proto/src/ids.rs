//! Thirty-two-bit protocol identifiers.
//!
//! Kept as distinct newtypes (rather than bare `u32`) so `mesh_id`,
//! `message_id`, and `confirm_id` cannot be silently swapped at a call site.

use core::fmt;

/// Network identifier shared by every node that forms one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Per-frame identifier chosen by the originator; reused by forwarders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u32);

impl MessageId {
    /// The sentinel value meaning "no confirmation pending" in `confirm_id`.
    ///
    /// Zero is never assigned as a live `message_id` (callers draw fresh
    /// identifiers via `Environment::fresh_message_id`, which retries on a
    /// zero draw), so it safely distinguishes "unset" from any real
    /// identifier.
    pub const UNSET: Self = Self(0);
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
