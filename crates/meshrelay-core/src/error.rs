//! Engine-level error taxonomy.

use thiserror::Error;

/// Errors surfaced while constructing the bounded caches/queue.
///
/// In practice these are unreachable in a correctly wired node: `init`
/// validates [`crate::config::MeshConfig`] (rejecting zero capacities)
/// before any cache is constructed, so a live node never observes this
/// variant. It exists because `meshrelay-harness` builds caches directly
/// from hand-written scenario configs that skip that validation step.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// A cache was asked to hold zero entries.
    #[error("cache capacity must be non-zero")]
    CapacityIsZero,
}

/// Errors the Processor itself can raise.
///
/// The dispatch loop is total over well-formed work items —
/// every `WorkKind` has a defined action for every reachable frame state —
/// so this enum currently has no live constructors. It is kept so the
/// dispatch signature does not need to change the day a new failure mode
/// (e.g. a poisoned cache lock) needs to be surfaced as an error rather
/// than a panic.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorError {}
