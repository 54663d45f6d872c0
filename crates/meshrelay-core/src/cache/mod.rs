//! The three bounded caches.

mod fifo_set;
mod routing_table;

use std::sync::Mutex;

use meshrelay_proto::MessageId;

pub use fifo_set::FifoIdSet;
pub use routing_table::{RouteEntry, RoutingTable};

/// Cache of `message_id`s this node has already processed.
///
/// The only resource touched from both the RX callback and the Processor,
/// so it is guarded by a `std::sync::Mutex` held for the minimum span
/// needed to scan/insert/evict — never across an `.await`.
#[derive(Debug)]
pub struct SeenIdCache {
    inner: Mutex<FifoIdSet<MessageId>>,
}

impl SeenIdCache {
    /// Creates an empty cache with the configured capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(FifoIdSet::new(capacity)) }
    }

    /// Atomically checks whether `id` has already been seen and, if not,
    /// records it.
    ///
    /// Returns `true` if this is a duplicate (the caller must drop the
    /// frame). This is the sole mechanism preventing flood amplification:
    /// the check and the insert happen under one lock acquisition so two
    /// concurrent receivers of the same `message_id` cannot both observe
    /// "not seen".
    #[allow(clippy::missing_panics_doc)] // lock poisoning is unrecoverable
    pub fn check_and_insert(&self, id: MessageId) -> bool {
        let mut guard = self.inner.lock().expect("seen-id cache mutex poisoned");
        let duplicate = guard.contains(&id);
        guard.insert(id);
        duplicate
    }

    /// Records `id` as seen without checking (used when this node
    /// originates a flood, so its own echo is later recognized and
    /// dropped when it loops back around).
    pub fn insert(&self, id: MessageId) {
        self.inner.lock().expect("seen-id cache mutex poisoned").insert(id);
    }

    /// Number of entries currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("seen-id cache mutex poisoned").len()
    }

    /// True if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().expect("seen-id cache mutex poisoned").is_empty()
    }
}

/// Cache of `message_id`s whose `DeliveryConfirm` has arrived while the
/// originating `WaitResponse` item may still be in the queue. Processor-
/// private; no lock needed.
#[derive(Debug)]
pub struct PendingConfirmCache {
    inner: FifoIdSet<MessageId>,
}

impl PendingConfirmCache {
    /// Creates an empty cache. Capacity equals the queue capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { inner: FifoIdSet::new(capacity) }
    }

    /// Records that a confirmation for `id` has arrived.
    pub fn record(&mut self, id: MessageId) {
        self.inner.insert(id);
    }

    /// If a confirmation for `id` is pending, consumes it and returns
    /// `true`.
    pub fn take(&mut self, id: MessageId) -> bool {
        self.inner.remove(&id)
    }

    /// Number of confirmations currently pending redemption.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if no confirmation is currently pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
