//! The routing table: `original_target -> next_hop`, as a small ordered
//! vector with linear scan (spec §9: "Routing table as arena + index" — in
//! a language without raw back-pointers, a bounded vector with linear scan
//! is simpler than a hash map with LRU bookkeeping, and the default
//! capacity of 100 makes the scan cheap).

use std::collections::VecDeque;

use meshrelay_proto::Hwid;

/// One learned route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    /// The final destination this route leads to.
    pub original_target: Hwid,
    /// The one-hop neighbor to hand frames to for this destination.
    pub next_hop: Hwid,
}

/// Bounded routing table. At most one entry per `original_target`
/// (spec §3's invariant); FIFO eviction by insertion order on overflow.
#[derive(Debug)]
pub struct RoutingTable {
    capacity: usize,
    entries: VecDeque<RouteEntry>,
}

impl RoutingTable {
    /// Creates an empty table with room for `capacity` destinations.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RoutingTable capacity must be non-zero");
        Self { capacity, entries: VecDeque::with_capacity(capacity) }
    }

    /// Looks up the next hop for `target`.
    #[must_use]
    pub fn lookup(&self, target: Hwid) -> Option<Hwid> {
        self.entries.iter().find(|e| e.original_target == target).map(|e| e.next_hop)
    }

    /// Installs or updates the route to `target` via `next_hop`.
    ///
    /// A re-discovery for a target already present updates `next_hop` in
    /// place (spec §3: "a newer discovery replaces any older entry for the
    /// same destination") without disturbing FIFO eviction order. A brand
    /// new destination is appended, evicting the oldest entry first if the
    /// table is full.
    pub fn upsert(&mut self, target: Hwid, next_hop: Hwid) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.original_target == target) {
            entry.next_hop = next_hop;
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(RouteEntry { original_target: target, next_hop });
    }

    /// Evicts any entry for `target`, if present. Used when a send to a
    /// cached route fails (spec §4.5's "Fail" handling).
    pub fn evict(&mut self, target: Hwid) {
        if let Some(pos) = self.entries.iter().position(|e| e.original_target == target) {
            self.entries.remove(pos);
        }
    }

    /// Number of routes currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table holds no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hwid(byte: u8) -> Hwid {
        Hwid([byte; 6])
    }

    #[test]
    fn lookup_finds_installed_route() {
        let mut table = RoutingTable::new(10);
        table.upsert(hwid(1), hwid(2));
        assert_eq!(table.lookup(hwid(1)), Some(hwid(2)));
    }

    #[test]
    fn upsert_replaces_without_duplicating() {
        let mut table = RoutingTable::new(10);
        table.upsert(hwid(1), hwid(2));
        table.upsert(hwid(1), hwid(3));
        assert_eq!(table.lookup(hwid(1)), Some(hwid(3)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut table = RoutingTable::new(2);
        for i in 0..10u8 {
            table.upsert(hwid(i), hwid(i));
            assert!(table.len() <= 2);
        }
    }

    #[test]
    fn eviction_makes_room_for_new_destinations() {
        let mut table = RoutingTable::new(2);
        table.upsert(hwid(1), hwid(1));
        table.upsert(hwid(2), hwid(2));
        table.upsert(hwid(3), hwid(3));
        assert_eq!(table.lookup(hwid(1)), None);
        assert_eq!(table.lookup(hwid(2)), Some(hwid(2)));
        assert_eq!(table.lookup(hwid(3)), Some(hwid(3)));
    }

    #[test]
    fn evict_removes_stale_route() {
        let mut table = RoutingTable::new(10);
        table.upsert(hwid(1), hwid(2));
        table.evict(hwid(1));
        assert_eq!(table.lookup(hwid(1)), None);
    }
}
