//! The simulated radio medium: which nodes can hear which, and a running
//! tally of how many `send_raw`-equivalent transmissions have occurred.
//!
//! A real ESP-NOW transmission is a single broadcast at the physical layer
//! that every node within range observes; this mirrors that by resolving
//! one [`Medium::transmit`] call into deliveries to every neighbor of the
//! sender in one step, rather than modeling per-peer unicast sends even
//! for a flooded frame.

use std::collections::{HashMap, HashSet};

use meshrelay_proto::Hwid;

/// Connectivity graph and transmission counter for one simulation run.
#[derive(Debug, Default)]
pub struct Medium {
    links: HashMap<Hwid, HashSet<Hwid>>,
    transmissions: usize,
}

impl Medium {
    /// Creates a medium with no nodes and no links.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hwid` as a participant with no links yet.
    pub fn add_node(&mut self, hwid: Hwid) {
        self.links.entry(hwid).or_default();
    }

    /// Establishes bidirectional radio range between `a` and `b`. Both must
    /// already be registered via [`Medium::add_node`].
    pub fn link(&mut self, a: Hwid, b: Hwid) {
        self.links.entry(a).or_default().insert(b);
        self.links.entry(b).or_default().insert(a);
    }

    /// Links every pair in `hwids`, modeling a fully-connected cluster.
    pub fn fully_mesh(&mut self, hwids: &[Hwid]) {
        for (i, &a) in hwids.iter().enumerate() {
            self.add_node(a);
            for &b in &hwids[i + 1..] {
                self.link(a, b);
            }
        }
    }

    /// Removes any link between `a` and `b`, simulating the pair moving out
    /// of range of each other.
    pub fn unlink(&mut self, a: Hwid, b: Hwid) {
        if let Some(peers) = self.links.get_mut(&a) {
            peers.remove(&b);
        }
        if let Some(peers) = self.links.get_mut(&b) {
            peers.remove(&a);
        }
    }

    /// True if `a` and `b` are within range of each other.
    #[must_use]
    pub fn can_reach(&self, a: Hwid, b: Hwid) -> bool {
        self.links.get(&a).is_some_and(|peers| peers.contains(&b))
    }

    /// Neighbors of `hwid` within radio range.
    #[must_use]
    pub fn neighbors(&self, hwid: Hwid) -> Vec<Hwid> {
        self.links.get(&hwid).map(|peers| peers.iter().copied().collect()).unwrap_or_default()
    }

    /// Records one transmission from `sender`, returning the neighbors that
    /// physically receive it. An empty result means the send was rejected
    /// at the driver (no one in range, or `peer` unregistered).
    pub fn transmit(&mut self, sender: Hwid, peer: Hwid) -> Vec<Hwid> {
        self.transmissions += 1;
        if peer.is_broadcast() {
            self.neighbors(sender)
        } else if self.can_reach(sender, peer) {
            vec![peer]
        } else {
            Vec::new()
        }
    }

    /// Total number of [`Medium::transmit`] calls so far (spec §8 scenario
    /// S4's "total radio sends observed across all nodes").
    #[must_use]
    pub fn transmission_count(&self) -> usize {
        self.transmissions
    }
}
