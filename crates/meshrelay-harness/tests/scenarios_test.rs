//! End-to-end scenarios S1-S6 from spec §8, each driven to quiescence over
//! a seeded [`SimDriver`].

use meshrelay_core::{MeshConfig, SendStatus};
use meshrelay_harness::{HarnessEvent, SimDriver};
use meshrelay_proto::{Hwid, MeshId};

fn hwid(byte: u8) -> Hwid {
    Hwid([byte; 6])
}

/// S1 — direct unicast, route cached: A's table already has `{B -> B}`.
#[test]
fn s1_direct_unicast_with_cached_route() {
    let mut driver = SimDriver::new(1, MeshId(1));
    driver.add_default_node(hwid(1));
    driver.add_default_node(hwid(2));
    driver.link(hwid(1), hwid(2));
    driver.seed_route(hwid(1), hwid(2), hwid(2));

    driver.send(hwid(1), hwid(2), vec![0x01, 0x02, 0x03]);
    driver.run_until_quiescent(10);

    assert_eq!(
        driver.events(hwid(2)),
        &[HarnessEvent::OnRecv { source: hwid(1), payload: vec![0x01, 0x02, 0x03] }]
    );
    assert_eq!(
        driver.events(hwid(1)),
        &[HarnessEvent::OnSend { target: hwid(2), status: SendStatus::Success }]
    );
}

/// S2 — two-hop unicast via discovery: A-R-B, A cannot hear B directly, and
/// A's table starts empty. Route discovery must run before delivery.
#[test]
fn s2_two_hop_unicast_via_discovery() {
    let mut driver = SimDriver::new(2, MeshId(1));
    driver.add_default_node(hwid(1)); // A
    driver.add_default_node(hwid(2)); // R
    driver.add_default_node(hwid(3)); // B
    driver.link(hwid(1), hwid(2));
    driver.link(hwid(2), hwid(3));

    driver.send(hwid(1), hwid(3), vec![0xAA]);
    driver.run_until_quiescent(20);

    assert_eq!(
        driver.events(hwid(3)),
        &[HarnessEvent::OnRecv { source: hwid(1), payload: vec![0xAA] }]
    );
    assert_eq!(
        driver.events(hwid(1)),
        &[HarnessEvent::OnSend { target: hwid(3), status: SendStatus::Success }]
    );
    assert_eq!(driver.routing_table_len(hwid(1)), 1, "A must have learned a route to B");
    assert_eq!(driver.routing_table_len(hwid(3)), 1, "B must have learned a route to A");
}

/// S3 — route staleness recovery: A's table is pre-populated with a route
/// to an unreachable next hop; the first send must fail, evict, and
/// rediscover the real route via R.
#[test]
fn s3_stale_route_is_evicted_and_rediscovered() {
    let mut driver = SimDriver::new(3, MeshId(1));
    driver.add_default_node(hwid(1)); // A
    driver.add_default_node(hwid(2)); // R
    driver.add_default_node(hwid(3)); // B
    driver.add_default_node(hwid(9)); // X: registered but unlinked from A
    driver.link(hwid(1), hwid(2));
    driver.link(hwid(2), hwid(3));
    driver.seed_route(hwid(1), hwid(3), hwid(9));

    driver.send(hwid(1), hwid(3), vec![0x55]);
    driver.run_until_quiescent(20);

    assert_eq!(
        driver.events(hwid(3)),
        &[HarnessEvent::OnRecv { source: hwid(1), payload: vec![0x55] }]
    );
    assert_eq!(
        driver.events(hwid(1)),
        &[HarnessEvent::OnSend { target: hwid(3), status: SendStatus::Success }]
    );
}

/// S4 — broadcast floods exactly once per node across a fully-meshed
/// four-node cluster, and the originator's own single local TX is the only
/// transmission it makes.
#[test]
fn s4_broadcast_floods_exactly_once_per_node() {
    let mut driver = SimDriver::new(4, MeshId(1));
    let nodes = [hwid(1), hwid(2), hwid(3), hwid(4)];
    for &node in &nodes {
        driver.add_default_node(node);
    }
    driver.fully_mesh(&nodes);

    driver.send(hwid(1), Hwid::BROADCAST, vec![0xDE, 0xAD]);
    driver.run_until_quiescent(10);

    assert_eq!(
        driver.events(hwid(1)),
        &[HarnessEvent::OnSend { target: Hwid::BROADCAST, status: SendStatus::Success }]
    );
    for &receiver in &nodes[1..] {
        assert_eq!(
            driver.events(receiver),
            &[HarnessEvent::OnRecv { source: hwid(1), payload: vec![0xDE, 0xAD] }],
            "node {receiver} must see exactly one OnRecv"
        );
    }
    assert_eq!(driver.transmission_count(), nodes.len(), "each node floods at most once");
}

/// S5 — delivery-confirmation timeout: B is unreachable and no route can
/// ever be discovered, so A must eventually observe `OnSend(Fail)`.
#[test]
fn s5_unreachable_target_times_out_to_fail() {
    let config = MeshConfig { mesh_id: MeshId(1), max_wait: std::time::Duration::from_millis(500), ..MeshConfig::default() };
    let mut driver = SimDriver::new(5, MeshId(1));
    driver.add_node(hwid(1), config.clone());
    driver.add_node(hwid(2), config); // B: registered but linked to no one

    driver.send(hwid(1), hwid(2), vec![0x00]);
    driver.run_until_quiescent(20);

    assert_eq!(
        driver.events(hwid(1)),
        &[HarnessEvent::OnSend { target: hwid(2), status: SendStatus::Fail }]
    );
    assert!(driver.events(hwid(2)).is_empty(), "B never receives anything to respond to");
}

/// S6 — duplicate suppression: a rebroadcast echo of the same `message_id`
/// must never produce a second `OnRecv`.
#[test]
fn s6_duplicate_broadcast_is_suppressed() {
    let mut driver = SimDriver::new(6, MeshId(1));
    driver.add_default_node(hwid(1));
    driver.add_default_node(hwid(2));
    driver.add_default_node(hwid(3));
    // A triangle: every rebroadcast echoes back to its other neighbors,
    // including the original sender.
    driver.fully_mesh(&[hwid(1), hwid(2), hwid(3)]);

    driver.send(hwid(1), Hwid::BROADCAST, vec![0x01]);
    driver.run_until_quiescent(10);

    assert_eq!(
        driver.events(hwid(2)).iter().filter(|e| matches!(e, HarnessEvent::OnRecv { .. })).count(),
        1,
        "B must see the broadcast exactly once despite the echo from C"
    );
    assert_eq!(
        driver.events(hwid(3)).iter().filter(|e| matches!(e, HarnessEvent::OnRecv { .. })).count(),
        1,
        "C must see the broadcast exactly once despite the echo from B"
    );
}
