//! Property-based tests for the dispatch engine's core invariants.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use meshrelay_core::{
    cache::{FifoIdSet, SeenIdCache},
    config::MeshConfig,
    env::Environment,
    processor::{Processor, ProcessorAction, SendStatus},
    workitem::{WorkItem, WorkKind},
};
use meshrelay_proto::{Frame, Hwid, MeshId, MessageId, MessageType};
use proptest::prelude::*;

#[derive(Clone)]
struct TestEnv {
    clock: Arc<Mutex<u64>>,
    next_id: Arc<Mutex<u32>>,
}

impl TestEnv {
    fn new() -> Self {
        Self { clock: Arc::new(Mutex::new(0)), next_id: Arc::new(Mutex::new(1)) }
    }
}

impl Environment for TestEnv {
    type Instant = u64;

    fn now(&self) -> u64 {
        *self.clock.lock().expect("clock mutex poisoned")
    }

    fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }

    fn random_u32(&self) -> u32 {
        let mut guard = self.next_id.lock().expect("id mutex poisoned");
        let id = *guard;
        *guard += 1;
        id
    }
}

fn hwid(byte: u8) -> Hwid {
    Hwid([byte; 6])
}

fn broadcast_frame(from: Hwid, id: u32, payload: Vec<u8>) -> Frame {
    Frame {
        message_type: MessageType::Broadcast,
        mesh_id: MeshId(1),
        message_id: MessageId(id),
        confirm_id: MessageId::UNSET,
        original_target: Hwid::BROADCAST,
        original_sender: from,
        sender: from,
        payload,
    }
}

proptest! {
    /// Invariant: a `message_id` already recorded in the seen-ID cache is
    /// never accepted a second time, regardless of how many times the same
    /// wire bytes are replayed at the cache.
    #[test]
    fn seen_id_cache_never_reaccepts(id in any::<u32>(), replays in 1usize..20) {
        let cache = SeenIdCache::new(50);
        let mut duplicate_count = 0;
        for _ in 0..replays {
            if cache.check_and_insert(MessageId(id)) {
                duplicate_count += 1;
            }
        }
        prop_assert_eq!(duplicate_count, replays - 1);
    }

    /// Invariant: none of the bounded caches ever grows past its configured
    /// capacity, however many distinct identifiers are pushed through it.
    #[test]
    fn fifo_set_never_exceeds_capacity(capacity in 1usize..20, ids in prop::collection::vec(any::<u32>(), 0..200)) {
        let mut set = FifoIdSet::new(capacity);
        for id in ids {
            set.insert(id);
            prop_assert!(set.len() <= capacity);
        }
    }

    /// Invariant: dispatching a self-originated `Broadcast` always yields
    /// exactly one `Transmit` action addressed to the reserved broadcast
    /// address — never a direct radio call, never more than one hop's
    /// worth of work per dispatch.
    #[test]
    fn broadcast_to_send_yields_exactly_one_broadcast_transmit(id in any::<u32>(), payload in prop::collection::vec(any::<u8>(), 0..64)) {
        let origin = hwid(1);
        let config = MeshConfig { mesh_id: MeshId(1), ..MeshConfig::default() };
        let mut processor = Processor::new(
            origin,
            &config,
            Arc::new(SeenIdCache::new(config.seen_id_capacity)),
            TestEnv::new(),
        );
        let item = WorkItem::new(WorkKind::ToSend, 0u64, broadcast_frame(origin, id, payload));

        let actions = processor.dispatch(item);

        let transmits: Vec<_> = actions
            .iter()
            .filter(|a| matches!(a, ProcessorAction::Transmit { peer, .. } if *peer == Hwid::BROADCAST))
            .collect();
        prop_assert_eq!(transmits.len(), 1);
    }

    /// Invariant: a successful broadcast transmit always reports exactly
    /// one `EmitSend { status: Success }` back to the application, for the
    /// node that originated it.
    #[test]
    fn broadcast_send_success_reports_exactly_once(id in any::<u32>(), payload in prop::collection::vec(any::<u8>(), 0..64)) {
        let origin = hwid(1);
        let config = MeshConfig { mesh_id: MeshId(1), ..MeshConfig::default() };
        let mut processor = Processor::new(
            origin,
            &config,
            Arc::new(SeenIdCache::new(config.seen_id_capacity)),
            TestEnv::new(),
        );
        let frame = broadcast_frame(origin, id, payload);

        let actions = processor.finish_send(frame, meshrelay_core::CompletionStatus::Success);

        let sends: Vec<_> = actions
            .iter()
            .filter(|a| matches!(a, ProcessorAction::EmitSend { status: SendStatus::Success, .. }))
            .collect();
        prop_assert_eq!(sends.len(), 1);
    }
}

#[test]
fn unicast_with_no_route_never_produces_a_transmit() {
    let config = MeshConfig { mesh_id: MeshId(1), ..MeshConfig::default() };
    let mut processor = Processor::new(
        hwid(1),
        &config,
        Arc::new(SeenIdCache::new(config.seen_id_capacity)),
        TestEnv::new(),
    );
    let frame = Frame {
        message_type: MessageType::Unicast,
        mesh_id: MeshId(1),
        message_id: MessageId(7),
        confirm_id: MessageId::UNSET,
        original_target: hwid(2),
        original_sender: hwid(1),
        sender: hwid(1),
        payload: vec![],
    };
    let item = WorkItem::new(WorkKind::ToSend, 0u64, frame);
    let actions = processor.dispatch(item);

    assert_eq!(actions.len(), 2);
    assert!(actions.iter().all(|a| !matches!(a, ProcessorAction::Transmit { .. })));
}
