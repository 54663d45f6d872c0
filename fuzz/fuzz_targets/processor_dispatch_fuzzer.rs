//! Fuzz target for `Processor::dispatch` over arbitrary `WorkItem` sequences.
//!
//! Exercises spec §4.5's dispatch rules with adversarial frame contents and
//! timings, checking the invariants spec §8 requires of every Processor no
//! matter what its caller feeds it.
//!
//! # Invariants
//!
//! - `dispatch`/`finish_send` never panics on any reachable `WorkItem`.
//! - The routing table never exceeds its configured capacity.
//! - The pending-confirm cache never exceeds its configured capacity
//!   (equal to `queue_size` here).

#![no_main]

use std::sync::Arc;
use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use meshrelay_core::{CompletionStatus, Environment, MeshConfig, Processor, SeenIdCache, WorkItem, WorkKind};
use meshrelay_proto::{Frame, Hwid, MeshId, MessageId, MessageType};

#[derive(Clone)]
struct FuzzEnv {
    clock: Arc<std::sync::Mutex<u64>>,
    next_id: Arc<std::sync::Mutex<u32>>,
}

impl FuzzEnv {
    fn new() -> Self {
        Self { clock: Arc::new(std::sync::Mutex::new(0)), next_id: Arc::new(std::sync::Mutex::new(1)) }
    }
}

impl Environment for FuzzEnv {
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
        *guard = guard.wrapping_add(1);
        id
    }
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzFrame {
    message_type: u8,
    message_id: u32,
    confirm_id: u32,
    original_target: [u8; 6],
    original_sender: [u8; 6],
    sender: [u8; 6],
    payload: Vec<u8>,
}

#[derive(Debug, Clone, Arbitrary)]
enum FuzzItem {
    ToSend(FuzzFrame),
    OnRecv(FuzzFrame),
    WaitRoute(FuzzFrame, u32),
    WaitResponse(FuzzFrame, u32),
    AdvanceClock(u16),
    FinishSend(FuzzFrame, bool),
}

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    local_hwid: [u8; 6],
    items: Vec<FuzzItem>,
}

fn to_frame(f: &FuzzFrame) -> Frame {
    let message_type = match f.message_type % 5 {
        0 => MessageType::Broadcast,
        1 => MessageType::Unicast,
        2 => MessageType::DeliveryConfirm,
        3 => MessageType::SearchRequest,
        _ => MessageType::SearchResponse,
    };
    Frame {
        message_type,
        mesh_id: MeshId(1),
        message_id: MessageId(f.message_id),
        confirm_id: MessageId(f.confirm_id),
        original_target: Hwid(f.original_target),
        original_sender: Hwid(f.original_sender),
        sender: Hwid(f.sender),
        payload: f.payload.iter().take(meshrelay_proto::MAX_PAYLOAD).copied().collect(),
    }
}

fuzz_target!(|scenario: Scenario| {
    let env = FuzzEnv::new();
    let config = MeshConfig { mesh_id: MeshId(1), ..MeshConfig::default() };
    let seen_ids = Arc::new(SeenIdCache::new(config.seen_id_capacity));
    let mut processor = Processor::new(Hwid(scenario.local_hwid), &config, seen_ids, env.clone());

    for item in scenario.items {
        match item {
            FuzzItem::ToSend(f) => {
                let _ = processor.dispatch(WorkItem::new(WorkKind::ToSend, env.now(), to_frame(&f)));
            },
            FuzzItem::OnRecv(f) => {
                let _ = processor.dispatch(WorkItem::new(WorkKind::OnRecv, env.now(), to_frame(&f)));
            },
            FuzzItem::WaitRoute(f, enqueued_at) => {
                let _ = processor
                    .dispatch(WorkItem::new(WorkKind::WaitRoute, u64::from(enqueued_at), to_frame(&f)));
            },
            FuzzItem::WaitResponse(f, enqueued_at) => {
                let _ = processor
                    .dispatch(WorkItem::new(WorkKind::WaitResponse, u64::from(enqueued_at), to_frame(&f)));
            },
            FuzzItem::AdvanceClock(millis) => {
                *env.clock.lock().expect("clock mutex poisoned") += u64::from(millis);
            },
            FuzzItem::FinishSend(f, success) => {
                let status = if success { CompletionStatus::Success } else { CompletionStatus::Fail };
                let _ = processor.finish_send(to_frame(&f), status);
            },
        }

        assert!(processor.routing_table_len() <= config.route_capacity);
        assert!(processor.pending_confirm_len() <= config.queue_size);
    }
});
