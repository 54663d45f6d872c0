//! Hand-driven multi-node simulation.
//!
//! `SimDriver` calls each node's handlers directly rather than running a
//! production async event loop: it owns each node's [`Processor`],
//! pops its per-node work queue by hand, and executes the resulting
//! [`ProcessorAction`]s against an in-memory [`Medium`] instead of running
//! `meshrelay-node`'s `run_processor_loop` over a real
//! [`meshrelay_radio::RadioAdapter`]. The Processor's `WaitRoute`/
//! `WaitResponse` retry loop has no built-in backoff, it just re-polls
//! every dispatch — production relies on real wall-clock time passing
//! between polls, but here nothing advances the virtual clock on its own,
//! so [`SimDriver::run_until_quiescent`] jumps the clock forward only once
//! every node has stopped making forward progress, instead of spinning
//! through every intermediate poll.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use meshrelay_core::{
    CompletionStatus, LogLevel, MeshConfig, Processor, ProcessorAction, SeenIdCache, SendStatus, WorkItem,
    WorkKind,
};
use meshrelay_proto::{Frame, FrameCodecError, Hwid, MessageId, MessageType};

use crate::medium::Medium;
use crate::sim_env::SimEnv;

/// One event the application layer would observe for a given node (spec
/// §6's event bus, reproduced locally since `meshrelay-harness` drives
/// `Processor` directly rather than through `meshrelay-node::MeshNode`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessEvent {
    /// A `Broadcast` or `Unicast` addressed to this node arrived.
    OnRecv {
        /// The node that originated the payload.
        source: Hwid,
        /// Application bytes.
        payload: Vec<u8>,
    },
    /// The outcome of a self-originated send.
    OnSend {
        /// The original destination (`Hwid::BROADCAST` for a Broadcast).
        target: Hwid,
        /// Success or failure.
        status: SendStatus,
    },
}

struct SimNode {
    processor: Processor<SimEnv>,
    queue: VecDeque<WorkItem<Duration>>,
    seen_ids: std::sync::Arc<SeenIdCache>,
    events: Vec<HarnessEvent>,
}

/// A fully simulated mesh: one [`Processor`] per node, wired together by a
/// [`Medium`] and a shared [`SimEnv`].
pub struct SimDriver {
    env: SimEnv,
    medium: Medium,
    nodes: HashMap<Hwid, SimNode>,
    mesh_id: meshrelay_proto::MeshId,
}

impl SimDriver {
    /// Creates an empty simulation seeded for reproducibility. Every node
    /// added afterwards shares `mesh_id`.
    #[must_use]
    pub fn new(seed: u64, mesh_id: meshrelay_proto::MeshId) -> Self {
        Self { env: SimEnv::with_seed(seed), medium: Medium::new(), nodes: HashMap::new(), mesh_id }
    }

    /// Adds a node to the simulation, configured by `config` (whose
    /// `mesh_id` is overridden to match this driver's).
    pub fn add_node(&mut self, hwid: Hwid, mut config: MeshConfig) {
        config.mesh_id = self.mesh_id;
        let seen_ids = std::sync::Arc::new(SeenIdCache::new(config.seen_id_capacity));
        let processor = Processor::new(hwid, &config, std::sync::Arc::clone(&seen_ids), self.env.clone());
        self.nodes.insert(hwid, SimNode { processor, queue: VecDeque::new(), seen_ids, events: Vec::new() });
        self.medium.add_node(hwid);
    }

    /// Adds a node with every [`MeshConfig`] field at its default.
    pub fn add_default_node(&mut self, hwid: Hwid) {
        self.add_node(hwid, MeshConfig::default());
    }

    /// Establishes bidirectional radio range between `a` and `b`.
    pub fn link(&mut self, a: Hwid, b: Hwid) {
        self.medium.link(a, b);
    }

    /// Links every pair of `hwids`, modeling a fully-connected cluster.
    pub fn fully_mesh(&mut self, hwids: &[Hwid]) {
        self.medium.fully_mesh(hwids);
    }

    /// Seeds `node`'s routing table with a direct (possibly stale) route,
    /// for scenarios that start from a pre-populated table (spec §8's S1,
    /// S3).
    ///
    /// # Panics
    ///
    /// Panics if `node` was not added via [`Self::add_node`].
    pub fn seed_route(&mut self, node: Hwid, target: Hwid, next_hop: Hwid) {
        self.nodes.get_mut(&node).expect("node must be added before seeding a route").processor.seed_route(target, next_hop);
    }

    /// Total number of `send_raw`-equivalent transmissions observed across
    /// every node so far (spec §8's S4).
    #[must_use]
    pub fn transmission_count(&self) -> usize {
        self.medium.transmission_count()
    }

    /// Events a given node's application layer has observed so far.
    #[must_use]
    pub fn events(&self, node: Hwid) -> &[HarnessEvent] {
        self.nodes.get(&node).map_or(&[], |n| n.events.as_slice())
    }

    /// Number of routes `node` currently has cached.
    #[must_use]
    pub fn routing_table_len(&self, node: Hwid) -> usize {
        self.nodes.get(&node).map_or(0, |n| n.processor.routing_table_len())
    }

    /// Number of seen `message_id`s `node` currently holds.
    #[must_use]
    pub fn seen_id_len(&self, node: Hwid) -> usize {
        self.nodes.get(&node).map_or(0, |n| n.seen_ids.len())
    }

    /// Number of confirmations `node` currently has pending redemption.
    #[must_use]
    pub fn pending_confirm_len(&self, node: Hwid) -> usize {
        self.nodes.get(&node).map_or(0, |n| n.processor.pending_confirm_len())
    }

    /// Submits `payload` for delivery from `from` to `target`, exactly as
    /// [`meshrelay_node::MeshNode::send`] would (broadcast when `target` is
    /// [`Hwid::BROADCAST`], unicast otherwise).
    ///
    /// # Panics
    ///
    /// Panics if `from` was not added via [`Self::add_node`].
    pub fn send(&mut self, from: Hwid, target: Hwid, payload: Vec<u8>) {
        let message_type = if target.is_broadcast() { MessageType::Broadcast } else { MessageType::Unicast };
        let node = self.nodes.get_mut(&from).expect("node must be added before sending");
        let frame = Frame {
            message_type,
            mesh_id: self.mesh_id,
            message_id: MessageId(self.env.fresh_message_id()),
            confirm_id: MessageId::UNSET,
            original_target: target,
            original_sender: from,
            sender: Hwid::ZERO,
            payload,
        };
        node.queue.push_back(WorkItem::new(WorkKind::ToSend, self.env.now(), frame));
    }

    /// Hands raw wire bytes to `to` as if its radio had just received them
    /// from `from`, mirroring `meshrelay-node::RxGateway::on_frame` — size,
    /// mesh-id, and duplicate checks happen here, before a work item ever
    /// reaches the Processor (spec §8's S6 depends on this gate existing).
    fn deliver_frame(&mut self, to: Hwid, from: Hwid, bytes: &[u8]) {
        let mesh_id = self.mesh_id;
        let Some(node) = self.nodes.get_mut(&to) else { return };
        let frame = match Frame::decode(bytes, mesh_id, from) {
            Ok(frame) => frame,
            Err(FrameCodecError::InvalidSize { expected, actual }) => {
                tracing::warn!(expected, actual, "dropping frame with invalid size");
                return;
            },
            Err(FrameCodecError::WrongMesh { expected, actual }) => {
                tracing::warn!(%expected, %actual, "dropping frame for a foreign mesh");
                return;
            },
            Err(FrameCodecError::UnknownMessageType(byte)) => {
                tracing::warn!(byte, "dropping frame with unknown message type");
                return;
            },
        };
        if node.seen_ids.check_and_insert(frame.message_id) {
            tracing::debug!(message_id = %frame.message_id, "dropping duplicate frame");
            return;
        }
        node.queue.push_front(WorkItem::new(WorkKind::OnRecv, self.env.now(), frame));
    }

    /// Pops and dispatches one work item for `hwid`, executing the
    /// resulting actions (recursively, for any follow-up actions a
    /// `Transmit`'s completion produces). Returns `true` if an item was
    /// available to dispatch.
    fn step_node(&mut self, hwid: Hwid) -> bool {
        let Some(item) = self.nodes.get_mut(&hwid).and_then(|n| n.queue.pop_front()) else { return false };
        let actions = self.nodes.get_mut(&hwid).expect("node exists").processor.dispatch(item);
        self.execute_actions(hwid, actions);
        true
    }

    fn execute_actions(&mut self, hwid: Hwid, actions: Vec<ProcessorAction<Duration>>) {
        let mut pending: VecDeque<ProcessorAction<Duration>> = actions.into();
        while let Some(action) = pending.pop_front() {
            match action {
                ProcessorAction::Transmit { peer, frame } => {
                    let recipients = self.medium.transmit(hwid, peer);
                    let status =
                        if recipients.is_empty() { CompletionStatus::Fail } else { CompletionStatus::Success };
                    for recipient in &recipients {
                        let wire = frame.encode();
                        self.deliver_frame(*recipient, hwid, &wire);
                    }
                    let follow_up =
                        self.nodes.get_mut(&hwid).expect("node exists").processor.finish_send(frame, status);
                    pending.extend(follow_up);
                },
                ProcessorAction::EmitRecv { source, payload } => {
                    self.nodes
                        .get_mut(&hwid)
                        .expect("node exists")
                        .events
                        .push(HarnessEvent::OnRecv { source, payload });
                },
                ProcessorAction::EmitSend { target, status } => {
                    self.nodes
                        .get_mut(&hwid)
                        .expect("node exists")
                        .events
                        .push(HarnessEvent::OnSend { target, status });
                },
                ProcessorAction::Requeue { item, front } => {
                    let node = self.nodes.get_mut(&hwid).expect("node exists");
                    if front { node.queue.push_front(item) } else { node.queue.push_back(item) }
                },
                ProcessorAction::Log { level, message } => match level {
                    LogLevel::Debug => tracing::debug!(node = %hwid, "{message}"),
                    LogLevel::Warn => tracing::warn!(node = %hwid, "{message}"),
                },
            }
        }
    }

    /// True if every node's queue currently holds only `WaitRoute`/
    /// `WaitResponse` items (i.e. the cluster can make no further progress
    /// without time passing).
    fn all_nodes_stalled(&self) -> bool {
        self.nodes.values().all(|n| n.queue.iter().all(|i| matches!(i.kind, WorkKind::WaitRoute | WorkKind::WaitResponse)))
    }

    /// Drains every node's queue in round-robin order until the whole
    /// cluster is either empty or stalled purely on `WaitRoute`/
    /// `WaitResponse` items, jumping the virtual clock directly past the
    /// next timeout when that happens, and repeating — up to `max_rounds`
    /// clock jumps, a safety net against a scenario that can truly never
    /// quiesce.
    ///
    /// # Panics
    ///
    /// Panics if the cluster has not quiesced after `max_rounds` clock
    /// jumps — almost certainly a scenario bug rather than a slow but
    /// converging one.
    pub fn run_until_quiescent(&mut self, max_rounds: usize) {
        let hwids: Vec<Hwid> = self.nodes.keys().copied().collect();
        for _ in 0..max_rounds {
            let mut made_progress = true;
            while made_progress {
                made_progress = false;
                for &hwid in &hwids {
                    while self.step_node(hwid) {
                        made_progress = true;
                    }
                }
            }
            if self.nodes.values().all(|n| n.queue.is_empty()) {
                return;
            }
            if self.all_nodes_stalled() {
                // Every remaining item is a timed wait with no route/
                // confirmation arriving; nothing short of time passing
                // changes that, so skip straight past the next deadline.
                self.env.advance(MeshConfig::default().max_wait + Duration::from_millis(1));
                continue;
            }
        }
        panic!("cluster did not quiesce after {max_rounds} clock jumps");
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.env.now()
    }
}
