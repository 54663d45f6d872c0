//! The Sans-IO dispatch engine.
//!
//! [`Processor`] owns the per-node caches and decides, for each dequeued
//! [`WorkItem`], what happens next. It holds no I/O handle: a `ToSend`
//! item that has a route resolves to a [`ProcessorAction::Transmit`]
//! action rather than a direct radio call, and the outcome comes back
//! later through [`Processor::finish_send`]. The surrounding runtime
//! (`meshrelay-node`, or the deterministic `meshrelay-harness`) is the only
//! piece that ever touches the radio adapter, the queue, or the
//! application event bus — it executes the actions the Processor returns.

use std::sync::Arc;

use meshrelay_proto::{Frame, Hwid, MeshId, MessageId, MessageType};

use crate::{
    cache::{PendingConfirmCache, RoutingTable, SeenIdCache},
    config::MeshConfig,
    env::Environment,
    radio::CompletionStatus,
    workitem::{WorkItem, WorkKind},
};

/// Outcome of a self-originated `Unicast` send, reported to the
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    /// The frame was delivered and (for `Unicast`) acknowledged.
    Success,
    /// The radio could not deliver the frame, or no route/confirmation
    /// arrived before `max_wait` elapsed.
    Fail,
}

/// Severity for a [`ProcessorAction::Log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Routine state changes: route installed/evicted, retry scheduled.
    Debug,
    /// Conditions worth a human's attention but not an error: a malformed
    /// peer frame that was still processable.
    Warn,
}

/// Something the Processor wants its caller to do after a dispatch.
///
/// The caller executes these against the real radio, queue, and event bus;
/// the Processor never touches any of them directly.
#[derive(Debug, Clone)]
pub enum ProcessorAction<I> {
    /// Hand `frame` to the radio adapter addressed to `peer` and report the
    /// outcome back via [`Processor::finish_send`].
    Transmit {
        /// The immediate next hop (`Hwid::BROADCAST` for flooded types).
        peer: Hwid,
        /// The frame to transmit, unchanged on the wire.
        frame: Frame,
    },
    /// Deliver `payload` to the application: a `Broadcast` or `Unicast`
    /// addressed to this node.
    EmitRecv {
        /// The node that originated the payload.
        source: Hwid,
        /// Application bytes.
        payload: Vec<u8>,
    },
    /// Report the outcome of a self-originated send.
    EmitSend {
        /// The original destination (`Hwid::BROADCAST` for a Broadcast).
        target: Hwid,
        /// Success or failure.
        status: SendStatus,
    },
    /// Put `item` back on the work queue.
    Requeue {
        /// The item to requeue.
        item: WorkItem<I>,
        /// `true` for a priority (head) enqueue, `false` for the tail.
        front: bool,
    },
    /// A line for the caller to hand to its logging backend.
    Log {
        /// Severity.
        level: LogLevel,
        /// Human-readable message.
        message: String,
    },
}

/// The per-node dispatch engine.
pub struct Processor<E: Environment> {
    local_hwid: Hwid,
    mesh_id: MeshId,
    max_wait: std::time::Duration,
    seen_ids: Arc<SeenIdCache>,
    routing_table: RoutingTable,
    pending_confirms: PendingConfirmCache,
    env: E,
}

impl<E: Environment> Processor<E> {
    /// Builds a processor for `local_hwid` from a validated `config`.
    ///
    /// `seen_ids` is shared with the radio RX callback (spec §4.3: it is
    /// the one cache touched outside the Processor's own task), so it is
    /// constructed by the caller and handed in as an `Arc`.
    pub fn new(local_hwid: Hwid, config: &MeshConfig, seen_ids: Arc<SeenIdCache>, env: E) -> Self {
        Self {
            local_hwid,
            mesh_id: config.mesh_id,
            max_wait: config.max_wait,
            seen_ids,
            routing_table: RoutingTable::new(config.route_capacity),
            pending_confirms: PendingConfirmCache::new(config.queue_size),
            env,
        }
    }

    /// Dispatches one work item, returning the actions the caller must
    /// carry out.
    pub fn dispatch(&mut self, item: WorkItem<E::Instant>) -> Vec<ProcessorAction<E::Instant>> {
        match item.kind {
            WorkKind::ToSend => self.handle_to_send(item.frame),
            WorkKind::OnRecv => self.handle_on_recv(item.frame),
            WorkKind::WaitRoute => self.handle_wait_route(item),
            WorkKind::WaitResponse => self.handle_wait_response(item),
        }
    }

    /// Reports the outcome of a previously issued
    /// [`ProcessorAction::Transmit`] for `frame`.
    pub fn finish_send(
        &mut self,
        frame: Frame,
        status: CompletionStatus,
    ) -> Vec<ProcessorAction<E::Instant>> {
        match status {
            CompletionStatus::Success => self.on_send_success(frame),
            CompletionStatus::Fail => self.on_send_fail(frame),
        }
    }

    /// Number of routes currently cached. Exposed for invariant checks
    /// (spec §8 invariant 2's cache-bounds property) in `meshrelay-harness`.
    #[must_use]
    pub fn routing_table_len(&self) -> usize {
        self.routing_table.len()
    }

    /// Number of confirmations currently pending redemption by a queued
    /// `WaitResponse` item. Exposed for the same reason as
    /// [`Self::routing_table_len`].
    #[must_use]
    pub fn pending_confirm_len(&self) -> usize {
        self.pending_confirms.len()
    }

    /// Directly installs a routing-table entry, bypassing discovery.
    ///
    /// Used by `meshrelay-harness` to pre-populate a node's table for
    /// scenarios that start from a cached (possibly stale) route (spec §8
    /// S1, S3) rather than requiring every test to run a full
    /// SearchRequest/SearchResponse exchange first.
    pub fn seed_route(&mut self, target: Hwid, next_hop: Hwid) {
        self.routing_table.upsert(target, next_hop);
    }

    fn make_search_request(&self, target: Hwid) -> Frame {
        Frame {
            message_type: MessageType::SearchRequest,
            mesh_id: self.mesh_id,
            message_id: MessageId(self.env.fresh_message_id()),
            confirm_id: MessageId::UNSET,
            original_target: target,
            original_sender: self.local_hwid,
            sender: Hwid::ZERO,
            payload: Vec::new(),
        }
    }

    /// Requeues `frame` for a route to `target`: a `WaitRoute` item carrying
    /// the stalled frame, plus a priority-enqueued `SearchRequest` (spec
    /// §4.5's route-miss and Fail-retry paths share this exact shape).
    fn stall_for_route(&self, frame: Frame, target: Hwid) -> Vec<ProcessorAction<E::Instant>> {
        let now = self.env.now();
        vec![
            ProcessorAction::Requeue {
                item: WorkItem::new(WorkKind::WaitRoute, now, frame),
                front: false,
            },
            ProcessorAction::Requeue {
                item: WorkItem::new(WorkKind::ToSend, now, self.make_search_request(target)),
                front: true,
            },
        ]
    }

    fn handle_to_send(&mut self, frame: Frame) -> Vec<ProcessorAction<E::Instant>> {
        let is_originator = frame.original_sender == self.local_hwid;

        let next_hop = if frame.message_type.is_flooded() {
            if is_originator {
                self.seen_ids.insert(frame.message_id);
            }
            Hwid::BROADCAST
        } else {
            match self.routing_table.lookup(frame.original_target) {
                Some(next_hop) => next_hop,
                None => return self.stall_for_route(frame, frame.original_target),
            }
        };

        vec![ProcessorAction::Transmit { peer: next_hop, frame }]
    }

    fn on_send_success(&mut self, frame: Frame) -> Vec<ProcessorAction<E::Instant>> {
        if frame.original_sender != self.local_hwid {
            return Vec::new();
        }
        match frame.message_type {
            MessageType::Broadcast => {
                vec![ProcessorAction::EmitSend { target: Hwid::BROADCAST, status: SendStatus::Success }]
            }
            MessageType::Unicast => vec![ProcessorAction::Requeue {
                item: WorkItem::new(WorkKind::WaitResponse, self.env.now(), frame),
                front: false,
            }],
            MessageType::DeliveryConfirm | MessageType::SearchRequest | MessageType::SearchResponse => {
                Vec::new()
            }
        }
    }

    fn on_send_fail(&mut self, frame: Frame) -> Vec<ProcessorAction<E::Instant>> {
        if frame.message_type.is_flooded() {
            // A broadcast-class send has no single next hop to retry against.
            return Vec::new();
        }
        self.routing_table.evict(frame.original_target);
        let target = frame.original_target;
        let mut actions = vec![ProcessorAction::Log {
            level: LogLevel::Debug,
            message: format!("send to {target} failed, evicting route and re-searching"),
        }];
        actions.extend(self.stall_for_route(frame, target));
        actions
    }

    fn handle_on_recv(&mut self, frame: Frame) -> Vec<ProcessorAction<E::Instant>> {
        match frame.message_type {
            MessageType::Broadcast => self.handle_recv_broadcast(frame),
            MessageType::Unicast => self.handle_recv_unicast(frame),
            MessageType::DeliveryConfirm => self.handle_recv_delivery_confirm(frame),
            MessageType::SearchRequest => self.handle_recv_search_request(frame),
            MessageType::SearchResponse => self.handle_recv_search_response(frame),
        }
    }

    fn requeue_to_send(&self, frame: Frame, front: bool) -> ProcessorAction<E::Instant> {
        ProcessorAction::Requeue { item: WorkItem::new(WorkKind::ToSend, self.env.now(), frame), front }
    }

    fn handle_recv_broadcast(&mut self, frame: Frame) -> Vec<ProcessorAction<E::Instant>> {
        let mut actions = Vec::new();
        if frame.original_target.is_broadcast() {
            actions.push(ProcessorAction::EmitRecv {
                source: frame.original_sender,
                payload: frame.payload.clone(),
            });
        } else {
            let target = frame.original_target;
            actions.push(ProcessorAction::Log {
                level: LogLevel::Warn,
                message: format!(
                    "broadcast {} carries non-broadcast original_target {target}; rebroadcasting without local delivery",
                    frame.message_id
                ),
            });
        }
        actions.push(self.requeue_to_send(frame, false));
        actions
    }

    fn handle_recv_unicast(&mut self, frame: Frame) -> Vec<ProcessorAction<E::Instant>> {
        if frame.original_target != self.local_hwid {
            return vec![self.requeue_to_send(frame, true)];
        }
        let confirm = Frame {
            message_type: MessageType::DeliveryConfirm,
            mesh_id: self.mesh_id,
            message_id: MessageId(self.env.fresh_message_id()),
            confirm_id: frame.message_id,
            original_target: frame.original_sender,
            original_sender: self.local_hwid,
            sender: Hwid::ZERO,
            payload: Vec::new(),
        };
        vec![
            ProcessorAction::EmitRecv { source: frame.original_sender, payload: frame.payload.clone() },
            self.requeue_to_send(confirm, true),
        ]
    }

    fn handle_recv_delivery_confirm(&mut self, frame: Frame) -> Vec<ProcessorAction<E::Instant>> {
        if frame.original_target == self.local_hwid {
            self.pending_confirms.record(frame.confirm_id);
            Vec::new()
        } else {
            vec![self.requeue_to_send(frame, true)]
        }
    }

    fn handle_recv_search_request(&mut self, frame: Frame) -> Vec<ProcessorAction<E::Instant>> {
        self.routing_table.upsert(frame.original_sender, frame.sender);
        if frame.original_target != self.local_hwid {
            return vec![self.requeue_to_send(frame, true)];
        }
        let response = Frame {
            message_type: MessageType::SearchResponse,
            mesh_id: self.mesh_id,
            message_id: MessageId(self.env.fresh_message_id()),
            confirm_id: MessageId::UNSET,
            original_target: frame.original_sender,
            original_sender: self.local_hwid,
            sender: Hwid::ZERO,
            payload: Vec::new(),
        };
        vec![self.requeue_to_send(response, true)]
    }

    fn handle_recv_search_response(&mut self, frame: Frame) -> Vec<ProcessorAction<E::Instant>> {
        self.routing_table.upsert(frame.original_sender, frame.sender);
        if frame.original_target == self.local_hwid {
            // This node ran the search; its stalled WaitRoute item picks the
            // new route up on its own next poll.
            Vec::new()
        } else {
            vec![self.requeue_to_send(frame, true)]
        }
    }

    fn handle_wait_route(&mut self, item: WorkItem<E::Instant>) -> Vec<ProcessorAction<E::Instant>> {
        let WorkItem { frame, enqueue_time, .. } = item;
        if self.routing_table.lookup(frame.original_target).is_some() {
            return vec![ProcessorAction::Requeue {
                item: WorkItem::new(WorkKind::ToSend, self.env.now(), frame),
                front: false,
            }];
        }
        if self.env.now() - enqueue_time > self.max_wait {
            return self.give_up(frame);
        }
        vec![ProcessorAction::Requeue {
            item: WorkItem::new(WorkKind::WaitRoute, enqueue_time, frame),
            front: false,
        }]
    }

    fn handle_wait_response(&mut self, item: WorkItem<E::Instant>) -> Vec<ProcessorAction<E::Instant>> {
        let WorkItem { frame, enqueue_time, .. } = item;
        if self.pending_confirms.take(frame.message_id) {
            return vec![ProcessorAction::EmitSend {
                target: frame.original_target,
                status: SendStatus::Success,
            }];
        }
        if self.env.now() - enqueue_time > self.max_wait {
            return self.give_up(frame);
        }
        vec![ProcessorAction::Requeue {
            item: WorkItem::new(WorkKind::WaitResponse, enqueue_time, frame),
            front: false,
        }]
    }

    /// `WaitRoute`/`WaitResponse` timeout: report failure if this node
    /// originated the stalled send, otherwise drop silently — a forwarder
    /// has no one local to tell.
    fn give_up(&self, frame: Frame) -> Vec<ProcessorAction<E::Instant>> {
        if frame.original_sender == self.local_hwid {
            vec![ProcessorAction::EmitSend { target: frame.original_target, status: SendStatus::Fail }]
        } else {
            Vec::new()
        }
    }
}
