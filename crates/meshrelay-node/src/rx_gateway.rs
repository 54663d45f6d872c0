//! The radio RX callback's mesh-layer half.
//!
//! A concrete [`meshrelay_radio::RadioAdapter`]'s driver calls
//! [`RxGateway::on_frame`] from whatever context its own receive
//! interrupt/task runs in (spec §5's "Radio RX context"). This performs the
//! bounded amount of work spec §4.4 allows there — size check, mesh-id
//! check, queue-pressure check, duplicate check/insert against the seen-ID
//! cache — and, on pass, pushes an `OnRecv` work item to the front of the
//! queue. It must never block for long: the queue push is a plain
//! synchronous call, not an awaited one.
//!
//! The queue-pressure check runs before the duplicate check: a frame
//! dropped for congestion must not be recorded as seen, or a later retry
//! of the same `message_id` would be rejected as a duplicate once the
//! queue drains.
//!
//! Generic over [`Environment`] (rather than hardcoded to
//! `std::time::Instant`) so `meshrelay-harness` can drive the identical
//! gateway over its seeded virtual clock.

use std::sync::Arc;

use meshrelay_core::{Environment, Queue, SeenIdCache, WorkItem, WorkKind};
use meshrelay_proto::{Frame, FrameCodecError, Hwid, MeshId};
use meshrelay_radio::RecvSink;

/// Bridges a driver's raw receive callback into the mesh work queue.
pub struct RxGateway<E: Environment> {
    queue: Arc<Queue<E::Instant>>,
    seen_ids: Arc<SeenIdCache>,
    mesh_id: MeshId,
    env: E,
}

impl<E: Environment> RxGateway<E> {
    /// Wraps `queue`/`seen_ids` for a node configured with `mesh_id`.
    pub(crate) fn new(queue: Arc<Queue<E::Instant>>, seen_ids: Arc<SeenIdCache>, mesh_id: MeshId, env: E) -> Self {
        Self { queue, seen_ids, mesh_id, env }
    }
}

impl<E: Environment> RecvSink for RxGateway<E> {
    fn on_frame(&self, sender: Hwid, bytes: &[u8]) {
        let frame = match Frame::decode(bytes, self.mesh_id, sender) {
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

        if !self.queue.is_send_admissible() {
            tracing::warn!(message_id = %frame.message_id, "queue near-full, dropping inbound frame");
            return;
        }

        if self.seen_ids.check_and_insert(frame.message_id) {
            tracing::debug!(message_id = %frame.message_id, "dropping duplicate frame");
            return;
        }

        self.queue.push_front(WorkItem::new(WorkKind::OnRecv, self.env.now(), frame));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use meshrelay_core::MeshConfig;
    use meshrelay_proto::{MessageId, MessageType};

    use super::*;
    use crate::system_env::SystemEnv;

    fn gateway() -> (RxGateway<SystemEnv>, Arc<Queue<Instant>>) {
        let config = MeshConfig { mesh_id: MeshId(1), ..MeshConfig::default() };
        let queue = Arc::new(Queue::new(config.queue_size));
        let seen_ids = Arc::new(SeenIdCache::new(config.seen_id_capacity));
        (RxGateway::new(Arc::clone(&queue), seen_ids, config.mesh_id, SystemEnv::new()), queue)
    }

    fn wire(mesh_id: u32, message_id: u32) -> Vec<u8> {
        Frame {
            message_type: MessageType::Broadcast,
            mesh_id: MeshId(mesh_id),
            message_id: MessageId(message_id),
            confirm_id: MessageId::UNSET,
            original_target: Hwid::BROADCAST,
            original_sender: Hwid([1; 6]),
            sender: Hwid::ZERO,
            payload: vec![1, 2, 3],
        }
        .encode()
    }

    #[test]
    fn accepts_a_well_formed_frame() {
        let (gateway, queue) = gateway();
        gateway.on_frame(Hwid([2; 6]), &wire(1, 5));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn drops_wrong_mesh() {
        let (gateway, queue) = gateway();
        gateway.on_frame(Hwid([2; 6]), &wire(99, 5));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn drops_truncated_frame() {
        let (gateway, queue) = gateway();
        let mut bytes = wire(1, 5);
        bytes.pop();
        gateway.on_frame(Hwid([2; 6]), &bytes);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn drops_duplicate_message_id() {
        let (gateway, queue) = gateway();
        gateway.on_frame(Hwid([2; 6]), &wire(1, 5));
        gateway.on_frame(Hwid([3; 6]), &wire(1, 5));
        assert_eq!(queue.len(), 1, "second delivery of the same message_id must not enqueue");
    }

    #[test]
    fn drops_inbound_frame_once_queue_is_half_full() {
        let (gateway, queue) = gateway();
        let half = queue.capacity() / 2;
        for id in 0..half as u32 {
            gateway.on_frame(Hwid([2; 6]), &wire(1, id + 1));
        }
        assert_eq!(queue.len(), half);

        gateway.on_frame(Hwid([2; 6]), &wire(1, half as u32 + 1));

        assert_eq!(queue.len(), half, "queue at half capacity must reject further inbound frames");
    }

    #[tokio::test]
    async fn congestion_drop_does_not_poison_the_seen_id_cache() {
        let (gateway, queue) = gateway();
        let half = queue.capacity() / 2;
        for id in 0..half as u32 {
            gateway.on_frame(Hwid([2; 6]), &wire(1, id + 1));
        }

        // The queue is now at the admission threshold; this delivery is
        // shed for congestion, not recorded as seen.
        gateway.on_frame(Hwid([2; 6]), &wire(1, 999));
        assert_eq!(queue.len(), half);

        // Draining frees capacity; the same message_id must now be
        // accepted rather than rejected as a stale duplicate.
        for _ in 0..half {
            queue.dequeue().await;
        }
        gateway.on_frame(Hwid([2; 6]), &wire(1, 999));
        assert_eq!(queue.len(), 1, "a congestion-dropped message_id must be retried successfully once the queue drains");
    }
}
