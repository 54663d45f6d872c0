//! Bounded FIFO work queue with priority (head) enqueue.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::workitem::WorkItem;

/// Bounded, multi-producer single-consumer queue of [`WorkItem`]s.
///
/// `push_back`/`push_front` are plain synchronous calls, usable from any
/// context (spec §5's "application context" and "radio RX context" — the
/// latter may run from an interrupt-adjacent task that cannot await a lock).
/// The Processor is the single consumer and suspends in `dequeue` with an
/// infinite wait — one of the only two places the Processor is allowed to
/// suspend.
#[derive(Debug)]
pub struct Queue<I> {
    capacity: usize,
    items: Mutex<VecDeque<WorkItem<I>>>,
    notify: Notify,
}

impl<I> Queue<I> {
    /// Creates an empty queue with room for `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be non-zero");
        Self { capacity, items: Mutex::new(VecDeque::with_capacity(capacity)), notify: Notify::new() }
    }

    /// Enqueues at the tail: new user sends, and passive re-polling of
    /// `WaitRoute`/`WaitResponse` items.
    #[allow(clippy::missing_panics_doc)]
    pub fn push_back(&self, item: WorkItem<I>) {
        self.items.lock().expect("queue mutex poisoned").push_back(item);
        self.notify.notify_one();
    }

    /// Enqueues at the head: priority reschedules — a just-generated
    /// control frame (DeliveryConfirm after local delivery, forwarded
    /// SearchRequest/SearchResponse) or a `WaitRoute` item whose route just
    /// resolved (spec §9: "guarantees that responses to just-processed
    /// frames are not starved behind unrelated waits").
    #[allow(clippy::missing_panics_doc)]
    pub fn push_front(&self, item: WorkItem<I>) {
        self.items.lock().expect("queue mutex poisoned").push_front(item);
        self.notify.notify_one();
    }

    /// Blocks until an item is available, then removes and returns it.
    #[allow(clippy::missing_panics_doc)]
    pub async fn dequeue(&self) -> WorkItem<I> {
        loop {
            {
                let mut guard = self.items.lock().expect("queue mutex poisoned");
                if let Some(item) = guard.pop_front() {
                    return item;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Current occupancy.
    #[allow(clippy::missing_panics_doc)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().expect("queue mutex poisoned").len()
    }

    /// True if the queue currently holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True if occupancy has reached or exceeded half of capacity.
    ///
    /// This is the back-pressure signal: spec §4.2 has the public `send()`
    /// API reject new work with `QueueFull` once free space drops below
    /// half of total capacity (well before the queue is actually full, to
    /// leave headroom for in-flight control frames like DeliveryConfirm and
    /// SearchRequest that must not themselves be dropped).
    #[must_use]
    pub fn is_send_admissible(&self) -> bool {
        self.len() < self.capacity / 2
    }
}

#[cfg(test)]
mod tests {
    use meshrelay_proto::{Frame, Hwid, MeshId, MessageId, MessageType};

    use super::*;
    use crate::workitem::WorkKind;

    fn sample_item() -> WorkItem<u64> {
        WorkItem::new(
            WorkKind::ToSend,
            0,
            Frame {
                message_type: MessageType::Broadcast,
                mesh_id: MeshId(1),
                message_id: MessageId(1),
                confirm_id: MessageId::UNSET,
                original_target: Hwid::BROADCAST,
                original_sender: Hwid::ZERO,
                sender: Hwid::ZERO,
                payload: vec![],
            },
        )
    }

    #[test]
    fn fifo_order_is_preserved() {
        let queue: Queue<u64> = Queue::new(4);
        for i in 0..3 {
            let mut item = sample_item();
            item.enqueue_time = i;
            queue.push_back(item);
        }
        for expected in 0..3 {
            assert_eq!(queue.items.lock().expect("mutex poisoned").pop_front().unwrap().enqueue_time, expected);
        }
    }

    #[test]
    fn push_front_jumps_the_line() {
        let queue: Queue<u64> = Queue::new(4);
        let mut tail = sample_item();
        tail.enqueue_time = 1;
        queue.push_back(tail);
        let mut head = sample_item();
        head.enqueue_time = 2;
        queue.push_front(head);

        assert_eq!(queue.items.lock().expect("mutex poisoned")[0].enqueue_time, 2);
        assert_eq!(queue.items.lock().expect("mutex poisoned")[1].enqueue_time, 1);
    }

    #[test]
    fn admissibility_tracks_half_capacity() {
        let queue: Queue<u64> = Queue::new(4);
        assert!(queue.is_send_admissible());
        queue.push_back(sample_item());
        assert!(queue.is_send_admissible());
        queue.push_back(sample_item());
        assert!(!queue.is_send_admissible());
    }

    #[tokio::test]
    async fn dequeue_waits_for_an_item() {
        let queue = std::sync::Arc::new(Queue::<u64>::new(4));
        let producer = queue.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            producer.push_back(sample_item());
        });

        let item = queue.dequeue().await;
        assert_eq!(item.enqueue_time, 0);
        handle.await.expect("producer task should not panic");
    }

    #[test]
    fn push_is_usable_from_a_non_async_context() {
        let queue: Queue<u64> = Queue::new(4);
        queue.push_back(sample_item());
        assert_eq!(queue.len(), 1);
    }
}
