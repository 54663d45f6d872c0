//! The unit of work the Processor dispatches.

use meshrelay_proto::Frame;

/// What kind of work a [`WorkItem`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkKind {
    /// A frame ready to be transmitted (new send, forward, or retry after
    /// route discovery).
    ToSend,
    /// A frame just received off the radio, not yet dispatched.
    OnRecv,
    /// A `Unicast`/`DeliveryConfirm` send waiting for a route to appear in
    /// the routing table.
    WaitRoute,
    /// A self-originated `Unicast` send waiting for its `DeliveryConfirm`
    /// or a timeout.
    WaitResponse,
}

/// A single work item on the queue.
#[derive(Debug, Clone)]
pub struct WorkItem<I> {
    /// Which dispatch path this item takes.
    pub kind: WorkKind,
    /// When this item was enqueued in its *current* kind — reset when a
    /// `WaitRoute`/`WaitResponse` item is re-enqueued unchanged for passive
    /// polling, used to measure `max_wait`.
    pub enqueue_time: I,
    /// The frame this item carries.
    pub frame: Frame,
}

impl<I: Copy> WorkItem<I> {
    /// Creates a new work item of the given kind.
    pub fn new(kind: WorkKind, enqueue_time: I, frame: Frame) -> Self {
        Self { kind, enqueue_time, frame }
    }
}
