//! Production "glue" wrapping [`meshrelay_core`]'s Sans-IO `Processor` with
//! real I/O: a Tokio task, the system environment, a concrete
//! [`meshrelay_radio::RadioAdapter`] supplied by the embedding application,
//! and an application-facing event bus.
//!
//! [`run_processor_loop`] is the reusable "driver vs runtime" split —
//! `meshrelay-harness` drives the identical loop with a seeded
//! [`meshrelay_core::Environment`] and an in-memory link simulator instead.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod event;
mod loopback;
mod rx_gateway;
pub mod system_env;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use error::MeshError;
pub use event::MeshEvent;
pub use loopback::LoopbackAdapter;
use meshrelay_core::{
    Environment, LogLevel, MeshConfig, Processor, ProcessorAction, Queue, SeenIdCache, WorkItem, WorkKind,
};
use meshrelay_proto::{Frame, Hwid, MessageId, MessageType};
use meshrelay_radio::{Completion, RadioAdapter, RadioLink};
pub use rx_gateway::RxGateway;
pub use system_env::SystemEnv;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Default capacity of the [`MeshEvent`] broadcast channel. Generous
/// relative to `queue_size` so a slow subscriber cannot stall the
/// Processor task (`tokio::sync::broadcast::Sender::send` never blocks;
/// a lagging receiver just drops the oldest events, per `broadcast`'s own
/// semantics).
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A running mesh node: the Processor task, its queue, and the event bus.
///
/// `E` is the [`Environment`] (real time/RNG in production, seeded virtual
/// time under `meshrelay-harness`). `A` is the concrete
/// [`meshrelay_radio::RadioAdapter`] the embedding application supplies.
pub struct MeshNode<E: Environment, A: RadioAdapter> {
    local_hwid: Hwid,
    mesh_id: meshrelay_proto::MeshId,
    queue: Arc<Queue<E::Instant>>,
    event_tx: broadcast::Sender<MeshEvent>,
    env: E,
    task: Option<JoinHandle<()>>,
    initialized: Arc<AtomicBool>,
    _adapter: std::marker::PhantomData<A>,
}

impl<E: Environment, A: RadioAdapter + 'static> MeshNode<E, A> {
    /// Validates `config`, spawns the Processor task, and registers `radio`
    /// as the link the Processor's `Transmit` actions execute against.
    ///
    /// Returns an [`RxGateway`] the caller must hand to `radio`'s receive
    /// callback registration: every inbound frame must reach
    /// [`RxGateway::on_frame`] before this node can do anything with it.
    ///
    /// # Errors
    ///
    /// [`MeshError::InvalidArg`] if `config` fails validation.
    /// [`MeshError::WifiNotReady`] if `radio` rejects the initial
    /// `set_channel` call.
    pub async fn init_with(
        config: MeshConfig,
        local_hwid: Hwid,
        env: E,
        mut radio: A,
        completion: Arc<Completion>,
    ) -> Result<(Self, RxGateway<E>), MeshError> {
        config.validate()?;

        radio.set_channel(config.channel).await.map_err(|_| MeshError::WifiNotReady)?;

        let queue: Arc<Queue<E::Instant>> = Arc::new(Queue::new(config.queue_size));
        let seen_ids = Arc::new(SeenIdCache::new(config.seen_id_capacity));
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let mesh_id = config.mesh_id;
        let processor = Processor::new(local_hwid, &config, Arc::clone(&seen_ids), env.clone());
        let radio_link = RadioLink::new(radio, completion);

        // `task_priority`/`stack_size` are accepted and validated for
        // embedders running under an RTOS executor; a hosted
        // Tokio runtime has no native equivalent, so they are recorded
        // here only as informational fields rather than passed to the
        // scheduler.
        tracing::info!(
            task_priority = config.task_priority,
            stack_size = config.stack_size,
            "spawning processor task"
        );
        let task_queue = Arc::clone(&queue);
        let task_event_tx = event_tx.clone();
        let task = tokio::spawn(run_processor_loop(processor, radio_link, task_queue, task_event_tx));

        let initialized = Arc::new(AtomicBool::new(true));
        let gateway = RxGateway::new(Arc::clone(&queue), seen_ids, mesh_id, env.clone());

        Ok((
            Self {
                local_hwid,
                mesh_id,
                queue,
                event_tx,
                env,
                task: Some(task),
                initialized,
                _adapter: std::marker::PhantomData,
            },
            gateway,
        ))
    }

    /// Subscribes to [`MeshEvent`]s (`OnRecv`/`OnSend`).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MeshEvent> {
        self.event_tx.subscribe()
    }

    /// This node's own hardware address.
    #[must_use]
    pub fn local_hwid(&self) -> Hwid {
        self.local_hwid
    }

    /// Submits `payload` for delivery to `target`.
    ///
    /// `target == Hwid::BROADCAST` floods to every reachable node; any other
    /// value is a unicast with end-to-end delivery confirmation.
    ///
    /// # Errors
    ///
    /// - [`MeshError::NotInitialized`] if `deinit` has already run.
    /// - [`MeshError::InvalidArg`] if `payload` is empty or exceeds
    ///   [`meshrelay_proto::MAX_PAYLOAD`].
    /// - [`MeshError::QueueFull`] if the queue has less than half its
    ///   capacity free (spec §4.2's back-pressure signal).
    pub fn send(&self, target: Hwid, payload: Vec<u8>) -> Result<(), MeshError> {
        if !self.initialized.load(Ordering::Acquire) {
            return Err(MeshError::NotInitialized);
        }
        if payload.is_empty() {
            return Err(MeshError::InvalidArg("payload must not be empty".to_string()));
        }
        if payload.len() > meshrelay_proto::MAX_PAYLOAD {
            return Err(MeshError::InvalidArg(format!(
                "payload of {} bytes exceeds MAX_PAYLOAD ({})",
                payload.len(),
                meshrelay_proto::MAX_PAYLOAD
            )));
        }
        if !self.queue.is_send_admissible() {
            return Err(MeshError::QueueFull);
        }

        let message_type = if target.is_broadcast() { MessageType::Broadcast } else { MessageType::Unicast };
        let frame = Frame {
            message_type,
            mesh_id: self.mesh_id,
            message_id: MessageId(self.env.fresh_message_id()),
            confirm_id: MessageId::UNSET,
            original_target: target,
            original_sender: self.local_hwid,
            sender: Hwid::ZERO,
            payload,
        };
        self.queue.push_back(WorkItem::new(WorkKind::ToSend, self.env.now(), frame));
        Ok(())
    }

    /// Tears down the Processor task. Idempotent: a second call returns
    /// [`MeshError::NotInitialized`].
    ///
    /// # Errors
    ///
    /// [`MeshError::NotInitialized`] if already torn down.
    pub async fn deinit(&mut self) -> Result<(), MeshError> {
        if !self.initialized.swap(false, Ordering::AcqRel) {
            return Err(MeshError::NotInitialized);
        }
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        Ok(())
    }
}

/// Drives the Processor: dequeues work items, dispatches them, and executes
/// the resulting [`ProcessorAction`]s — transmitting via `radio_link`,
/// delivering events to `event_tx`, and feeding follow-up actions (a
/// `Transmit`'s completion, a priority requeue) back through the same
/// executor. This never returns; the caller aborts its `JoinHandle` to stop
/// it (spec §5: `deinit` "tears down the task and all queues").
///
/// Public so `meshrelay-harness` can drive the same loop over a seeded
/// [`Environment`] and an in-memory link simulator instead of
/// [`SystemEnv`]/a production [`RadioAdapter`].
pub async fn run_processor_loop<E: Environment, A: RadioAdapter>(
    mut processor: Processor<E>,
    mut radio_link: RadioLink<A>,
    queue: Arc<Queue<E::Instant>>,
    event_tx: broadcast::Sender<MeshEvent>,
) {
    loop {
        let item = queue.dequeue().await;
        let actions = processor.dispatch(item);
        execute_actions(&mut processor, &mut radio_link, &queue, &event_tx, actions).await;
    }
}

async fn execute_actions<E: Environment, A: RadioAdapter>(
    processor: &mut Processor<E>,
    radio_link: &mut RadioLink<A>,
    queue: &Queue<E::Instant>,
    event_tx: &broadcast::Sender<MeshEvent>,
    actions: Vec<ProcessorAction<E::Instant>>,
) {
    let mut pending: VecDeque<ProcessorAction<E::Instant>> = actions.into();
    while let Some(action) = pending.pop_front() {
        match action {
            ProcessorAction::Transmit { peer, frame } => {
                let status = radio_link.execute_transmit(peer, &frame).await;
                pending.extend(processor.finish_send(frame, status));
            },
            ProcessorAction::EmitRecv { source, payload } => {
                tracing::info!(%source, len = payload.len(), "delivering received payload to application");
                let _ = event_tx.send(MeshEvent::OnRecv { source, payload });
            },
            ProcessorAction::EmitSend { target, status } => {
                tracing::info!(%target, ?status, "reporting send outcome to application");
                let _ = event_tx.send(MeshEvent::OnSend { target, status });
            },
            ProcessorAction::Requeue { item, front } => {
                if front { queue.push_front(item) } else { queue.push_back(item) }
            },
            ProcessorAction::Log { level, message } => match level {
                LogLevel::Debug => tracing::debug!("{message}"),
                LogLevel::Warn => tracing::warn!("{message}"),
            },
        }
    }
}
