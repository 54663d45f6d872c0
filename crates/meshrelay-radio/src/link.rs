//! Executes one `Transmit` action: `add_peer -> send_raw -> wait -> del_peer`
//!, the cycle the original component ran synchronously inside
//! its own task for every queued frame.

use std::{sync::Arc, time::Duration};

use meshrelay_core::CompletionStatus;
use meshrelay_proto::{Frame, Hwid};

use crate::{adapter::RadioAdapter, completion::Completion};

/// How long a `Transmit` waits for the driver's completion signal before
/// treating the send as failed.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_millis(50);

/// Wraps a concrete [`RadioAdapter`] with the completion signal it reports
/// through, turning `add_peer`/`send_raw`/`del_peer` plus a side-channel
/// signal into one `async fn` the `meshrelay-node` runtime loop calls per
/// `ProcessorAction::Transmit`.
pub struct RadioLink<A: RadioAdapter> {
    adapter: A,
    completion: Arc<Completion>,
}

impl<A: RadioAdapter> RadioLink<A> {
    /// Wraps `adapter`, sharing `completion` with it so the adapter's own
    /// send-status callback can report into the same signal this link
    /// waits on.
    pub fn new(adapter: A, completion: Arc<Completion>) -> Self {
        Self { adapter, completion }
    }

    /// Transmits `frame` to `peer`, returning once the completion signal
    /// fires or [`COMPLETION_TIMEOUT`] elapses.
    pub async fn execute_transmit(&mut self, peer: Hwid, frame: &Frame) -> CompletionStatus {
        if self.adapter.add_peer(peer).await.is_err() {
            return CompletionStatus::Fail;
        }

        self.completion.reset();
        let wire = frame.encode();
        let status = if self.adapter.send_raw(peer, &wire).await.is_err() {
            CompletionStatus::Fail
        } else {
            self.completion.wait(COMPLETION_TIMEOUT).await
        };

        let _ = self.adapter.del_peer(peer).await;
        status
    }
}
