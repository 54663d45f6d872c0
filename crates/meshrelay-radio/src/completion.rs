//! The completion signal bridging a driver's async send-status callback
//! back into the `Transmit` execution that is waiting on it (spec §4.4,
//! §9's "completion signalling" note).

use std::sync::Mutex;
use std::time::Duration;

use meshrelay_core::CompletionStatus;
use tokio::sync::Notify;

/// Single-slot completion signal, reset before every send.
///
/// A concrete [`crate::RadioAdapter`] holds a shared handle to this and
/// calls [`Completion::signal`] from whatever context its own send-status
/// callback fires in (for ESP-NOW, `esp_now_register_send_cb`'s handler).
/// [`crate::RadioLink`] resets it immediately before `send_raw` so a late
/// signal from a previous send can never be misattributed to the next one.
#[derive(Debug, Default)]
pub struct Completion {
    result: Mutex<Option<CompletionStatus>>,
    notify: Notify,
}

impl Completion {
    /// Creates an unset completion signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears any prior result. Must be called immediately before the
    /// `send_raw` whose completion this signal will report.
    #[allow(clippy::missing_panics_doc)]
    pub fn reset(&self) {
        *self.result.lock().expect("completion mutex poisoned") = None;
    }

    /// Records the outcome and wakes any waiter.
    #[allow(clippy::missing_panics_doc)]
    pub fn signal(&self, status: CompletionStatus) {
        *self.result.lock().expect("completion mutex poisoned") = Some(status);
        self.notify.notify_one();
    }

    /// Waits for a result up to `timeout`, treating silence as
    /// [`CompletionStatus::Fail`] (spec §4.4: "expiry with no signal is
    /// treated as Fail").
    #[allow(clippy::missing_panics_doc)]
    pub async fn wait(&self, timeout: Duration) -> CompletionStatus {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(status) = *self.result.lock().expect("completion mutex poisoned") {
                return status;
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return CompletionStatus::Fail;
            }
            // A notification racing the deadline just loops back around and
            // re-checks the (now tiny) remaining budget.
            let _ = tokio::time::timeout(remaining, self.notify.notified()).await;
        }
    }
}
