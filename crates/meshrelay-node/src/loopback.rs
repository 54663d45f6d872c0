//! A no-op [`RadioAdapter`] for the demo binary and this crate's own unit
//! tests: it reports every send as an immediate success instead of putting
//! bytes on any link.

use std::sync::Arc;

use meshrelay_core::CompletionStatus;
use meshrelay_proto::Hwid;
use meshrelay_radio::{Completion, RadioAdapter, RadioError};

/// An adapter with no peer table and no link: every `add_peer`/`del_peer`
/// succeeds trivially, and every `send_raw` immediately signals
/// [`CompletionStatus::Success`] on the shared completion handle rather than
/// transmitting anything.
pub struct LoopbackAdapter {
    completion: Arc<Completion>,
}

impl LoopbackAdapter {
    /// Wraps the same [`Completion`] handle the owning [`crate::MeshNode`]
    /// waits on, so its sends resolve without a real driver.
    #[must_use]
    pub fn new(completion: Arc<Completion>) -> Self {
        Self { completion }
    }
}

impl RadioAdapter for LoopbackAdapter {
    async fn add_peer(&mut self, _peer: Hwid) -> Result<(), RadioError> {
        Ok(())
    }

    async fn send_raw(&mut self, _peer: Hwid, _bytes: &[u8]) -> Result<(), RadioError> {
        self.completion.signal(CompletionStatus::Success);
        Ok(())
    }

    async fn del_peer(&mut self, _peer: Hwid) -> Result<(), RadioError> {
        Ok(())
    }

    async fn set_channel(&mut self, _channel: u8) -> Result<(), RadioError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_raw_signals_success_immediately() {
        let completion = Arc::new(Completion::new());
        let mut adapter = LoopbackAdapter::new(Arc::clone(&completion));
        adapter.add_peer(Hwid([1; 6])).await.expect("add_peer always succeeds");
        adapter.send_raw(Hwid([1; 6]), b"x").await.expect("send_raw always succeeds");
        adapter.del_peer(Hwid([1; 6])).await.expect("del_peer always succeeds");
        assert_eq!(
            completion.wait(std::time::Duration::from_millis(10)).await,
            CompletionStatus::Success
        );
    }
}
