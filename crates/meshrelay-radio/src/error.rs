//! Radio adapter error taxonomy.

use meshrelay_proto::Hwid;
use thiserror::Error;

/// Errors a concrete [`crate::RadioAdapter`] can raise from the link-layer
/// operations the original `esp_now_*` calls map to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadioError {
    /// `add_peer` failed — the driver's peer table is full or the address
    /// is malformed.
    #[error("failed to register peer {0}")]
    AddPeerFailed(Hwid),

    /// `send_raw` was rejected before any completion signal could arrive
    /// (e.g. the driver's transmit queue is full).
    #[error("send to {0} was rejected by the driver")]
    SendRejected(Hwid),

    /// The underlying driver is not initialized (`deinit` was called, or
    /// `init` never completed).
    #[error("radio driver not initialized")]
    NotInitialized,
}
