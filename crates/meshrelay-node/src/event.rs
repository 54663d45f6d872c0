//! The application-facing event bus.

use meshrelay_core::SendStatus;
use meshrelay_proto::Hwid;

/// Events delivered to the application (spec §6's "one event base").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshEvent {
    /// A `Broadcast` or `Unicast` addressed to this node arrived.
    OnRecv {
        /// The node that originated the payload.
        source: Hwid,
        /// Application bytes.
        payload: Vec<u8>,
    },
    /// The outcome of a self-originated send. Emitted only for
    /// self-originated `Unicast` (after confirmation or timeout) and
    /// `Broadcast` (immediately on TX success) — never for forwarded
    /// traffic.
    OnSend {
        /// The original destination (`Hwid::BROADCAST` for a Broadcast).
        target: Hwid,
        /// Success or failure.
        status: SendStatus,
    },
}
