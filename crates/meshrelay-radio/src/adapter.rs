//! The raw link-driver contract (spec §4.4, §6's "radio adapter contract
//! (consumed)"), mirroring the three `esp_now_*` calls the original
//! component drove directly plus its single global receive callback.

use meshrelay_proto::Hwid;

use crate::error::RadioError;

/// A sink the driver hands every received frame's raw bytes to.
///
/// Mirrors `esp_now_register_recv_cb`'s single global callback: a driver
/// registers one sink at construction and invokes it from whatever
/// context its own RX interrupt/task runs in.
pub trait RecvSink: Send + Sync {
    /// Called once per frame the driver receives off the air, before any
    /// mesh-id or size validation.
    fn on_frame(&self, sender: Hwid, bytes: &[u8]);
}

/// The raw link-layer operations `meshrelay-radio` drives directly.
///
/// Implementations own whatever physical or simulated link carries bytes
/// between nodes. This crate never assumes more about the link than these
/// three calls plus a [`RecvSink`] registration.
pub trait RadioAdapter: Send {
    /// Registers `peer` with the driver before a send to it. ESP-NOW
    /// requires this even for connectionless sends.
    fn add_peer(&mut self, peer: Hwid) -> impl std::future::Future<Output = Result<(), RadioError>> + Send;

    /// Hands `bytes` to the driver for transmission to `peer`. Returning
    /// `Ok` only means the driver accepted the send, not that it arrived —
    /// arrival is reported asynchronously through the completion signal
    /// the caller wires up separately (see [`crate::RadioLink`]).
    fn send_raw(
        &mut self,
        peer: Hwid,
        bytes: &[u8],
    ) -> impl std::future::Future<Output = Result<(), RadioError>> + Send;

    /// Unregisters `peer` once its transmission has completed.
    fn del_peer(&mut self, peer: Hwid) -> impl std::future::Future<Output = Result<(), RadioError>> + Send;

    /// Configures the radio channel (spec §6's `set-channel(channel)`,
    /// validated to `1..=14` by [`meshrelay_core::MeshConfig::validate`]
    /// before this is ever called). Called once at init, before any peer is
    /// registered.
    fn set_channel(&mut self, channel: u8) -> impl std::future::Future<Output = Result<(), RadioError>> + Send;
}
