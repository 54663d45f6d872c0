//! The fixed-layout wire frame.
//!
//! Layout on the wire, in order (homogeneous byte packing — every node in a
//! mesh is the same architecture family, so no endian conversion is needed
//! beyond picking one order and sticking to it):
//!
//! `[message_type: 1][mesh_id: 4][message_id: 4][confirm_id: 4]
//!  [original_target: 6][original_sender: 6][payload: 0..218][payload_len: 1]`
//!
//! `sender` (the previous hop) is never on the wire — the receiver fills it
//! in from the radio driver's RX callback metadata.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{
    error::{FrameCodecError, Result},
    hwid::Hwid,
    ids::{MeshId, MessageId},
    message_type::MessageType,
};

/// Maximum payload length in bytes. Every node sharing a `mesh_id` must
/// compile against the same value.
pub const MAX_PAYLOAD: usize = 218;

/// Fixed 25-byte head shared by every frame, before the variable payload.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
struct WireHead {
    message_type: u8,
    mesh_id: [u8; 4],
    message_id: [u8; 4],
    confirm_id: [u8; 4],
    original_target: [u8; 6],
    original_sender: [u8; 6],
}

impl WireHead {
    const SIZE: usize = 25;
}

/// A fully decoded protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Which of the five protocol messages this frame carries.
    pub message_type: MessageType,
    /// Network identifier; frames for a foreign mesh are dropped before a
    /// work item is ever created.
    pub mesh_id: MeshId,
    /// Identifier assigned by the frame's originator.
    pub message_id: MessageId,
    /// The `message_id` being acknowledged. Meaningful only for
    /// `DeliveryConfirm`; zero (unset) otherwise.
    pub confirm_id: MessageId,
    /// Final destination. `Hwid::BROADCAST` for Broadcast and for a
    /// SearchResponse addressed back to its originator.
    pub original_target: Hwid,
    /// The node that originated this frame (never changes as it is
    /// forwarded).
    pub original_sender: Hwid,
    /// The previous hop. Reconstructed from RX metadata, never on the wire.
    pub sender: Hwid,
    /// Application or control payload, at most [`MAX_PAYLOAD`] bytes.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Wire size of a frame carrying `payload_len` bytes of payload.
    #[must_use]
    pub fn wire_size(payload_len: usize) -> usize {
        WireHead::SIZE + payload_len + 1
    }

    /// Serialize this frame to its wire representation.
    ///
    /// `sender` is intentionally omitted (it is never transmitted).
    ///
    /// # Panics
    ///
    /// Panics if `payload.len() > MAX_PAYLOAD`. Callers are expected to have
    /// validated payload length at the `send()` boundary (spec §6,
    /// `InvalidArg`); by the time a frame reaches the codec this cannot
    /// happen.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        assert!(self.payload.len() <= MAX_PAYLOAD, "payload exceeds MAX_PAYLOAD");

        let head = WireHead {
            message_type: self.message_type.to_u8(),
            mesh_id: self.mesh_id.0.to_be_bytes(),
            message_id: self.message_id.0.to_be_bytes(),
            confirm_id: self.confirm_id.0.to_be_bytes(),
            original_target: self.original_target.0,
            original_sender: self.original_sender.0,
        };

        let mut wire = Vec::with_capacity(Self::wire_size(self.payload.len()));
        wire.extend_from_slice(head.as_bytes());
        wire.extend_from_slice(&self.payload);
        #[allow(clippy::cast_possible_truncation)] // bounded by MAX_PAYLOAD (218) above
        wire.push(self.payload.len() as u8);
        wire
    }

    /// Parse a frame received from the radio.
    ///
    /// `sender` is the previous-hop address supplied by the RX callback's
    /// metadata, not read from `bytes`.
    ///
    /// # Errors
    ///
    /// - [`FrameCodecError::InvalidSize`] if `bytes` is shorter than the
    ///   minimum frame size, or if its length does not match the trailing
    ///   `payload_len` byte.
    /// - [`FrameCodecError::WrongMesh`] if `mesh_id` does not match
    ///   `expected_mesh`.
    /// - [`FrameCodecError::UnknownMessageType`] if the type byte is not one
    ///   of the five known variants.
    pub fn decode(bytes: &[u8], expected_mesh: MeshId, sender: Hwid) -> Result<Self> {
        if bytes.len() < WireHead::SIZE + 1 {
            return Err(FrameCodecError::InvalidSize { expected: WireHead::SIZE + 1, actual: bytes.len() });
        }

        #[allow(clippy::expect_used)]
        let payload_len = *bytes.last().expect("length checked above") as usize;
        let expected_len = Self::wire_size(payload_len);
        if bytes.len() != expected_len {
            return Err(FrameCodecError::InvalidSize { expected: expected_len, actual: bytes.len() });
        }

        #[allow(clippy::expect_used)]
        let head = WireHead::ref_from_bytes(&bytes[..WireHead::SIZE])
            .expect("length checked above matches WireHead::SIZE");

        let mesh_id = MeshId(u32::from_be_bytes(head.mesh_id));
        if mesh_id != expected_mesh {
            return Err(FrameCodecError::WrongMesh { expected: expected_mesh, actual: mesh_id });
        }

        let message_type = MessageType::from_u8(head.message_type)
            .ok_or(FrameCodecError::UnknownMessageType(head.message_type))?;

        let payload = bytes[WireHead::SIZE..WireHead::SIZE + payload_len].to_vec();

        Ok(Self {
            message_type,
            mesh_id,
            message_id: MessageId(u32::from_be_bytes(head.message_id)),
            confirm_id: MessageId(u32::from_be_bytes(head.confirm_id)),
            original_target: Hwid(head.original_target),
            original_sender: Hwid(head.original_sender),
            sender,
            payload,
        })
    }
}
