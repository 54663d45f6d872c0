//! Errors produced while encoding or decoding wire frames.

use thiserror::Error;

use crate::ids::MeshId;

/// Failure modes for [`crate::Frame::decode`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameCodecError {
    /// The buffer length did not match what the trailing `payload_len` byte
    /// claims, or was too short to hold a header at all.
    #[error("invalid frame size: expected {expected} bytes, got {actual}")]
    InvalidSize {
        /// Size the frame should have had, computed from `payload_len`.
        expected: usize,
        /// Actual buffer length handed to the codec.
        actual: usize,
    },

    /// `mesh_id` on the wire did not match the locally configured mesh.
    #[error("wrong mesh: expected {expected}, got {actual}")]
    WrongMesh {
        /// Locally configured mesh identifier.
        expected: MeshId,
        /// Mesh identifier read from the wire.
        actual: MeshId,
    },

    /// `message_type` byte did not match any known variant.
    #[error("unknown message type byte: {0:#04x}")]
    UnknownMessageType(u8),
}

/// Convenience alias for this crate's fallible operations.
pub type Result<T> = core::result::Result<T, FrameCodecError>;
