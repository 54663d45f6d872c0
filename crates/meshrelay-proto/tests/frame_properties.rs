//! Property-based tests for [`Frame`] wire boundaries.
//!
//! `frame.rs`'s own `#[cfg(test)]` module covers round-tripping; this file
//! covers the boundary conditions the codec must reject.

use meshrelay_proto::{Frame, FrameCodecError, Hwid, MAX_PAYLOAD, MeshId, MessageId, MessageType};
use proptest::prelude::*;

fn sample_frame(mesh_id: u32, payload_len: usize) -> Frame {
    Frame {
        message_type: MessageType::Broadcast,
        mesh_id: MeshId(mesh_id),
        message_id: MessageId(42),
        confirm_id: MessageId::UNSET,
        original_target: Hwid::BROADCAST,
        original_sender: Hwid([1, 2, 3, 4, 5, 6]),
        sender: Hwid::ZERO,
        payload: vec![0xAB; payload_len],
    }
}

proptest! {
    /// Any buffer whose length does not equal `Frame::wire_size(payload_len)`
    /// for the trailing byte's claimed `payload_len` is rejected as
    /// `InvalidSize`, never panics, never silently truncates.
    #[test]
    fn truncation_or_padding_is_rejected(
        payload_len in 0usize..=MAX_PAYLOAD,
        delta in -4i32..=4,
    ) {
        let frame = sample_frame(0xFAFB_FCFD, payload_len);
        let mut wire = frame.encode();
        let correct_len = wire.len();

        let target_len = (correct_len as i32 + delta).max(0) as usize;
        wire.resize(target_len, 0);

        let result = Frame::decode(&wire, frame.mesh_id, Hwid::ZERO);
        if delta == 0 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(FrameCodecError::InvalidSize { .. })));
        }
    }

    /// A well-formed frame for a foreign mesh is always `WrongMesh`, never
    /// silently accepted.
    #[test]
    fn foreign_mesh_is_rejected(
        payload_len in 0usize..=MAX_PAYLOAD,
        local_mesh in any::<u32>(),
        wire_mesh in any::<u32>(),
    ) {
        prop_assume!(local_mesh != wire_mesh);
        let frame = sample_frame(wire_mesh, payload_len);
        let wire = frame.encode();
        let result = Frame::decode(&wire, MeshId(local_mesh), Hwid::ZERO);
        prop_assert!(matches!(result, Err(FrameCodecError::WrongMesh { .. })));
    }
}
