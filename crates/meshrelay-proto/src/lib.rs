//! Wire format for the meshrelay flood-routing protocol.
//!
//! A [`Frame`] is the on-air packet: a fixed 25-byte head (message type,
//! mesh id, message id, confirm id, target and sender hardware addresses)
//! followed by a variable payload and a trailing length byte. This crate is
//! a pure data/codec layer — it has no opinion about queues, caches, or
//! radios (those live in `meshrelay-core`).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod frame;
mod hwid;
mod ids;
mod message_type;

pub use error::{FrameCodecError, Result};
pub use frame::{Frame, MAX_PAYLOAD};
pub use hwid::Hwid;
pub use ids::{MeshId, MessageId};
pub use message_type::MessageType;
