//! The radio adapter contract and the glue that turns it into a single
//! `Transmit` execution, consumed by `meshrelay-node`'s runtime loop.
//!
//! Nothing here runs on its own: the physical link driver is an external
//! collaborator, so this crate provides
//! only the trait a concrete driver must implement and the
//! `add_peer -> send_raw -> wait -> del_peer` cycle that wraps it. The
//! only concrete [`RadioAdapter`] in this workspace is
//! `meshrelay-harness`'s in-memory link simulator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod completion;
mod error;
mod link;

pub use adapter::{RadioAdapter, RecvSink};
pub use completion::Completion;
pub use error::RadioError;
pub use link::RadioLink;
