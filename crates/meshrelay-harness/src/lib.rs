//! Deterministic multi-node simulation harness for `meshrelay`.
//!
//! Rather than spinning up real Tokio tasks and a real radio driver per
//! node, this crate owns each node's [`meshrelay_core::Processor`] directly
//! and drives it by hand over a seeded virtual clock and an in-memory
//! [`Medium`]. A whole cluster's scenario replays identically given the
//! same seed, which a real multi-task, wall-clock-driven run cannot
//! promise.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod medium;
mod sim_driver;
mod sim_env;

pub use medium::Medium;
pub use sim_driver::{HarnessEvent, SimDriver};
pub use sim_env::SimEnv;
