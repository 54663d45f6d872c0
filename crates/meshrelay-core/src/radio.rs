//! The one vocabulary type the Processor and the radio layer share.

/// Outcome of a single `Transmit` action, reported back to the Processor
/// via [`crate::processor::Processor::finish_send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// The radio reported successful transmission within the deadline.
    Success,
    /// The radio reported failure, or the completion deadline (50ms)
    /// elapsed with no signal (spec §4.4: "expiry with no signal is
    /// treated as Fail").
    Fail,
}
