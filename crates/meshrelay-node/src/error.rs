//! The public error surface.

use thiserror::Error;

use meshrelay_core::ConfigError;

/// Errors returned from [`crate::MeshNode`]'s `init`/`deinit`/`send` surface.
///
/// Mirrors spec §6 exactly: configuration errors surface synchronously,
/// transient errors (queue pressure) are rejected at the call site, and
/// everything else is absorbed by the Processor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The underlying radio driver was not ready to bind (e.g. Wi-Fi
    /// subsystem not yet initialized).
    #[error("radio driver not ready")]
    WifiNotReady,

    /// An argument failed validation: `channel`, a zero capacity, or (for
    /// `send`) a null/empty/oversized payload.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The work queue has less than half its capacity free; this is the
    /// layer's back-pressure signal.
    #[error("queue is full")]
    QueueFull,

    /// `send`/`deinit` called before `init`, or after `deinit`.
    #[error("mesh node not initialized")]
    NotInitialized,

    /// An unexpected internal failure (e.g. the Processor task died).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<ConfigError> for MeshError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidArg(err.to_string())
    }
}
