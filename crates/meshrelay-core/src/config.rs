//! Runtime configuration, validated once at init.

use std::time::Duration;

use meshrelay_proto::MeshId;
use thiserror::Error;

/// Which radio interface MAC to bind the mesh to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioInterface {
    /// Station (client) interface.
    Sta,
    /// Access-point interface.
    Ap,
}

/// All recognized configuration options.
#[derive(Debug, Clone)]
pub struct MeshConfig {
    /// 32-bit network identifier. Default `0xFAFBFCFD`.
    pub mesh_id: MeshId,
    /// Processor task priority hint. Default 4.
    pub task_priority: u8,
    /// Processor task stack size in bytes. Default 3072.
    pub stack_size: usize,
    /// Work-queue capacity. Default 32.
    pub queue_size: usize,
    /// Timeout for `WaitRoute`/`WaitResponse`, in milliseconds. Default
    /// 500-1000.
    pub max_wait: Duration,
    /// Seen-ID LRU capacity. Default 100.
    pub seen_id_capacity: usize,
    /// Routing-table LRU capacity. Default 100.
    pub route_capacity: usize,
    /// Which radio interface MAC to bind. Default `Sta`.
    pub radio_interface: RadioInterface,
    /// Radio channel, 1..14. Default 1.
    pub channel: u8,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            mesh_id: MeshId(0xFAFB_FCFD),
            task_priority: 4,
            stack_size: 3072,
            queue_size: 32,
            max_wait: Duration::from_millis(750),
            seen_id_capacity: 100,
            route_capacity: 100,
            radio_interface: RadioInterface::Sta,
            channel: 1,
        }
    }
}

/// Configuration errors surfaced synchronously from `init`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Channel outside the valid `1..=14` range.
    #[error("invalid channel: {0} (must be 1..=14)")]
    InvalidChannel(u8),

    /// A capacity or size field was set to zero.
    #[error("{field} must be non-zero")]
    ZeroCapacity {
        /// Name of the offending field.
        field: &'static str,
    },

    /// `max_wait` fell outside the documented 500-1000ms guidance band.
    ///
    /// Not rejected — flagged. The spec lists 500-1000ms as the expected
    /// range, not a hard bound, so a caller who deliberately wants a
    /// shorter/longer timeout is not blocked, only warned via a returned
    /// [`Result::Err`] that the embedder may choose to ignore (the default
    /// config stays well inside the band).
    #[error("max_wait {0:?} is outside the documented 500-1000ms guidance range")]
    MaxWaitOutOfRange(Duration),
}

impl MeshConfig {
    /// Validates the configuration. Everything is checked once, up front,
    /// at init time rather than lazily on first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=14).contains(&self.channel) {
            return Err(ConfigError::InvalidChannel(self.channel));
        }
        if self.queue_size == 0 {
            return Err(ConfigError::ZeroCapacity { field: "queue_size" });
        }
        if self.seen_id_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { field: "seen_id_capacity" });
        }
        if self.route_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { field: "route_capacity" });
        }
        if self.max_wait < Duration::from_millis(500) || self.max_wait > Duration::from_millis(1000)
        {
            return Err(ConfigError::MaxWaitOutOfRange(self.max_wait));
        }
        Ok(())
    }
}
