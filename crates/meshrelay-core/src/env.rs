//! Environment abstraction for deterministic testing.
//!
//! Decouples the Processor from system resources (time, randomness), the
//! same way a radio adapter decouples it from the physical link. Production
//! nodes (`meshrelay-node::SystemEnv`) use real time and OS RNG; the
//! simulation harness (`meshrelay-harness::SimEnv`) uses a seeded virtual
//! clock so multi-node scenarios replay identically from a seed.

use std::time::Duration;

/// Abstract environment providing monotonic time, sleeping, and randomness.
///
/// # Invariants
///
/// - `now()` never goes backwards within one execution.
/// - `random_u32()` is uniformly distributed. Message identifiers drawn
///   from it must be uniformly distributed; collisions degrade duplicate
///   suppression but do not break correctness.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The instant type used by this environment (real or virtual).
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current monotonic time.
    fn now(&self) -> Self::Instant;

    /// Suspends the caller for `duration`. The only async method here —
    /// used solely by the runtime that drives the Processor, never by pure
    /// dispatch logic.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// A fresh random `u32`.
    fn random_u32(&self) -> u32;

    /// A fresh, non-zero message identifier.
    ///
    /// Zero is reserved as "unset" for `confirm_id` (spec §9's note on the
    /// `abs(random())` idiom in the original source: the intent is simply a
    /// positive identifier). Retries on the zero draw, which for a uniform
    /// 32-bit source happens with probability 2^-32.
    fn fresh_message_id(&self) -> u32 {
        loop {
            let candidate = self.random_u32();
            if candidate != 0 {
                return candidate;
            }
        }
    }
}
