//! Production [`Environment`] using system time and cryptographic RNG: real
//! `std::time::Instant`, `tokio::time::sleep`, and `getrandom` in place of a
//! deterministic test double.

use std::time::Duration;

use meshrelay_core::Environment;

/// Production environment: real monotonic time and OS cryptographic RNG.
///
/// # Panics
///
/// [`Environment::random_u32`] panics if the OS RNG fails. A node that
/// cannot draw random message identifiers cannot safely participate in the
/// mesh (duplicate suppression depends on uniform distribution), so this
/// treats RNG failure as unrecoverable rather than something to silently
/// degrade past.
#[derive(Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Creates a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_u32(&self) -> u32 {
        let mut bytes = [0u8; 4];
        getrandom::fill(&mut bytes)
            .expect("invariant: OS RNG failure is unrecoverable for message identifiers");
        u32::from_ne_bytes(bytes)
    }
}
