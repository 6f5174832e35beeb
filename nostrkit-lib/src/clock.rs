//! Time source for `created_at` and delivery-time computation.

use std::fmt::Debug;

/// Supplies the current Unix time in seconds.
///
/// Inject a [`FixedClock`] where ids and timestamps must be reproducible.
pub trait Clock: Send + Sync + Debug {
    /// Current Unix time in seconds.
    fn now(&self) -> u64;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Clock frozen at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}
