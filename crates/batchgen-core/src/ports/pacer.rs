//! Pacing between generation calls.

use std::time::Duration;

/// Suspends the runner between attempted items.
pub trait Pacer: Send + Sync {
    /// Waits for `delay`.
    fn pause(&self, delay: Duration);
}

/// Pacer backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
