//! Simulated network latency for service calls.

use std::time::Duration;

/// Fixed delay awaited before each catalog or cart call.
///
/// A zero delay returns immediately without yielding to the timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latency(Duration);

impl Latency {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self(delay)
    }

    #[must_use]
    pub const fn none() -> Self {
        Self(Duration::ZERO)
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.0
    }

    /// Wait for the configured delay.
    pub async fn simulate(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}
