//! Coarse monotonic time source for transition pacing

use std::time::Duration;

/// Milliseconds per transition time unit
pub const TIME_UNIT_MS: u64 = 100;

/// Internal quanta per time unit; one quantum is the finest step spacing
pub const QUANTA_PER_UNIT: u32 = 10;

/// Milliseconds per quantum
pub const QUANTUM_MS: u64 = TIME_UNIT_MS / QUANTA_PER_UNIT as u64;

/// Reader for the coarse time-unit counter
pub trait Clock: Send + Sync {
    /// Current time in 100 ms units since the clock's epoch
    fn now_units(&self) -> u64;
}

/// Monotonic clock backed by the runtime's instant source
///
/// Uses `tokio::time::Instant`, so paused-time tests observe the same
/// timeline as the step timers.
pub struct MonotonicClock {
    epoch: tokio::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Create a clock with its epoch at the current instant
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: tokio::time::Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_units(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64 / TIME_UNIT_MS
    }
}

/// Convert a quanta count to the scheduler's native duration
#[must_use]
pub fn quanta_to_duration(quanta: u32) -> Duration {
    Duration::from_millis(u64::from(quanta) * QUANTUM_MS)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quanta_to_duration() {
        assert_eq!(quanta_to_duration(1), Duration::from_millis(10));
        assert_eq!(quanta_to_duration(25), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_monotonic_clock_tracks_units() {
        let clock = MonotonicClock::new();
        assert_eq!(clock.now_units(), 0);

        tokio::time::advance(Duration::from_millis(350)).await;
        assert_eq!(clock.now_units(), 3);

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(clock.now_units(), 4);
    }
}
