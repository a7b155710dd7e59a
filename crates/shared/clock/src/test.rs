use parking_lot::Mutex;

use crate::Clock;

/// Controllable clock for deterministic tests and backtests
///
/// Time only moves when told to; `set_time` and `advance` never move it
/// backwards relative to concurrent readers (the lock serializes access).
pub struct TestClock {
    time_ns: Mutex<u64>,
}

impl TestClock {
    /// Create a clock frozen at `start_ns`.
    pub fn new(start_ns: u64) -> Self {
        Self {
            time_ns: Mutex::new(start_ns),
        }
    }

    /// Jump to an absolute time.
    pub fn set_time(&self, time_ns: u64) {
        *self.time_ns.lock() = time_ns;
    }

    /// Move forward by `delta_ns`.
    pub fn advance(&self, delta_ns: u64) {
        let mut time = self.time_ns.lock();
        *time = time.saturating_add(delta_ns);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for TestClock {
    fn timestamp_ns(&self) -> u64 {
        *self.time_ns.lock()
    }

    fn name(&self) -> &str {
        "TestClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_frozen() {
        let clock = TestClock::new(1_000);
        assert_eq!(clock.timestamp_ns(), 1_000);
        assert_eq!(clock.timestamp_ns(), 1_000);
    }

    #[test]
    fn test_set_and_advance() {
        let clock = TestClock::default();
        clock.set_time(5_000);
        assert_eq!(clock.timestamp_ns(), 5_000);
        clock.advance(2_500);
        assert_eq!(clock.timestamp_ns(), 7_500);
    }
}
