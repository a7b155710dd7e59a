use chrono::Utc;

use crate::Clock;

/// Real system clock for production use
///
/// This simply returns the current wall-clock time.
/// Use this in production where you want real-time behavior.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn timestamp_ns(&self) -> u64 {
        Utc::now().timestamp_nanos_opt().unwrap_or(0).max(0) as u64
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let time1 = clock.timestamp_ns();
        thread::sleep(std::time::Duration::from_millis(10));
        let time2 = clock.timestamp_ns();

        assert!(time2 > time1);
        assert!(time2 - time1 >= 9 * crate::NANOS_PER_MILLI);
    }
}
