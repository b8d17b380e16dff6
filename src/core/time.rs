//! Clock abstraction for testable time-dependent logic
//!
//! Proposal expiry, "past date" checks and pending-input timeouts all read the
//! salon's local wall clock through [`Clock`], so tests can pin and advance it.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};

/// Abstraction over the salon's local wall clock
pub trait Clock: Send + Sync {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;

    /// Current local date
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Production clock reading the system's local time
#[derive(Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock for deterministic tests and replays
#[derive(Clone)]
pub struct MockClock {
    current: Arc<Mutex<NaiveDateTime>>,
}

impl MockClock {
    /// Create a mock clock frozen at `start`
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *current += by;
    }

    /// Jump to an absolute time
    pub fn set(&self, at: NaiveDateTime) {
        let mut current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *current = at;
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        *self.current.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_mock_clock_advance() {
        let clock = MockClock::new(at(9, 0));
        clock.advance(Duration::minutes(15));
        assert_eq!(clock.now(), at(9, 15));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    }

    #[test]
    fn test_mock_clock_shared_between_clones() {
        let clock = MockClock::new(at(9, 0));
        let other = clock.clone();
        other.set(at(18, 30));
        assert_eq!(clock.now(), at(18, 30));
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.now() >= first);
    }
}
