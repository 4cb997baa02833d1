//! Wall-clock source for the sync engine.
//!
//! Instants carry their UTC offset so the dismissal window can be checked
//! against local weekday and `HH:mm` without consulting the process timezone.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local};

use crate::util::to_time_delta;

/// An instant with the local UTC offset attached.
pub type Timestamp = DateTime<FixedOffset>;

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Timestamp;
}

/// Reads the operating system clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().fixed_offset()
    }
}

/// Manually driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, instant: Timestamp) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += to_time_delta(by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let start = DateTime::parse_from_rfc3339("2026-03-02T09:00:00+03:00").unwrap();
        let clock = ManualClock::new(start);
        let other = clock.clone();

        other.advance(Duration::from_secs(90));

        assert_eq!(
            clock.now(),
            DateTime::parse_from_rfc3339("2026-03-02T09:01:30+03:00").unwrap()
        );
    }
}
