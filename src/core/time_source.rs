//! Time sources
//!
//! Every "now" read of the runtime (line timestamps, template expansion,
//! rotation scheduling) goes through a [`TimeSource`], so tests can drive
//! logical time instead of sleeping.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use parking_lot::Mutex;

use super::error::{LoggerError, Result};

/// Source of the current time
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Local wall-clock time read from the system
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimeSource;

impl LocalTimeSource {
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for LocalTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Manually driven time source
///
/// Time only moves when [`set`](Self::set) or [`shift`](Self::shift) is
/// called. After moving it, call
/// [`RotationScheduler::time_changed`](crate::RotationScheduler::time_changed)
/// to let the scheduler observe the new time.
///
/// # Example
///
/// ```
/// use rust_log_dispatch::{MockTimeSource, TimeSource};
/// use chrono::Duration;
///
/// let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
/// clock.shift(Duration::minutes(3));
/// assert_eq!(clock.now().format("%H:%M").to_string(), "14:05");
/// ```
#[derive(Debug)]
pub struct MockTimeSource {
    now: Mutex<DateTime<Local>>,
}

impl MockTimeSource {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Create a mock clock from local time in the `YYYY-MM-DDTHH:MM:SS` format
    pub fn parse(local: &str) -> Result<Self> {
        Ok(Self::new(parse_local(local)?))
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock() = now;
    }

    /// Set the time from a `YYYY-MM-DDTHH:MM:SS` local time string
    pub fn set_str(&self, local: &str) -> Result<DateTime<Local>> {
        let now = parse_local(local)?;
        self.set(now);
        Ok(now)
    }

    /// Move the clock and return the new time
    pub fn shift(&self, delta: Duration) -> DateTime<Local> {
        let mut now = self.now.lock();
        *now = *now + delta;
        *now
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock()
    }
}

fn parse_local(local: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| LoggerError::config("MockTimeSource", format!("'{}': {}", local, e)))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| {
            LoggerError::config(
                "MockTimeSource",
                format!("'{}' does not exist locally", local),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_mock_parse_and_shift() {
        let clock = MockTimeSource::parse("2018-08-25T23:58:00").unwrap();
        assert_eq!(clock.now().day(), 25);

        let moved = clock.shift(Duration::minutes(3));
        assert_eq!(moved.day(), 26);
        assert_eq!(moved.hour(), 0);
        assert_eq!(moved.minute(), 1);
        assert_eq!(clock.now(), moved);
    }

    #[test]
    fn test_mock_set_str() {
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
        let now = clock.set_str("2018-08-25T14:03:00").unwrap();
        assert_eq!(now.minute(), 3);
        assert!(clock.set_str("not a time").is_err());
    }

    #[test]
    fn test_local_time_source_moves_forward() {
        let clock = LocalTimeSource::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
