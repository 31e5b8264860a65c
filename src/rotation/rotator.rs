//! Rotation contract driven by the scheduler

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::core::error::{LoggerError, Result};
use crate::core::time_source::TimeSource;
use crate::holders::holder::FileHolder;

/// Longest accepted delay between two rotation checks
pub const MAX_CHECK_INTERVAL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// Validate a check interval and convert it for date arithmetic
///
/// # Errors
///
/// Returns error if the interval is zero or longer than [`MAX_CHECK_INTERVAL`]
pub(crate) fn check_interval(component: &str, interval: Duration) -> Result<chrono::Duration> {
    if interval.is_zero() {
        return Err(LoggerError::config(component, "check interval must be positive"));
    }
    if interval > MAX_CHECK_INTERVAL {
        return Err(LoggerError::config(
            component,
            format!(
                "check interval {:?} exceeds the maximum of {:?}",
                interval, MAX_CHECK_INTERVAL
            ),
        ));
    }
    chrono::Duration::from_std(interval).map_err(|e| {
        LoggerError::config(
            component,
            format!("check interval {:?} out of range: {}", interval, e),
        )
    })
}

/// Outcome of a successful [`LogRotator::rotate`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// The live file was replaced
    Rotated,
    /// A missing live file was opened again without shifting backups
    Reopened,
    /// Nothing needed to change
    Unchanged,
}

/// Something the [`RotationScheduler`](super::scheduler::RotationScheduler)
/// checks periodically
///
/// All three methods are only called from the scheduler thread, one rotator
/// at a time. `rotate` errors are absorbed by the scheduler; a failed rotation
/// is retried at the next check.
pub trait LogRotator: Send + Sync {
    fn needs_rotate(&self, time: &dyn TimeSource) -> bool;

    fn rotate(&self, time: &dyn TimeSource) -> Result<Rotation>;

    /// When the scheduler should next call `needs_rotate`
    fn next_check_time(&self, time: &dyn TimeSource) -> DateTime<Local>;
}

/// A file holder that also knows how to rotate itself
pub trait RotatableFileHolder: FileHolder + LogRotator {}

impl<T: FileHolder + LogRotator + ?Sized> RotatableFileHolder for T {}
