//! Size-triggered rotating file holder
//!
//! When the live file grows past `max_size` bytes, backups are shifted
//! (`path.1` becomes `path.2`, and so on), the live file becomes `path.1`
//! and a fresh `path` is opened. `path.1` is always the newest backup.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};

use super::holder::{FileHolder, HolderCore};
use super::writer::{FileWriter, SimpleFileWriter};
use crate::core::error::{LoggerError, Result};
use crate::core::time_source::TimeSource;
use crate::rotation::rotator::{check_interval, LogRotator, Rotation};

/// Configuration for [`RotatingFile`]
///
/// # Examples
///
/// ```
/// use rust_log_dispatch::RotationPolicy;
/// use std::time::Duration;
///
/// // Rotate past 50 MB, checking every 10 seconds
/// let policy = RotationPolicy::new()
///     .with_max_size(50 * 1024 * 1024)
///     .with_check_interval(Duration::from_secs(10))
///     .with_sync(true);
/// assert!(policy.validate().is_ok());
///
/// // A zero interval would keep the scheduler spinning
/// let bad = RotationPolicy::new().with_check_interval(Duration::ZERO);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate once the live file is strictly larger than this; 0 disables rotation
    pub max_size: u64,
    /// Delay between two size checks
    pub check_interval: Duration,
    /// Sync to disk after every write
    pub sync: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size: 10 * 1024 * 1024, // 10 MB
            check_interval: Duration::from_secs(60),
            sync: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.max_size = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Check that the policy can be scheduled
    ///
    /// # Errors
    ///
    /// Returns error if the check interval is zero or longer than
    /// [`MAX_CHECK_INTERVAL`](crate::MAX_CHECK_INTERVAL)
    pub fn validate(&self) -> Result<()> {
        self.chrono_interval().map(|_| ())
    }

    fn chrono_interval(&self) -> Result<chrono::Duration> {
        check_interval("RotationPolicy", self.check_interval)
    }
}

/// File holder rotating its file by size
///
/// # Examples
///
/// ```no_run
/// use rust_log_dispatch::{RotatingFile, RotationPolicy};
/// use std::time::Duration;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(200)
///     .with_check_interval(Duration::from_secs(120));
/// let holder = RotatingFile::with_policy("/var/log/app.log", policy).unwrap();
/// assert_eq!(holder.backup_path(1).to_str(), Some("/var/log/app.log.1"));
/// ```
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    interval: chrono::Duration,
    core: HolderCore,
}

impl RotatingFile {
    /// Create a rotating holder
    ///
    /// # Errors
    ///
    /// Returns error if the check interval is invalid
    pub fn new<P: AsRef<Path>>(
        path: P,
        max_size: u64,
        check_interval: Duration,
        sync: bool,
    ) -> Result<Self> {
        let policy = RotationPolicy::new()
            .with_max_size(max_size)
            .with_check_interval(check_interval)
            .with_sync(sync);
        Self::with_policy(path, policy)
    }

    /// Create a rotating holder with a custom policy
    ///
    /// An open failure does not fail construction: the holder starts without
    /// a writer and the first scheduled check tries to open the file again.
    ///
    /// # Errors
    ///
    /// Returns error if the policy does not validate
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let interval = policy.chrono_interval()?;
        let path = path.as_ref().to_path_buf();

        let writer = match SimpleFileWriter::open(&path) {
            Ok(writer) => Some(Box::new(writer) as Box<dyn FileWriter>),
            Err(e) => {
                eprintln!(
                    "[LOGGER WARNING] Failed to open log file '{}': {}. Retrying at next check.",
                    path.display(),
                    e
                );
                None
            }
        };
        let core = HolderCore::new(path.display().to_string(), writer, policy.sync);

        Ok(Self {
            path,
            policy,
            interval,
            core,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Whether the holder currently owns an open writer
    pub fn is_open(&self) -> bool {
        self.core.has_writer()
    }

    /// Get backup file path for given index
    #[must_use]
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn open_writer(&self) -> std::io::Result<Box<dyn FileWriter>> {
        Ok(Box::new(SimpleFileWriter::open(&self.path)?))
    }

    /// Try to reopen the log file (used for recovery after an open failure)
    fn try_reopen_file(&self) -> Result<Rotation> {
        let writer = self.open_writer().map_err(|e| {
            LoggerError::file_rotation(
                self.core.label(),
                format!("Failed to reopen log file: {}", e),
            )
        })?;

        let mut state = self.core.lock();
        if state.closed {
            return Err(LoggerError::holder_closed(self.core.label()));
        }
        if state.writer.is_some() {
            return Ok(Rotation::Unchanged);
        }
        state.writer = Some(writer);
        Ok(Rotation::Reopened)
    }

    /// Shift `path.1..path.(k-1)` up by one, where `k` is the first missing index
    fn shift_backups(&self) -> Result<()> {
        let mut first_missing = 1;
        while self.backup_path(first_missing).exists() {
            first_missing += 1;
        }

        for i in (2..=first_missing).rev() {
            let old_path = self.backup_path(i - 1);
            let new_path = self.backup_path(i);
            fs::rename(&old_path, &new_path).map_err(|e| {
                LoggerError::file_rotation(
                    old_path.display().to_string(),
                    format!("Failed to rotate backup files: {}", e),
                )
            })?;
        }
        Ok(())
    }
}

impl FileHolder for RotatingFile {
    fn access_writer(&self, f: &mut dyn FnMut(&mut dyn FileWriter)) {
        self.core.access_writer(f);
    }

    fn acquire(&self) {
        self.core.acquire();
    }

    fn release(&self) {
        self.core.release();
    }
}

impl LogRotator for RotatingFile {
    /// True once the live file is strictly larger than `max_size`, or when the
    /// live file is missing and should be reopened
    fn needs_rotate(&self, _time: &dyn TimeSource) -> bool {
        let mut state = self.core.lock();
        if state.closed {
            return false;
        }
        let Some(writer) = state.writer.as_mut() else {
            return true;
        };
        if self.policy.max_size == 0 {
            return false;
        }
        if let Err(e) = writer.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush '{}': {}", self.core.label(), e);
        }
        writer
            .stat()
            .is_some_and(|metadata| metadata.len() > self.policy.max_size)
    }

    fn rotate(&self, _time: &dyn TimeSource) -> Result<Rotation> {
        {
            let state = self.core.lock();
            if state.closed {
                return Err(LoggerError::holder_closed(self.core.label()));
            }
            if state.writer.is_none() {
                drop(state);
                return self.try_reopen_file();
            }
        }

        // Already-shifted backups stay shifted on failure; the hole becomes
        // the boundary of the next attempt.
        self.shift_backups()?;

        let backup = self.backup_path(1);
        let mut state = self.core.lock();
        // Released while the backups were shifting
        if state.closed {
            return Err(LoggerError::holder_closed(self.core.label()));
        }
        if let Some(mut writer) = state.writer.take() {
            if let Err(e) = writer.close() {
                eprintln!(
                    "[LOGGER WARNING] Failed to flush '{}' before rotation: {}",
                    self.core.label(),
                    e
                );
            }
        }

        if let Err(e) = fs::rename(&self.path, &backup) {
            state.writer = self.open_writer().ok();
            return Err(LoggerError::file_rotation(
                self.core.label(),
                format!("Failed to rotate current log file: {}", e),
            ));
        }

        match self.open_writer() {
            Ok(writer) => {
                state.writer = Some(writer);
                Ok(Rotation::Rotated)
            }
            Err(e) => Err(LoggerError::file_rotation(
                self.core.label(),
                format!("Failed to create new log file: {}", e),
            )),
        }
    }

    fn next_check_time(&self, time: &dyn TimeSource) -> DateTime<Local> {
        time.now() + self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time_source::MockTimeSource;
    use tempfile::tempdir;

    fn write(holder: &RotatingFile, bytes: &[u8]) {
        holder.access_writer(&mut |w| {
            w.write_all(bytes).unwrap();
        });
    }

    #[test]
    fn test_rotation_policy_builder() {
        let policy = RotationPolicy::new()
            .with_max_size(1024)
            .with_check_interval(Duration::from_secs(5))
            .with_sync(true);

        assert_eq!(policy.max_size, 1024);
        assert_eq!(policy.check_interval, Duration::from_secs(5));
        assert!(policy.sync);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = tempdir().unwrap();
        let result = RotatingFile::new(dir.path().join("a.log"), 10, Duration::ZERO, false);
        assert!(matches!(
            result,
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_backup_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        let holder = RotatingFile::new(&path, 10, Duration::from_secs(1), false).unwrap();

        assert_eq!(holder.backup_path(1), dir.path().join("app.log.1"));
        assert_eq!(holder.backup_path(12), dir.path().join("app.log.12"));
    }

    #[test]
    fn test_needs_rotate_is_strictly_greater() {
        let dir = tempdir().unwrap();
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
        let holder =
            RotatingFile::new(dir.path().join("size.log"), 10, Duration::from_secs(1), false)
                .unwrap();

        write(&holder, b"0123456789");
        assert!(!holder.needs_rotate(&clock));

        write(&holder, b"x");
        assert!(holder.needs_rotate(&clock));
    }

    #[test]
    fn test_zero_max_size_never_rotates() {
        let dir = tempdir().unwrap();
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
        let holder =
            RotatingFile::new(dir.path().join("off.log"), 0, Duration::from_secs(1), false)
                .unwrap();

        write(&holder, &[b'x'; 4096]);
        assert!(!holder.needs_rotate(&clock));
    }

    #[test]
    fn test_rotate_shifts_backups() {
        let dir = tempdir().unwrap();
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
        let path = dir.path().join("shift.log");
        let holder = RotatingFile::new(&path, 1, Duration::from_secs(1), false).unwrap();

        for content in ["first", "second", "third"] {
            write(&holder, content.as_bytes());
            assert_eq!(holder.rotate(&clock).unwrap(), Rotation::Rotated);
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(fs::read_to_string(holder.backup_path(1)).unwrap(), "third");
        assert_eq!(fs::read_to_string(holder.backup_path(2)).unwrap(), "second");
        assert_eq!(fs::read_to_string(holder.backup_path(3)).unwrap(), "first");
        assert!(!holder.backup_path(4).exists());
    }

    #[test]
    fn test_rotate_stops_at_first_hole() {
        let dir = tempdir().unwrap();
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
        let path = dir.path().join("hole.log");
        let holder = RotatingFile::new(&path, 1, Duration::from_secs(1), false).unwrap();

        fs::write(holder.backup_path(1), "b1").unwrap();
        fs::write(holder.backup_path(3), "b3").unwrap();
        write(&holder, b"live");

        holder.rotate(&clock).unwrap();

        assert_eq!(fs::read_to_string(holder.backup_path(1)).unwrap(), "live");
        assert_eq!(fs::read_to_string(holder.backup_path(2)).unwrap(), "b1");
        assert_eq!(fs::read_to_string(holder.backup_path(3)).unwrap(), "b3");
    }

    #[test]
    fn test_next_check_time_adds_interval() {
        let dir = tempdir().unwrap();
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
        let holder =
            RotatingFile::new(dir.path().join("next.log"), 1, Duration::from_secs(120), false)
                .unwrap();

        let expected = clock.now() + chrono::Duration::minutes(2);
        assert_eq!(holder.next_check_time(&clock), expected);
    }

    #[test]
    fn test_reopen_after_open_failure() {
        let dir = tempdir().unwrap();
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
        let blocker = dir.path().join("logs");
        fs::write(&blocker, "in the way").unwrap();

        let path = blocker.join("app.log");
        let holder = RotatingFile::new(&path, 100, Duration::from_secs(1), false).unwrap();
        assert!(!holder.is_open());
        assert!(holder.needs_rotate(&clock));
        assert!(holder.rotate(&clock).is_err());

        fs::remove_file(&blocker).unwrap();
        assert_eq!(holder.rotate(&clock).unwrap(), Rotation::Reopened);
        assert!(holder.is_open());

        write(&holder, b"recovered");
        assert_eq!(fs::read_to_string(&path).unwrap(), "recovered");
    }

    #[test]
    fn test_released_holder_does_not_rotate() {
        let dir = tempdir().unwrap();
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
        let holder =
            RotatingFile::new(dir.path().join("gone.log"), 1, Duration::from_secs(1), false)
                .unwrap();

        write(&holder, b"data");
        holder.release();

        assert!(!holder.needs_rotate(&clock));
        assert!(matches!(
            holder.rotate(&clock),
            Err(LoggerError::HolderClosed { .. })
        ));
    }

    #[test]
    fn test_oversized_interval_rejected() {
        let dir = tempdir().unwrap();
        let policy = RotationPolicy::new()
            .with_check_interval(Duration::from_secs(9_000_000_000_000_000));
        assert!(policy.validate().is_err());
        assert!(RotatingFile::with_policy(dir.path().join("huge.log"), policy).is_err());

        let longest = RotationPolicy::new().with_check_interval(crate::MAX_CHECK_INTERVAL);
        let holder = RotatingFile::with_policy(dir.path().join("year.log"), longest).unwrap();
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
        assert_eq!(
            holder.next_check_time(&clock),
            clock.now() + chrono::Duration::days(366)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_backup_shift_keeps_live_file() {
        let dir = tempdir().unwrap();
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();
        // 253 bytes: ".9" still fits a 255-byte file name, ".10" does not
        let path = dir.path().join(format!("{}.log", "x".repeat(249)));
        let holder = RotatingFile::new(&path, 1, Duration::from_secs(1), false).unwrap();

        for i in 1..=9 {
            fs::write(holder.backup_path(i), format!("b{}", i)).unwrap();
        }
        write(&holder, b"live");

        assert!(matches!(
            holder.rotate(&clock),
            Err(LoggerError::FileRotationError { .. })
        ));
        for i in 1..=9 {
            assert_eq!(
                fs::read_to_string(holder.backup_path(i)).unwrap(),
                format!("b{}", i)
            );
        }

        assert!(holder.is_open());
        write(&holder, b"+more");
        assert_eq!(fs::read_to_string(&path).unwrap(), "live+more");
    }

    #[test]
    fn test_release_during_rotation_leaves_holder_closed() {
        let dir = tempdir().unwrap();
        let clock = MockTimeSource::parse("2018-08-25T14:02:00").unwrap();

        for round in 0..500 {
            let path = dir.path().join(format!("race-{}.log", round));
            let holder = RotatingFile::new(&path, 1, Duration::from_secs(1), false).unwrap();
            write(&holder, b"data");

            std::thread::scope(|s| {
                s.spawn(|| {
                    let _ = holder.rotate(&clock);
                });
                holder.release();
            });

            assert!(!holder.is_open(), "round {}: writer reopened after release", round);
            assert!(matches!(
                holder.rotate(&clock),
                Err(LoggerError::HolderClosed { .. })
            ));
        }
    }
}
