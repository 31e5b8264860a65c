//! Time-pattern file holder
//!
//! The file name is a template expanded against the current time. Whenever
//! the expansion changes, the holder switches to the newly named file.
//!
//! | Escape | Expands to                |
//! |--------|---------------------------|
//! | `%Y`   | 4-digit year              |
//! | `%m`   | 2-digit month             |
//! | `%d`   | 2-digit day of month      |
//! | `%H`   | 2-digit hour (24h)        |
//! | `%M`   | 2-digit minute            |
//! | `%%`   | a literal `%`             |
//! | `%x`   | `x`, for any other char   |

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, Timelike};
use parking_lot::Mutex;

use super::holder::{FileHolder, HolderCore};
use super::writer::{FileWriter, SimpleFileWriter};
use crate::core::error::{LoggerError, Result};
use crate::core::time_source::TimeSource;
use crate::rotation::rotator::{check_interval as check_interval_of, LogRotator, Rotation};

/// Default delay between two template expansions
pub const DEFAULT_PATTERN_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Expand a file name template against `time`
///
/// A lone `%` at the end of the template is dropped.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rust_log_dispatch::expand_template;
///
/// let time = NaiveDate::from_ymd_opt(2018, 8, 5)
///     .unwrap()
///     .and_hms_opt(9, 3, 0)
///     .unwrap();
/// assert_eq!(expand_template("app-%Y%m%d-%H%M.log", &time), "app-20180805-0903.log");
/// assert_eq!(expand_template("100%%-%q", &time), "100%-q");
/// ```
pub fn expand_template<T: Datelike + Timelike>(template: &str, time: &T) -> String {
    let mut name = String::with_capacity(template.len() + 8);
    let mut escaped = false;

    for c in template.chars() {
        if !escaped {
            if c == '%' {
                escaped = true;
            } else {
                name.push(c);
            }
            continue;
        }

        escaped = false;
        let _ = match c {
            'Y' => write!(name, "{:04}", time.year()),
            'm' => write!(name, "{:02}", time.month()),
            'd' => write!(name, "{:02}", time.day()),
            'H' => write!(name, "{:02}", time.hour()),
            'M' => write!(name, "{:02}", time.minute()),
            other => {
                name.push(other);
                Ok(())
            }
        };
    }

    name
}

/// File holder switching files as its name template changes with time
pub struct PatternFile {
    template: String,
    interval: chrono::Duration,
    current_name: Mutex<Option<String>>,
    core: HolderCore,
}

impl PatternFile {
    /// Create a holder checking the template every
    /// [`DEFAULT_PATTERN_CHECK_INTERVAL`]
    ///
    /// The template is expanded and opened immediately; a failure to open is
    /// reported on stderr and retried at the next check.
    pub fn new(template: impl Into<String>, sync_every_write: bool, time: &dyn TimeSource) -> Self {
        let template = template.into();
        let holder = Self {
            core: HolderCore::new(template.clone(), None, sync_every_write),
            template,
            interval: chrono::Duration::seconds(DEFAULT_PATTERN_CHECK_INTERVAL.as_secs() as i64),
            current_name: Mutex::new(None),
        };
        holder.open_current(time);
        holder
    }

    /// Create a holder with a custom check interval
    ///
    /// # Errors
    ///
    /// Returns error if the interval is zero or longer than
    /// [`MAX_CHECK_INTERVAL`](crate::MAX_CHECK_INTERVAL)
    pub fn with_check_interval(
        template: impl Into<String>,
        sync_every_write: bool,
        check_interval: Duration,
        time: &dyn TimeSource,
    ) -> Result<Self> {
        let interval = check_interval_of("PatternFile", check_interval)?;
        let template = template.into();
        let holder = Self {
            core: HolderCore::new(template.clone(), None, sync_every_write),
            template,
            interval,
            current_name: Mutex::new(None),
        };
        holder.open_current(time);
        Ok(holder)
    }

    fn open_current(&self, time: &dyn TimeSource) {
        if let Err(e) = self.rotate(time) {
            eprintln!("[LOGGER WARNING] {}. Retrying at next check.", e);
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Name of the file currently written to
    pub fn current_name(&self) -> Option<String> {
        self.current_name.lock().clone()
    }
}

impl FileHolder for PatternFile {
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

impl LogRotator for PatternFile {
    /// Always true while the holder is open; the cheap name comparison
    /// happens in `rotate`
    fn needs_rotate(&self, _time: &dyn TimeSource) -> bool {
        !self.core.lock().closed
    }

    fn rotate(&self, time: &dyn TimeSource) -> Result<Rotation> {
        let name = expand_template(&self.template, &time.now());
        let mut current = self.current_name.lock();
        if current.as_deref() == Some(name.as_str()) {
            return Ok(Rotation::Unchanged);
        }

        let writer = SimpleFileWriter::open(&name).map_err(|e| {
            LoggerError::file_rotation(name.as_str(), format!("Failed to open: {}", e))
        })?;

        let previous = {
            let mut state = self.core.lock();
            if state.closed {
                return Err(LoggerError::holder_closed(self.template.as_str()));
            }
            state.writer.replace(Box::new(writer))
        };

        if let Some(mut previous) = previous {
            if let Err(e) = previous.close() {
                eprintln!(
                    "[LOGGER WARNING] Failed to close '{}': {}",
                    current.as_deref().unwrap_or_default(),
                    e
                );
            }
        }

        *current = Some(name);
        Ok(Rotation::Rotated)
    }

    fn next_check_time(&self, time: &dyn TimeSource) -> DateTime<Local> {
        time.now() + self.interval
    }
}
