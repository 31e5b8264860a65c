//! Logger writing line objects through a file holder

use std::sync::Arc;

use super::formatter::{DefaultLineFormatter, LineFormatter, LineRecord};
use crate::core::log_object::LogObject;
use crate::core::logger::Logger;
use crate::core::severity::{Severity, Verbosity};
use crate::core::time_source::TimeSource;
use crate::holders::holder::FileHolder;

/// Sink formatting [`LineObject`](crate::LineObject)s onto a [`FileHolder`]
///
/// Objects that are not lines are ignored. Destroying the logger releases
/// its reference on the holder.
pub struct FileLogger {
    name: String,
    time: Arc<dyn TimeSource>,
    holder: Arc<dyn FileHolder>,
    formatter: Box<dyn LineFormatter>,
}

impl FileLogger {
    pub fn new(
        name: impl Into<String>,
        time: Arc<dyn TimeSource>,
        holder: Arc<dyn FileHolder>,
    ) -> Self {
        Self {
            name: name.into(),
            time,
            holder,
            formatter: Box::new(DefaultLineFormatter::new()),
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_formatter(mut self, formatter: impl LineFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn holder(&self) -> &Arc<dyn FileHolder> {
        &self.holder
    }
}

impl Logger for FileLogger {
    fn log_object(
        &self,
        system: &str,
        subsystem: &str,
        severity: Severity,
        verbosity: Verbosity,
        object: &dyn LogObject,
    ) {
        let Some(line) = object.as_line() else {
            return;
        };
        let text = line.log_line();
        let record = LineRecord {
            system,
            subsystem,
            severity,
            verbosity,
            time: self.time.now(),
            line: &text,
        };

        let formatter = self.formatter.as_ref();
        self.holder.access_writer(&mut |writer| {
            // An unwritable sink is a silent no-op for callers
            let _ = formatter.write_line(writer, &record);
        });
    }

    fn destroy(&self) {
        self.holder.release();
    }

    fn name(&self) -> &str {
        &self.name
    }
}
