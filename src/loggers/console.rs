//! Console logger (stdout / stderr)

use std::sync::Arc;

use super::file::FileLogger;
use super::formatter::{DefaultLineFormatter, LineFormatter};
use crate::core::log_object::LogObject;
use crate::core::logger::Logger;
use crate::core::severity::{Severity, Verbosity};
use crate::core::time_source::TimeSource;
use crate::holders::holder::{FileHolder, HolderCore};
use crate::holders::writer::{ConsoleStream, ConsoleWriter, FileWriter};

/// Holder over a standard stream
///
/// Serializes writers so lines from different threads never interleave.
/// Releasing it flushes the stream but never closes it.
pub struct ConsoleHolder {
    stream: ConsoleStream,
    core: HolderCore,
}

impl ConsoleHolder {
    pub fn new(stream: ConsoleStream) -> Self {
        let label = match stream {
            ConsoleStream::Stdout => "<stdout>",
            ConsoleStream::Stderr => "<stderr>",
        };
        Self {
            stream,
            core: HolderCore::new(label, Some(Box::new(ConsoleWriter::new(stream))), false),
        }
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl FileHolder for ConsoleHolder {
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

/// Sink printing short colored lines to stdout or stderr
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rust_log_dispatch::{ConsoleLogger, ConsoleStream, LocalTimeSource, Logger, Severity};
///
/// let logger = ConsoleLogger::new("console", ConsoleStream::Stderr, Arc::new(LocalTimeSource));
/// logger.log_object("app", "", Severity::Warning, 1, &"disk almost full");
/// logger.destroy();
/// ```
pub struct ConsoleLogger {
    inner: FileLogger,
    stream: ConsoleStream,
}

impl ConsoleLogger {
    pub fn new(name: impl Into<String>, stream: ConsoleStream, time: Arc<dyn TimeSource>) -> Self {
        let holder = Arc::new(ConsoleHolder::new(stream));
        Self {
            inner: FileLogger::new(name, time, holder)
                .with_formatter(DefaultLineFormatter::short()),
            stream,
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_formatter(mut self, formatter: impl LineFormatter + 'static) -> Self {
        self.inner = self.inner.with_formatter(formatter);
        self
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Logger for ConsoleLogger {
    fn log_object(
        &self,
        system: &str,
        subsystem: &str,
        severity: Severity,
        verbosity: Verbosity,
        object: &dyn LogObject,
    ) {
        self.inner
            .log_object(system, subsystem, severity, verbosity, object);
    }

    fn destroy(&self) {
        self.inner.destroy();
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
