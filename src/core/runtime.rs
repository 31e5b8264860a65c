//! Log runtime: dispatcher, rotation scheduler and time source in one handle
//!
//! The runtime owns the sinks it registers. Shutting it down stops the
//! rotation thread first, then destroys every sink exactly once.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::config::{LoggingConfig, SinkConfig, SinkOutput};
use super::dispatcher::Dispatcher;
use super::error::Result;
use super::log_object::LogObject;
use super::logger::Logger;
use super::metrics::LoggerMetrics;
use super::severity::{Severity, SeverityMask, Verbosity};
use super::time_source::{LocalTimeSource, TimeSource};
use crate::holders::pattern_file::PatternFile;
use crate::holders::rotating_file::{RotatingFile, RotationPolicy};
use crate::holders::simple_file::SimpleFile;
use crate::holders::writer::ConsoleStream;
use crate::loggers::file::FileLogger;
use crate::rotation::rotator::{LogRotator, RotatableFileHolder};
use crate::rotation::scheduler::RotationScheduler;

/// Builder for [`LogRuntime`]
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rust_log_dispatch::prelude::*;
///
/// let clock = Arc::new(MockTimeSource::parse("2018-08-25T14:02:00").unwrap());
/// let runtime = LogRuntime::builder("app")
///     .time_source(clock)
///     .build()
///     .unwrap();
///
/// assert_eq!(runtime.dispatcher().system(), "app");
/// ```
pub struct LogRuntimeBuilder {
    system: String,
    time: Option<Arc<dyn TimeSource>>,
    metrics: Option<Arc<LoggerMetrics>>,
    sinks: Vec<SinkConfig>,
}

impl LogRuntimeBuilder {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            time: None,
            metrics: None,
            sinks: Vec::new(),
        }
    }

    /// Set the time source; defaults to local wall-clock time
    #[must_use = "builder methods return a new value"]
    pub fn time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = Some(time);
        self
    }

    /// Share an existing metrics instance
    #[must_use = "builder methods return a new value"]
    pub fn metrics(mut self, metrics: Arc<LoggerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Register a configured sink at build time
    #[must_use = "builder methods return a new value"]
    pub fn sink(mut self, sink: SinkConfig) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = SinkConfig>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    /// Start the runtime and register the configured sinks
    ///
    /// # Errors
    ///
    /// Returns error if a sink configuration is invalid or the rotation
    /// thread cannot be started
    pub fn build(self) -> Result<LogRuntime> {
        let time = self
            .time
            .unwrap_or_else(|| Arc::new(LocalTimeSource::new()));
        let metrics = self
            .metrics
            .unwrap_or_else(|| Arc::new(LoggerMetrics::new()));
        let scheduler = RotationScheduler::new(Arc::clone(&time), Arc::clone(&metrics))?;

        let runtime = LogRuntime {
            dispatcher: Dispatcher::with_metrics(self.system, Arc::clone(&metrics)),
            scheduler,
            time,
            metrics,
        };
        runtime.add_sinks(&self.sinks)?;
        Ok(runtime)
    }
}

/// Handle owning the dispatcher and the rotation scheduler
///
/// # Example
///
/// ```no_run
/// use rust_log_dispatch::prelude::*;
///
/// let runtime = LogRuntime::new("app").unwrap();
/// runtime
///     .add_rotating_file_logger(
///         "main",
///         "",
///         SeverityMask::ALL,
///         3,
///         "/var/log/app.log",
///         RotationPolicy::new().with_max_size(10 * 1024 * 1024),
///     )
///     .unwrap();
///
/// runtime.log_message("", Severity::Info, 1, "service started");
/// runtime.shutdown();
/// ```
pub struct LogRuntime {
    dispatcher: Dispatcher,
    scheduler: RotationScheduler,
    time: Arc<dyn TimeSource>,
    metrics: Arc<LoggerMetrics>,
}

impl LogRuntime {
    /// Start a runtime using local wall-clock time
    ///
    /// # Errors
    ///
    /// Returns error if the rotation thread cannot be started
    pub fn new(system: impl Into<String>) -> Result<Self> {
        LogRuntimeBuilder::new(system).build()
    }

    #[must_use]
    pub fn builder(system: impl Into<String>) -> LogRuntimeBuilder {
        LogRuntimeBuilder::new(system)
    }

    /// Start a runtime with every sink of `config` registered
    ///
    /// # Errors
    ///
    /// Returns error if the configuration does not validate
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        config.validate()?;
        LogRuntimeBuilder::new(config.system.clone())
            .sinks(config.sinks.iter().cloned())
            .build()
    }

    /// Register a logger; the displaced logger of the same name, if any, is
    /// returned without being destroyed
    pub fn add_logger(
        &self,
        name: impl Into<String>,
        subsystem: impl Into<String>,
        severities: SeverityMask,
        verbosity: Verbosity,
        logger: Arc<dyn Logger>,
    ) -> Option<Arc<dyn Logger>> {
        self.dispatcher
            .register(name, subsystem, severities, verbosity, logger)
    }

    /// Register a logger owned by the runtime, destroying any displaced one
    fn install(
        &self,
        name: impl Into<String>,
        subsystem: impl Into<String>,
        severities: SeverityMask,
        verbosity: Verbosity,
        logger: Arc<dyn Logger>,
    ) {
        if let Some(previous) = self.add_logger(name, subsystem, severities, verbosity, logger) {
            previous.destroy();
        }
    }

    /// Log to a plain file
    pub fn add_file_logger(
        &self,
        name: impl Into<String>,
        subsystem: impl Into<String>,
        severities: SeverityMask,
        verbosity: Verbosity,
        path: impl AsRef<Path>,
        sync: bool,
    ) {
        let name = name.into();
        let holder = Arc::new(SimpleFile::open(path, sync));
        let logger = FileLogger::new(name.clone(), Arc::clone(&self.time), holder);
        self.install(name, subsystem, severities, verbosity, Arc::new(logger));
    }

    /// Log to a file named by a time template, switching files as it changes
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler is stopped
    pub fn add_pattern_file_logger(
        &self,
        name: impl Into<String>,
        subsystem: impl Into<String>,
        severities: SeverityMask,
        verbosity: Verbosity,
        template: impl Into<String>,
        sync: bool,
    ) -> Result<()> {
        let holder = Arc::new(PatternFile::new(template, sync, self.time.as_ref()));
        self.add_rotatable_file_logger(name, subsystem, severities, verbosity, holder)
    }

    /// Log to a size-rotated file
    ///
    /// # Errors
    ///
    /// Returns error if the policy does not validate or the scheduler is
    /// stopped
    pub fn add_rotating_file_logger(
        &self,
        name: impl Into<String>,
        subsystem: impl Into<String>,
        severities: SeverityMask,
        verbosity: Verbosity,
        path: impl AsRef<Path>,
        policy: RotationPolicy,
    ) -> Result<()> {
        let holder = Arc::new(RotatingFile::with_policy(path, policy)?);
        self.add_rotatable_file_logger(name, subsystem, severities, verbosity, holder)
    }

    /// Log through any rotatable holder; the holder is handed to the scheduler
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler is stopped
    pub fn add_rotatable_file_logger<H: RotatableFileHolder + 'static>(
        &self,
        name: impl Into<String>,
        subsystem: impl Into<String>,
        severities: SeverityMask,
        verbosity: Verbosity,
        holder: Arc<H>,
    ) -> Result<()> {
        let rotator: Arc<dyn LogRotator> = holder.clone();
        self.scheduler.register(rotator)?;

        let name = name.into();
        let logger = FileLogger::new(name.clone(), Arc::clone(&self.time), holder);
        self.install(name, subsystem, severities, verbosity, Arc::new(logger));
        Ok(())
    }

    /// Log short colored lines to stdout or stderr
    #[cfg(feature = "console")]
    pub fn add_console_logger(
        &self,
        name: impl Into<String>,
        subsystem: impl Into<String>,
        severities: SeverityMask,
        verbosity: Verbosity,
        stream: ConsoleStream,
    ) {
        let name = name.into();
        let logger = crate::loggers::console::ConsoleLogger::new(
            name.clone(),
            stream,
            Arc::clone(&self.time),
        );
        self.install(name, subsystem, severities, verbosity, Arc::new(logger));
    }

    /// Register every configured sink
    ///
    /// # Errors
    ///
    /// Returns the first invalid sink; sinks before it stay registered
    pub fn add_sinks(&self, sinks: &[SinkConfig]) -> Result<()> {
        sinks.iter().try_for_each(|sink| self.add_sink(sink))
    }

    /// Register one configured sink
    ///
    /// # Errors
    ///
    /// Returns error if the sink does not validate or needs a disabled feature
    pub fn add_sink(&self, sink: &SinkConfig) -> Result<()> {
        sink.validate()?;
        let name = sink.name.as_str();
        let subsystem = sink.subsystem.as_str();
        let severities = sink.mask();

        match &sink.output {
            SinkOutput::File { path, sync } => {
                self.add_file_logger(name, subsystem, severities, sink.verbosity, path, *sync);
                Ok(())
            }
            SinkOutput::PatternFile { template, sync, .. } => {
                let holder = match sink.output.check_interval() {
                    Some(interval) => PatternFile::with_check_interval(
                        template.as_str(),
                        *sync,
                        interval,
                        self.time.as_ref(),
                    )?,
                    None => PatternFile::new(template.as_str(), *sync, self.time.as_ref()),
                };
                self.add_rotatable_file_logger(
                    name,
                    subsystem,
                    severities,
                    sink.verbosity,
                    Arc::new(holder),
                )
            }
            SinkOutput::RotatingFile {
                path,
                sync,
                max_size,
                check_interval_secs,
            } => {
                let policy = RotationPolicy::new()
                    .with_max_size(*max_size)
                    .with_check_interval(Duration::from_secs(*check_interval_secs))
                    .with_sync(*sync);
                self.add_rotating_file_logger(
                    name,
                    subsystem,
                    severities,
                    sink.verbosity,
                    path,
                    policy,
                )
            }
            SinkOutput::Console { stream } => self.add_configured_console(sink, *stream),
        }
    }

    #[cfg(feature = "console")]
    fn add_configured_console(&self, sink: &SinkConfig, stream: ConsoleStream) -> Result<()> {
        self.add_console_logger(
            sink.name.as_str(),
            sink.subsystem.as_str(),
            sink.mask(),
            sink.verbosity,
            stream,
        );
        Ok(())
    }

    #[cfg(not(feature = "console"))]
    fn add_configured_console(&self, sink: &SinkConfig, _stream: ConsoleStream) -> Result<()> {
        Err(super::error::LoggerError::config(
            format!("sink '{}'", sink.name),
            "console output requires the 'console' feature",
        ))
    }

    pub fn log_object(
        &self,
        subsystem: &str,
        severity: Severity,
        verbosity: Verbosity,
        object: &dyn LogObject,
    ) {
        self.dispatcher.route(subsystem, severity, verbosity, object);
    }

    pub fn log_message(
        &self,
        subsystem: &str,
        severity: Severity,
        verbosity: Verbosity,
        message: impl Into<String>,
    ) {
        self.dispatcher
            .log_message(subsystem, severity, verbosity, message);
    }

    pub fn log_fmt(
        &self,
        subsystem: &str,
        severity: Severity,
        verbosity: Verbosity,
        args: fmt::Arguments<'_>,
    ) {
        self.dispatcher.log_fmt(subsystem, severity, verbosity, args);
    }

    /// Notify the scheduler that the time source moved; blocks until every
    /// rotation due at the new time has run
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerStopped`](crate::LoggerError::SchedulerStopped) after
    /// shutdown
    pub fn time_changed(&self) -> Result<()> {
        self.scheduler.time_changed()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn scheduler(&self) -> &RotationScheduler {
        &self.scheduler
    }

    pub fn time_source(&self) -> &Arc<dyn TimeSource> {
        &self.time
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Stop rotation, then destroy every sink
    ///
    /// Idempotent. No other thread may be logging through the runtime.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        self.dispatcher.shutdown();
    }
}

impl Drop for LogRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for LogRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRuntime")
            .field("dispatcher", &self.dispatcher)
            .field("scheduler_running", &self.scheduler.is_running())
            .finish()
    }
}
