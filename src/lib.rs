//! # Rust Log Dispatch
//!
//! An in-process logging runtime: a filtering dispatcher fanning records out
//! to named sinks, and a background scheduler rotating their files.
//!
//! ## Features
//!
//! - **Filtered routing**: each sink selects records by subsystem, severity
//!   mask and verbosity ceiling
//! - **Size rotation**: `app.log` becomes `app.log.1`, older backups shift up
//! - **Pattern files**: file names such as `app-%Y%m%d.log` follow the clock
//! - **Thread safe**: whole lines under concurrent writers, one rotation thread
//! - **Testable time**: every clock read goes through a [`TimeSource`]
//!
//! ## Example
//!
//! ```no_run
//! use rust_log_dispatch::prelude::*;
//! use rust_log_dispatch::info;
//!
//! let runtime = LogRuntime::new("app").unwrap();
//! runtime
//!     .add_pattern_file_logger(
//!         "daily",
//!         "",
//!         SeverityMask::ALL,
//!         3,
//!         "/var/log/app-%Y%m%d.log",
//!         false,
//!     )
//!     .unwrap();
//!
//! info!(runtime, 1, "listening on port {}", 8080);
//! runtime.shutdown();
//! ```

pub mod core;
pub mod holders;
pub mod loggers;
pub mod macros;
pub mod rotation;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::loggers::ConsoleLogger;
    pub use crate::core::{
        ConsoleStream, Dispatcher, LocalTimeSource, LogMessage, LogObject, LogRuntime,
        LogRuntimeBuilder, Logger, LoggerError, LoggerMetrics, LoggingConfig, MockTimeSource,
        Result, Severity, SeverityMask, SinkConfig, SinkOutput, TimeSource, Verbosity,
    };
    pub use crate::holders::{FileHolder, PatternFile, RotatingFile, RotationPolicy, SimpleFile};
    pub use crate::loggers::{DefaultLineFormatter, FileLogger, LineFormatter};
    pub use crate::rotation::{LogRotator, RotationScheduler};
}

#[cfg(feature = "console")]
pub use crate::loggers::{ConsoleHolder, ConsoleLogger};
pub use crate::core::{
    ConsoleStream, Dispatcher, FormattedMessage, LineObject, LocalTimeSource, LogMessage,
    LogObject, LogRuntime, LogRuntimeBuilder, Logger, LoggerError, LoggerMetrics, LoggingConfig,
    MockTimeSource, Result, Severity, SeverityMask, SinkConfig, SinkOutput, SinkRegistration,
    TimeSource, Verbosity,
};
pub use crate::holders::{
    expand_template, Color, ConsoleWriter, FileHolder, FileWriter, PatternFile, RotatingFile,
    RotationPolicy, SimpleFile, SimpleFileWriter, DEFAULT_PATTERN_CHECK_INTERVAL,
};
pub use crate::loggers::{DefaultLineFormatter, FileLogger, LineFormatter, LineRecord};
pub use crate::rotation::{
    LogRotator, RotatableFileHolder, Rotation, RotationScheduler, MAX_CHECK_INTERVAL, PANIC_BACKOFF,
};
