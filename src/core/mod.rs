//! Core types: records, routing, time, configuration and the runtime handle

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod log_object;
pub mod logger;
pub mod metrics;
pub mod runtime;
pub mod severity;
pub mod time_source;

pub use config::{ConsoleStream, LoggingConfig, SinkConfig, SinkOutput};
pub use dispatcher::{Dispatcher, SinkRegistration};
pub use error::{LoggerError, Result};
pub use log_object::{FormattedMessage, LineObject, LogMessage, LogObject};
pub use logger::Logger;
pub use metrics::LoggerMetrics;
pub use runtime::{LogRuntime, LogRuntimeBuilder};
pub use severity::{Severity, SeverityMask, Verbosity};
pub use time_source::{LocalTimeSource, MockTimeSource, TimeSource};
