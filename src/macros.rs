//! Logging macros for ergonomic log message formatting.
//!
//! The macros accept anything with a `log_fmt(subsystem, severity,
//! verbosity, fmt::Arguments)` method: a [`LogRuntime`](crate::LogRuntime) or a
//! bare [`Dispatcher`](crate::Dispatcher). Formatting is lazy, so a record no
//! sink accepts is never formatted.
//!
//! # Examples
//!
//! ```
//! use rust_log_dispatch::prelude::*;
//! use rust_log_dispatch::{error, info};
//!
//! let dispatcher = Dispatcher::new("app");
//!
//! // Verbosity 1, no subsystem
//! info!(dispatcher, 1, "Server started");
//!
//! // With format arguments and a subsystem
//! let port = 8080;
//! error!(dispatcher, subsystem = "net", 2, "Failed to bind port {}", port);
//! ```

/// Log a message with explicit severity and verbosity.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::new("app");
/// use rust_log_dispatch::log;
/// log!(dispatcher, Severity::Info, 1, "Simple message");
/// log!(dispatcher, subsystem = "http", Severity::Error, 2, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($target:expr, subsystem = $subsystem:expr, $severity:expr, $verbosity:expr, $($arg:tt)+) => {
        $target.log_fmt($subsystem, $severity, $verbosity, format_args!($($arg)+))
    };
    ($target:expr, $severity:expr, $verbosity:expr, $($arg:tt)+) => {
        $target.log_fmt("", $severity, $verbosity, format_args!($($arg)+))
    };
}

/// Log a critical message.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::new("app");
/// use rust_log_dispatch::critical;
/// critical!(dispatcher, 1, "Database unreachable");
/// ```
#[macro_export]
macro_rules! critical {
    ($target:expr, subsystem = $subsystem:expr, $verbosity:expr, $($arg:tt)+) => {
        $crate::log!(
            $target,
            subsystem = $subsystem,
            $crate::Severity::Critical,
            $verbosity,
            $($arg)+
        )
    };
    ($target:expr, $verbosity:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::Severity::Critical, $verbosity, $($arg)+)
    };
}

/// Log an error message.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::new("app");
/// use rust_log_dispatch::error;
/// error!(dispatcher, 2, "Request failed with status {}", 503);
/// ```
#[macro_export]
macro_rules! error {
    ($target:expr, subsystem = $subsystem:expr, $verbosity:expr, $($arg:tt)+) => {
        $crate::log!($target, subsystem = $subsystem, $crate::Severity::Error, $verbosity, $($arg)+)
    };
    ($target:expr, $verbosity:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::Severity::Error, $verbosity, $($arg)+)
    };
}

/// Log a warning message.
///
/// # Examples
///
/// ```
/// # use rust_log_dispatch::prelude::*;
/// # let dispatcher = Dispatcher::new("app");
/// use rust_log_dispatch::warning;
/// warning!(dispatcher, 3, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($target:expr, subsystem = $subsystem:expr, $verbosity:expr, $($arg:tt)+) => {
        $crate::log!(
            $target,
            subsystem = $subsystem,
            $crate::Severity::Warning,
            $verbosity,
            $($arg)+
        )
    };
    ($target:expr, $verbosity:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::Severity::Warning, $verbosity, $($arg)+)
    };
}

/// Log an informational message.
#[macro_export]
macro_rules! info {
    ($target:expr, subsystem = $subsystem:expr, $verbosity:expr, $($arg:tt)+) => {
        $crate::log!($target, subsystem = $subsystem, $crate::Severity::Info, $verbosity, $($arg)+)
    };
    ($target:expr, $verbosity:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::Severity::Info, $verbosity, $($arg)+)
    };
}

/// Log a debug message.
#[macro_export]
macro_rules! debug {
    ($target:expr, subsystem = $subsystem:expr, $verbosity:expr, $($arg:tt)+) => {
        $crate::log!($target, subsystem = $subsystem, $crate::Severity::Debug, $verbosity, $($arg)+)
    };
    ($target:expr, $verbosity:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::Severity::Debug, $verbosity, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::dispatcher::Dispatcher;
    use crate::core::log_object::LogObject;
    use crate::core::logger::Logger;
    use crate::core::severity::{Severity, SeverityMask, Verbosity};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Capture {
        lines: Mutex<Vec<(String, Severity, Verbosity, String)>>,
    }

    impl Logger for Capture {
        fn log_object(
            &self,
            _system: &str,
            subsystem: &str,
            severity: Severity,
            verbosity: Verbosity,
            object: &dyn LogObject,
        ) {
            if let Some(line) = object.as_line() {
                self.lines.lock().push((
                    subsystem.to_string(),
                    severity,
                    verbosity,
                    line.log_line().into_owned(),
                ));
            }
        }

        fn destroy(&self) {}

        fn name(&self) -> &str {
            "capture"
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<Capture>) {
        let dispatcher = Dispatcher::new("test");
        let capture = Arc::new(Capture::default());
        dispatcher.register("capture", "", SeverityMask::ALL, 5, capture.clone());
        (dispatcher, capture)
    }

    #[test]
    fn test_severity_macros() {
        let (dispatcher, capture) = dispatcher();

        critical!(dispatcher, 1, "c");
        error!(dispatcher, 2, "e {}", 2);
        warning!(dispatcher, 3, "w");
        info!(dispatcher, 4, "i");
        debug!(dispatcher, 5, "d");

        let lines = capture.lines.lock();
        let severities: Vec<Severity> = lines.iter().map(|l| l.1).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Critical,
                Severity::Error,
                Severity::Warning,
                Severity::Info,
                Severity::Debug
            ]
        );
        assert_eq!(lines[1].2, 2);
        assert_eq!(lines[1].3, "e 2");
    }

    #[test]
    fn test_subsystem_form() {
        let (dispatcher, capture) = dispatcher();

        error!(dispatcher, subsystem = "net", 1, "timeout after {}ms", 30);
        log!(dispatcher, subsystem = "db", Severity::Info, 2, "ok");

        let lines = capture.lines.lock();
        assert_eq!(lines[0].0, "net");
        assert_eq!(lines[0].3, "timeout after 30ms");
        assert_eq!(lines[1].0, "db");
        assert_eq!(lines[1].1, Severity::Info);
    }
}
