//! Filtering dispatcher
//!
//! Holds the registry of named sinks and routes every record to each sink
//! whose subsystem, severity mask and verbosity ceiling accept it.

use super::{
    log_object::{FormattedMessage, LogMessage, LogObject},
    logger::Logger,
    metrics::LoggerMetrics,
    severity::{Severity, SeverityMask, Verbosity},
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A named sink together with its filters
#[derive(Clone)]
pub struct SinkRegistration {
    subsystem: String,
    severities: SeverityMask,
    verbosity: Verbosity,
    sink: Arc<dyn Logger>,
}

impl SinkRegistration {
    pub fn new(
        subsystem: impl Into<String>,
        severities: SeverityMask,
        verbosity: Verbosity,
        sink: Arc<dyn Logger>,
    ) -> Self {
        Self {
            subsystem: subsystem.into(),
            severities,
            verbosity,
            sink,
        }
    }

    /// Check the record filters. An empty registration subsystem is a
    /// wildcard; a zero verbosity ceiling never matches.
    #[inline]
    pub fn accepts(&self, subsystem: &str, severity: Severity, verbosity: Verbosity) -> bool {
        (self.subsystem.is_empty() || self.subsystem == subsystem)
            && self.severities.contains(severity)
            && self.verbosity != 0
            && verbosity <= self.verbosity
    }

    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    pub fn severities(&self) -> SeverityMask {
        self.severities
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn sink(&self) -> &Arc<dyn Logger> {
        &self.sink
    }
}

impl fmt::Debug for SinkRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkRegistration")
            .field("subsystem", &self.subsystem)
            .field("severities", &self.severities)
            .field("verbosity", &self.verbosity)
            .field("sink", &self.sink.name())
            .finish()
    }
}

/// Routes records to registered sinks
///
/// # Example
///
/// ```
/// use rust_log_dispatch::prelude::*;
///
/// let dispatcher = Dispatcher::new("app");
/// dispatcher.log_message("db", Severity::Info, 1, "connected");
/// assert_eq!(dispatcher.metrics().records_unmatched(), 1);
/// ```
pub struct Dispatcher {
    system: String,
    sinks: RwLock<HashMap<String, SinkRegistration>>,
    metrics: Arc<LoggerMetrics>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(system: impl Into<String>) -> Self {
        Self::with_metrics(system, Arc::new(LoggerMetrics::new()))
    }

    #[must_use]
    pub fn with_metrics(system: impl Into<String>, metrics: Arc<LoggerMetrics>) -> Self {
        Self {
            system: system.into(),
            sinks: RwLock::new(HashMap::new()),
            metrics,
        }
    }

    /// Register a sink under a unique name.
    ///
    /// Registering an existing name replaces that registration; the displaced
    /// sink is handed back to the caller instead of being destroyed.
    pub fn register(
        &self,
        name: impl Into<String>,
        subsystem: impl Into<String>,
        severities: SeverityMask,
        verbosity: Verbosity,
        sink: Arc<dyn Logger>,
    ) -> Option<Arc<dyn Logger>> {
        let registration = SinkRegistration::new(subsystem, severities, verbosity, sink);
        let mut sinks = self.sinks.write();
        sinks
            .insert(name.into(), registration)
            .map(|previous| previous.sink)
    }

    /// Forward a record to every matching sink.
    ///
    /// Sinks are visited in no particular order. A record matching no sink is
    /// dropped silently. A panicking sink does not prevent delivery to the
    /// others.
    pub fn route(
        &self,
        subsystem: &str,
        severity: Severity,
        verbosity: Verbosity,
        object: &dyn LogObject,
    ) {
        self.metrics.record_routed();

        let sinks = self.sinks.read();
        let mut delivered = 0u64;
        for (name, registration) in sinks.iter() {
            if !registration.accepts(subsystem, severity, verbosity) {
                continue;
            }
            delivered += 1;

            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                registration
                    .sink
                    .log_object(&self.system, subsystem, severity, verbosity, object)
            }));

            if let Err(panic_info) = result {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                eprintln!(
                    "[LOGGER CRITICAL] Sink '{}' panicked: {}. Other sinks continue to function.",
                    name, panic_msg
                );
            }
        }

        if delivered == 0 {
            self.metrics.record_unmatched();
        } else {
            self.metrics.record_deliveries(delivered);
        }
    }

    /// Log a plain text message
    pub fn log_message(
        &self,
        subsystem: &str,
        severity: Severity,
        verbosity: Verbosity,
        message: impl Into<String>,
    ) {
        self.route(subsystem, severity, verbosity, &LogMessage::new(message));
    }

    /// Log a formatted message; formatting happens only if a sink renders it
    pub fn log_fmt(
        &self,
        subsystem: &str,
        severity: Severity,
        verbosity: Verbosity,
        args: fmt::Arguments<'_>,
    ) {
        self.route(subsystem, severity, verbosity, &FormattedMessage::new(args));
    }

    /// Destroy every registered sink exactly once and empty the registry.
    ///
    /// Must not race `route` or `register`: callers guarantee that no other
    /// thread is using the dispatcher. Returns the number of sinks released.
    pub fn unregister_all(&self) -> usize {
        let drained: Vec<(String, SinkRegistration)> = self.sinks.write().drain().collect();
        let count = drained.len();
        for (_, registration) in drained {
            registration.sink.destroy();
        }
        count
    }

    /// Shut the dispatcher down; see [`unregister_all`](Self::unregister_all)
    pub fn shutdown(&self) -> usize {
        self.unregister_all()
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn registration(&self, name: &str) -> Option<SinkRegistration> {
        self.sinks.read().get(name).cloned()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("system", &self.system)
            .field("sinks", &self.sink_count())
            .finish()
    }
}
