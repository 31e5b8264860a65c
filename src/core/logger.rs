//! Logger trait for sink adapters

use super::log_object::LogObject;
use super::severity::{Severity, Verbosity};

/// A sink adapter turning routed records into output.
///
/// Implementations must be callable from many threads at once and must
/// ignore objects whose shape they do not understand.
pub trait Logger: Send + Sync {
    fn log_object(
        &self,
        system: &str,
        subsystem: &str,
        severity: Severity,
        verbosity: Verbosity,
        object: &dyn LogObject,
    );

    /// Release resources owned by the logger.
    ///
    /// Not thread safe: no other call into this logger may be in flight.
    fn destroy(&self);

    fn name(&self) -> &str;
}
