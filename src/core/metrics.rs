//! Runtime metrics for observability
//!
//! Counters for routing and rotation activity. Failures that the runtime
//! absorbs (unmatched records, failed rotations, panicking rotators) are
//! visible here rather than being returned to log callers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics shared by the dispatcher and the rotation scheduler
///
/// # Example
///
/// ```
/// use rust_log_dispatch::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_routed();
/// metrics.record_unmatched();
///
/// assert_eq!(metrics.records_routed(), 1);
/// assert_eq!(metrics.records_unmatched(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records submitted to the dispatcher
    records_routed: AtomicU64,

    /// Sink deliveries (one record may reach several sinks)
    deliveries: AtomicU64,

    /// Records that matched no sink and were dropped
    records_unmatched: AtomicU64,

    /// Rotation checks performed by the scheduler
    rotation_checks: AtomicU64,

    /// Rotations that swapped the live file
    rotations: AtomicU64,

    /// Rotations aborted by a file-system error
    rotation_failures: AtomicU64,

    /// Rotators that panicked while being serviced
    rotator_panics: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            records_routed: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            records_unmatched: AtomicU64::new(0),
            rotation_checks: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
            rotator_panics: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_routed(&self) -> u64 {
        self.records_routed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_unmatched(&self) -> u64 {
        self.records_unmatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotation_checks(&self) -> u64 {
        self.rotation_checks.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotation_failures(&self) -> u64 {
        self.rotation_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotator_panics(&self) -> u64 {
        self.rotator_panics.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_routed(&self) -> u64 {
        self.records_routed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_deliveries(&self, count: u64) -> u64 {
        self.deliveries.fetch_add(count, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_unmatched(&self) -> u64 {
        self.records_unmatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation_check(&self) -> u64 {
        self.rotation_checks.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation_failure(&self) -> u64 {
        self.rotation_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotator_panic(&self) -> u64 {
        self.rotator_panics.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of routed records that reached no sink, as a percentage
    ///
    /// Returns 0.0 if nothing has been routed.
    pub fn unmatched_rate(&self) -> f64 {
        let routed = self.records_routed() as f64;
        if routed == 0.0 {
            0.0
        } else {
            (self.records_unmatched() as f64 / routed) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.records_routed.store(0, Ordering::Relaxed);
        self.deliveries.store(0, Ordering::Relaxed);
        self.records_unmatched.store(0, Ordering::Relaxed);
        self.rotation_checks.store(0, Ordering::Relaxed);
        self.rotations.store(0, Ordering::Relaxed);
        self.rotation_failures.store(0, Ordering::Relaxed);
        self.rotator_panics.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            records_routed: AtomicU64::new(self.records_routed()),
            deliveries: AtomicU64::new(self.deliveries()),
            records_unmatched: AtomicU64::new(self.records_unmatched()),
            rotation_checks: AtomicU64::new(self.rotation_checks()),
            rotations: AtomicU64::new(self.rotations()),
            rotation_failures: AtomicU64::new(self.rotation_failures()),
            rotator_panics: AtomicU64::new(self.rotator_panics()),
        }
    }
}
