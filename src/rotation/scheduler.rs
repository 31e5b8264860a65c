//! Rotation scheduler
//!
//! One dedicated thread owns a min-heap of rotators ordered by their next
//! check time. Callers talk to it only through a command channel, so the heap
//! is never shared.
//!
//! The thread sleeps until the earliest check is due or a command arrives.
//! When woken by time, it services every entry whose check time has passed
//! (at most once per entry per wake-up), reschedules each one and sleeps
//! again.
//!
//! **Fault isolation**: each rotator is serviced inside `catch_unwind`. A
//! panicking rotator is counted, reported on stderr and retried after
//! [`PANIC_BACKOFF`]; the other rotators keep running.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use super::rotator::{LogRotator, Rotation};
use crate::core::error::{LoggerError, Result};
use crate::core::metrics::LoggerMetrics;
use crate::core::time_source::TimeSource;

/// Delay before a panicking rotator is checked again
pub const PANIC_BACKOFF: Duration = Duration::from_secs(60);

enum Command {
    Register(Arc<dyn LogRotator>),
    TimeChanged(Sender<()>),
    Shutdown,
}

struct ScheduledRotator {
    next_check: DateTime<Local>,
    seq: u64,
    rotator: Arc<dyn LogRotator>,
}

impl PartialEq for ScheduledRotator {
    fn eq(&self, other: &Self) -> bool {
        self.next_check == other.next_check && self.seq == other.seq
    }
}

impl Eq for ScheduledRotator {}

impl PartialOrd for ScheduledRotator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledRotator {
    // Reversed: the earliest check sits at the top of the max-heap
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .next_check
            .cmp(&self.next_check)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

struct SchedulerLoop {
    receiver: Receiver<Command>,
    heap: BinaryHeap<ScheduledRotator>,
    seq: u64,
    time: Arc<dyn TimeSource>,
    metrics: Arc<LoggerMetrics>,
    backoff: chrono::Duration,
}

impl SchedulerLoop {
    fn run(mut self) {
        loop {
            let command = match self.wait_time() {
                Some(wait) => self.receiver.recv_timeout(wait),
                None => self
                    .receiver
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };

            match command {
                Ok(Command::Register(rotator)) => self.schedule(rotator),
                Ok(Command::TimeChanged(ack)) => {
                    self.service_due();
                    let _ = ack.send(());
                }
                Err(RecvTimeoutError::Timeout) => self.service_due(),
                Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// Time until the earliest check, or `None` when nothing is scheduled
    fn wait_time(&self) -> Option<Duration> {
        let top = self.heap.peek()?;
        let remaining = top.next_check - self.time.now();
        Some(remaining.to_std().unwrap_or(Duration::ZERO))
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn schedule(&mut self, rotator: Arc<dyn LogRotator>) {
        let time = Arc::clone(&self.time);
        let first_check = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            rotator.next_check_time(time.as_ref())
        }));
        let next_check = match first_check {
            Ok(next_check) => next_check,
            Err(panic_info) => self.report_panic(panic_info.as_ref()),
        };

        let seq = self.next_seq();
        self.heap.push(ScheduledRotator {
            next_check,
            seq,
            rotator,
        });
    }

    /// Service every entry due at a single reading of the clock
    fn service_due(&mut self) {
        let now = self.time.now();
        let mut serviced = Vec::new();

        while self.heap.peek().is_some_and(|top| top.next_check <= now) {
            if let Some(entry) = self.heap.pop() {
                serviced.push(entry);
            }
        }

        for mut entry in serviced {
            entry.next_check = self.service(entry.rotator.as_ref());
            entry.seq = self.next_seq();
            self.heap.push(entry);
        }
    }

    /// Run one check-and-rotate cycle and return the next check time
    fn service(&self, rotator: &dyn LogRotator) -> DateTime<Local> {
        let time = self.time.as_ref();
        let metrics = self.metrics.as_ref();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            metrics.record_rotation_check();
            if rotator.needs_rotate(time) {
                match rotator.rotate(time) {
                    Ok(Rotation::Rotated) => {
                        metrics.record_rotation();
                    }
                    Ok(Rotation::Reopened) | Ok(Rotation::Unchanged) => {}
                    Err(e) => {
                        metrics.record_rotation_failure();
                        eprintln!(
                            "[LOGGER WARNING] Log rotation failed: {}. Retrying at next check.",
                            e
                        );
                    }
                }
            }
            rotator.next_check_time(time)
        }));

        match outcome {
            Ok(next_check) => next_check,
            Err(panic_info) => self.report_panic(panic_info.as_ref()),
        }
    }

    fn report_panic(&self, panic_info: &(dyn std::any::Any + Send)) -> DateTime<Local> {
        self.metrics.record_rotator_panic();
        eprintln!(
            "[LOGGER CRITICAL] Log rotator panicked: {}. Retrying in {:?}.",
            panic_message(panic_info),
            PANIC_BACKOFF
        );
        self.time.now() + self.backoff
    }
}

/// Periodically drives registered [`LogRotator`]s on a dedicated thread
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rust_log_dispatch::{LoggerMetrics, MockTimeSource, RotationScheduler};
///
/// let clock = Arc::new(MockTimeSource::parse("2018-08-25T14:00:00").unwrap());
/// let scheduler = RotationScheduler::new(clock.clone(), Arc::new(LoggerMetrics::new())).unwrap();
///
/// clock.shift(chrono::Duration::minutes(2));
/// scheduler.time_changed().unwrap();
///
/// scheduler.shutdown();
/// assert!(!scheduler.is_running());
/// ```
pub struct RotationScheduler {
    sender: Sender<Command>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RotationScheduler {
    /// Start the scheduler thread
    ///
    /// # Errors
    ///
    /// Returns error if the thread cannot be spawned
    pub fn new(time: Arc<dyn TimeSource>, metrics: Arc<LoggerMetrics>) -> Result<Self> {
        let (sender, receiver) = unbounded();
        let scheduler_loop = SchedulerLoop {
            receiver,
            heap: BinaryHeap::new(),
            seq: 0,
            time,
            metrics,
            backoff: chrono::Duration::seconds(PANIC_BACKOFF.as_secs() as i64),
        };

        let handle = thread::Builder::new()
            .name("log-rotation".to_string())
            .spawn(move || scheduler_loop.run())
            .map_err(|e| {
                LoggerError::io_operation(
                    "start rotation scheduler",
                    "Failed to spawn rotation thread",
                    e,
                )
            })?;

        Ok(Self {
            sender,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Hand a rotator to the scheduler thread
    ///
    /// Its first check is scheduled at `rotator.next_check_time(now)`.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::SchedulerStopped`] after shutdown
    pub fn register(&self, rotator: Arc<dyn LogRotator>) -> Result<()> {
        self.sender
            .send(Command::Register(rotator))
            .map_err(|_| LoggerError::SchedulerStopped)
    }

    /// Tell the scheduler that the time source moved
    ///
    /// Blocks until the scheduler has processed every earlier command and
    /// serviced everything due at the new time.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::SchedulerStopped`] after shutdown
    pub fn time_changed(&self) -> Result<()> {
        let (ack_sender, ack_receiver) = crossbeam_channel::bounded(1);
        self.sender
            .send(Command::TimeChanged(ack_sender))
            .map_err(|_| LoggerError::SchedulerStopped)?;
        ack_receiver
            .recv()
            .map_err(|_| LoggerError::SchedulerStopped)
    }

    /// Stop the scheduler thread and wait for it to exit
    ///
    /// Idempotent. Rotators still registered are dropped by the thread.
    pub fn shutdown(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };

        let _ = self.sender.send(Command::Shutdown);
        if let Err(e) = handle.join() {
            eprintln!(
                "[LOGGER ERROR] Rotation thread panicked: {}",
                panic_message(e.as_ref())
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
