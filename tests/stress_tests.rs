//! Stress tests for concurrent logging and rotation
//!
//! These tests verify:
//! - Lines from concurrent writers are never torn or interleaved
//! - Registration may race routing without losing the registry's consistency
//! - A panicking sink never starves the others
//! - Rotating under concurrent writes loses no line

use rust_log_dispatch::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

struct CountingLogger {
    count: AtomicUsize,
}

impl CountingLogger {
    fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
        }
    }
}

impl Logger for CountingLogger {
    fn log_object(&self, _: &str, _: &str, _: Severity, _: Verbosity, _: &dyn LogObject) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn destroy(&self) {}

    fn name(&self) -> &str {
        "counting"
    }
}

struct PanickingLogger;

impl Logger for PanickingLogger {
    fn log_object(&self, _: &str, _: &str, _: Severity, _: Verbosity, _: &dyn LogObject) {
        panic!("sink failure");
    }

    fn destroy(&self) {}

    fn name(&self) -> &str {
        "panicking"
    }
}

fn backup(base: &Path, index: usize) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

/// Live file first, then `.1`, `.2`, ... up to the first missing backup
fn rotated_set(base: &Path) -> Vec<PathBuf> {
    let mut files = vec![base.to_path_buf()];
    files.extend((1..).map(|i| backup(base, i)).take_while(|p| p.exists()));
    files
}

#[test]
fn test_concurrent_writers_produce_whole_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("concurrent.log");
    let clock = Arc::new(MockTimeSource::parse("2018-08-25T14:02:00").unwrap());
    let runtime = LogRuntime::builder("stress")
        .time_source(clock)
        .build()
        .expect("Failed to start runtime");
    runtime.add_file_logger("file", "", SeverityMask::ALL, 5, &log_file, false);

    let num_threads = 8;
    let lines_per_thread = 1000;

    thread::scope(|s| {
        for t in 0..num_threads {
            let runtime = &runtime;
            s.spawn(move || {
                for i in 0..lines_per_thread {
                    runtime.log_fmt(
                        "worker",
                        Severity::Info,
                        1,
                        format_args!("payload-{}-{} {}", t, i, "x".repeat(40)),
                    );
                }
            });
        }
    });

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let mut last_seen: HashMap<usize, usize> = HashMap::new();
    let mut total = 0;

    for line in content.lines() {
        assert!(
            line.starts_with("stress 2018-08-25T14:02:00 [    INFO, 1] (worker): payload-"),
            "Torn line: {:?}",
            line
        );
        let payload = line.rsplit("payload-").next().unwrap();
        let (ids, filler) = payload.split_once(' ').unwrap();
        assert_eq!(filler.len(), 40, "Truncated line: {:?}", line);

        let (t, i) = ids.split_once('-').unwrap();
        let (t, i): (usize, usize) = (t.parse().unwrap(), i.parse().unwrap());
        if let Some(previous) = last_seen.insert(t, i) {
            assert!(i > previous, "Thread {} lines out of order", t);
        }
        total += 1;
    }

    assert_eq!(total, num_threads * lines_per_thread);
}

#[test]
fn test_registration_races_routing() {
    let dispatcher = Dispatcher::new("stress");
    let base = Arc::new(CountingLogger::new());
    dispatcher.register("base", "", SeverityMask::ALL, 5, base.clone());

    let sinks: Vec<Arc<CountingLogger>> =
        (0..100).map(|_| Arc::new(CountingLogger::new())).collect();
    let records_per_thread = 2000;

    thread::scope(|s| {
        for _ in 0..4 {
            let dispatcher = &dispatcher;
            s.spawn(move || {
                for i in 0..records_per_thread {
                    dispatcher.log_message("", Severity::Warning, 1, format!("record {}", i));
                }
            });
        }

        let dispatcher = &dispatcher;
        let sinks = &sinks;
        s.spawn(move || {
            for (i, sink) in sinks.iter().enumerate() {
                let previous = dispatcher.register(
                    format!("late-{}", i),
                    "",
                    SeverityMask::ALL,
                    5,
                    sink.clone(),
                );
                assert!(previous.is_none());
            }
        });
    });

    assert_eq!(dispatcher.sink_count(), 101);
    assert_eq!(base.count.load(Ordering::Relaxed), 4 * records_per_thread);

    dispatcher.log_message("", Severity::Warning, 1, "after registration");
    for sink in &sinks {
        assert!(sink.count.load(Ordering::Relaxed) >= 1);
    }
    assert_eq!(
        dispatcher.metrics().records_routed(),
        4 * records_per_thread as u64 + 1
    );
}

#[test]
fn test_panicking_sink_under_load() {
    let dispatcher = Dispatcher::new("stress");
    let healthy = Arc::new(CountingLogger::new());
    dispatcher.register("broken", "", SeverityMask::ALL, 5, Arc::new(PanickingLogger));
    dispatcher.register("healthy", "", SeverityMask::ALL, 5, healthy.clone());

    thread::scope(|s| {
        for _ in 0..4 {
            let dispatcher = &dispatcher;
            s.spawn(move || {
                for i in 0..250 {
                    dispatcher.log_message("io", Severity::Error, 2, format!("record {}", i));
                }
            });
        }
    });

    assert_eq!(healthy.count.load(Ordering::Relaxed), 1000);
    assert_eq!(dispatcher.metrics().deliveries(), 2000);
}

#[test]
fn test_rotation_under_concurrent_writes_loses_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotating.log");
    let clock = Arc::new(MockTimeSource::parse("2018-08-25T14:02:00").unwrap());
    let runtime = LogRuntime::builder("stress")
        .time_source(clock.clone())
        .build()
        .expect("Failed to start runtime");
    runtime
        .add_rotating_file_logger(
            "rotating",
            "",
            SeverityMask::ALL,
            5,
            &log_file,
            RotationPolicy::new()
                .with_max_size(4 * 1024)
                .with_check_interval(Duration::from_secs(60)),
        )
        .unwrap();

    let num_threads = 4;
    let lines_per_thread = 500;

    thread::scope(|s| {
        for t in 0..num_threads {
            let runtime = &runtime;
            s.spawn(move || {
                for i in 0..lines_per_thread {
                    runtime.log_fmt("", Severity::Info, 1, format_args!("writer {} line {}", t, i));
                    if i % 50 == 0 {
                        thread::yield_now();
                    }
                }
            });
        }

        for _ in 0..20 {
            clock.shift(chrono::Duration::minutes(1));
            runtime.time_changed().expect("scheduler running");
            thread::sleep(Duration::from_millis(1));
        }
    });

    // Everything written: one last check rotates whatever is left
    clock.shift(chrono::Duration::minutes(1));
    runtime.time_changed().unwrap();
    runtime.shutdown();

    let files = rotated_set(&log_file);
    assert!(files.len() >= 2, "No rotation happened");
    assert!(runtime.metrics().rotations() >= 1);
    assert_eq!(runtime.metrics().rotation_failures(), 0);

    let mut total = 0;
    for file in &files {
        let content = fs::read_to_string(file).expect("Failed to read log file");
        for line in content.lines() {
            assert!(line.starts_with("stress 2018-08-25T"), "Torn line: {:?}", line);
            assert!(line.contains("] (): writer "), "Torn line: {:?}", line);
            total += 1;
        }
    }
    assert_eq!(total, num_threads * lines_per_thread);
}
