//! Criterion benchmarks for rust_log_dispatch

use chrono::{Local, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_log_dispatch::prelude::*;
use rust_log_dispatch::{expand_template, LineRecord};
use std::sync::Arc;

struct NullLogger;

impl Logger for NullLogger {
    fn log_object(&self, _: &str, _: &str, _: Severity, _: Verbosity, object: &dyn LogObject) {
        if let Some(line) = object.as_line() {
            black_box(line.log_line());
        }
    }

    fn destroy(&self) {}

    fn name(&self) -> &str {
        "null"
    }
}

fn dispatcher_with_sinks(count: usize) -> Dispatcher {
    let dispatcher = Dispatcher::new("bench");
    for i in 0..count {
        let subsystem = if i % 2 == 0 { "" } else { "db" };
        dispatcher.register(
            format!("sink-{}", i),
            subsystem,
            SeverityMask::STD,
            (i % 5 + 1) as Verbosity,
            Arc::new(NullLogger),
        );
    }
    dispatcher
}

// ============================================================================
// Routing Benchmarks
// ============================================================================

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    group.throughput(Throughput::Elements(1));

    for sinks in [1usize, 4, 16] {
        let dispatcher = dispatcher_with_sinks(sinks);

        group.bench_with_input(BenchmarkId::new("matched", sinks), &dispatcher, |b, d| {
            b.iter(|| d.log_message("db", Severity::Error, 1, black_box("Matched message")));
        });

        // Debug is outside every mask: the message is never formatted
        group.bench_with_input(BenchmarkId::new("unmatched", sinks), &dispatcher, |b, d| {
            b.iter(|| {
                d.log_fmt(
                    "db",
                    Severity::Debug,
                    1,
                    format_args!("Unmatched {} {}", black_box(42), black_box("args")),
                )
            });
        });
    }

    group.finish();
}

// ============================================================================
// Template Benchmarks
// ============================================================================

fn bench_expand_template(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_template");
    group.throughput(Throughput::Elements(1));

    let time = NaiveDate::from_ymd_opt(2018, 8, 25)
        .and_then(|d| d.and_hms_opt(14, 2, 0))
        .expect("valid date");

    group.bench_function("daily", |b| {
        b.iter(|| expand_template(black_box("/var/log/app-%Y%m%d.log"), &time));
    });

    group.bench_function("minutely", |b| {
        b.iter(|| expand_template(black_box("/var/log/app-%Y-%m-%d-%H-%M.log"), &time));
    });

    group.finish();
}

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn bench_formatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatter");
    group.throughput(Throughput::Elements(1));

    let record = LineRecord {
        system: "bench",
        subsystem: "net",
        severity: Severity::Warning,
        verbosity: 2,
        time: Local::now(),
        line: "connection reset by peer",
    };

    let full = DefaultLineFormatter::new();
    group.bench_function("full", |b| {
        b.iter(|| full.format(black_box(&record)));
    });

    let short = DefaultLineFormatter::short();
    group.bench_function("short", |b| {
        b.iter(|| short.format(black_box(&record)));
    });

    group.finish();
}

// ============================================================================
// File Sink Benchmarks
// ============================================================================

fn bench_file_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_logging");
    group.throughput(Throughput::Elements(1));

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let runtime = LogRuntime::new("bench").expect("Failed to start runtime");
    runtime.add_file_logger(
        "file",
        "",
        SeverityMask::ALL,
        5,
        temp_dir.path().join("bench.log"),
        false,
    );
    runtime
        .add_rotating_file_logger(
            "rotating",
            "rot",
            SeverityMask::ALL,
            5,
            temp_dir.path().join("bench-rotating.log"),
            RotationPolicy::new().with_max_size(1024 * 1024),
        )
        .expect("Failed to add rotating logger");

    group.bench_function("plain_file", |b| {
        b.iter(|| runtime.log_message("", Severity::Info, 1, black_box("File message")));
    });

    group.bench_function("rotating_file", |b| {
        b.iter(|| runtime.log_message("rot", Severity::Info, 1, black_box("Rotating message")));
    });

    group.finish();
    runtime.shutdown();
}

criterion_group!(
    benches,
    bench_routing,
    bench_expand_template,
    bench_formatter,
    bench_file_logging,
);

criterion_main!(benches);
