// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Codec entry-point benchmarks.
//!
//! One criterion benchmark per format × operation × mode. Criterion's
//! iteration count is handed to the driver as the trial count B, and the
//! driver's timed phase is reported back, so input preparation never shows up
//! in the measurement.

use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use tokio::runtime::Runtime;
use toonbench_core::{BenchContext, Config, EntryPoint, Operation, PayloadSize, Runner};

/// Payload size shared by every entry point, matching the default suite.
const USERS: i64 = 5000;

fn runner() -> Runner {
    let mut config = Config::default();
    config.suite.users = PayloadSize::new(USERS).expect("Valid payload size");
    let context = BenchContext::new(config).expect("Failed to build benchmark context");
    Runner::new(Arc::new(context))
}

fn encoded_len(runner: &Runner, entry: EntryPoint) -> u64 {
    let context = runner.context();
    let codec = context.codec(entry.format).expect("Codec configured");
    codec
        .encode(context.payload())
        .expect("Encode failed")
        .len() as u64
}

fn bench_entry_points(c: &mut Criterion, operation: Operation) {
    let rt = Runtime::new().expect("Failed to build tokio runtime");
    let runner = runner();

    let mut group = c.benchmark_group(format!("{}_{}_users", operation, USERS));
    group.measurement_time(Duration::from_secs(5));

    for entry in runner
        .entry_points()
        .into_iter()
        .filter(|e| e.operation == operation)
    {
        group.throughput(Throughput::Bytes(encoded_len(&runner, entry)));
        group.bench_function(entry.name(), |b| {
            b.to_async(&rt).iter_custom(|iters| {
                let runner = runner.clone();
                async move {
                    runner
                        .run(entry, iters as usize)
                        .await
                        .and_then(|report| report.into_result())
                        .expect("Benchmark run failed")
                        .elapsed
                }
            });
        });
    }

    group.finish();
}

/// Benchmark serialization of the canonical payload.
fn bench_encode(c: &mut Criterion) {
    bench_entry_points(c, Operation::Encode);
}

/// Benchmark deserialization of pre-encoded buffers.
fn bench_decode(c: &mut Criterion) {
    bench_entry_points(c, Operation::Decode);
}

criterion_group!(benches, bench_encode, bench_decode);

criterion_main!(benches);
