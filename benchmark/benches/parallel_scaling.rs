// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Parallel fan-out scaling across payload sizes.
//!
//! Runs the parallel encode and decode drivers for each format at growing
//! payload sizes to show where per-task overhead stops dominating.

use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;
use toonbench_core::{generate, CodecConfig, Format, Operation, ParallelDriver};

/// Payload sizes to benchmark (users per payload).
const PAYLOAD_USERS: &[i64] = &[10, 100, 1000, 5000];

fn bench_parallel_scaling(c: &mut Criterion, operation: Operation) {
    let rt = Runtime::new().expect("Failed to build tokio runtime");
    let driver = ParallelDriver::default();

    let mut group = c.benchmark_group(format!("parallel_{}_scaling", operation));
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(5));

    for format in Format::ALL {
        let codec = CodecConfig::default_for(format)
            .build()
            .expect("Default options are valid");

        for &users in PAYLOAD_USERS {
            let payload = Arc::new(generate(users).expect("Valid payload size"));
            let encoded = codec.encode(&payload).expect("Encode failed");
            group.throughput(Throughput::Bytes(encoded.len() as u64));

            group.bench_with_input(BenchmarkId::new(format.name(), users), &users, |b, _| {
                b.to_async(&rt).iter_custom(|iters| {
                    let codec = codec.clone();
                    let payload = payload.clone();
                    async move {
                        driver
                            .run(operation, codec, iters as usize, &payload)
                            .await
                            .expect("Benchmark run failed")
                            .elapsed
                    }
                });
            });
        }
    }

    group.finish();
}

fn bench_parallel_encode(c: &mut Criterion) {
    bench_parallel_scaling(c, Operation::Encode);
}

fn bench_parallel_decode(c: &mut Criterion) {
    bench_parallel_scaling(c, Operation::Decode);
}

criterion_group!(benches, bench_parallel_encode, bench_parallel_decode);

criterion_main!(benches);

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::*;

    #[test]
    fn test_benchmark_can_run() {
        let rt = Runtime::new().expect("Failed to build tokio runtime");
        let payload = generate(PAYLOAD_USERS[0]).expect("Valid payload size");
        let codec = CodecConfig::default_for(Format::Line)
            .build()
            .expect("Default options are valid");

        let report = rt
            .block_on(ParallelDriver::default().run(Operation::Decode, codec, 4, &payload))
            .expect("Run failed");
        assert_eq!(report.succeeded, 4);
    }
}
