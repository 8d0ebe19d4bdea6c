// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark harness for repeating driver runs.
//!
//! Each measured iteration is one full driver run of B trials; the harness
//! only decides how many runs to make and which of them count.

use std::future::Future;
use std::time::{Duration, Instant};

use toonbench_core::{BenchResult, RunReport};

/// A benchmark harness for repeating batch runs.
pub struct BenchmarkHarness {
    /// Number of warmup runs before measurement
    warmup_iterations: u64,
    /// Number of measured runs
    measurement_iterations: u64,
    /// Whether to keep raw sample data
    keep_raw_samples: bool,
}

impl BenchmarkHarness {
    /// Create a new benchmark harness with default settings.
    pub fn new() -> Self {
        Self {
            warmup_iterations: 1,
            measurement_iterations: 10,
            keep_raw_samples: true,
        }
    }

    /// Set the number of warmup runs.
    pub fn warmup(mut self, iterations: u64) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    /// Set the number of measured runs.
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.measurement_iterations = iterations;
        self
    }

    /// Set whether to keep raw sample data.
    pub fn keep_samples(mut self, keep: bool) -> Self {
        self.keep_raw_samples = keep;
        self
    }

    /// Check if raw samples should be kept.
    pub fn should_keep_samples(&self) -> bool {
        self.keep_raw_samples
    }

    /// Run warmup, then collect exactly `iterations` measured reports.
    ///
    /// The closure performs one batch run. Any driver error stops the harness.
    pub async fn run<F, Fut>(&self, mut batch: F) -> BenchResult<Vec<RunReport>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = BenchResult<RunReport>>,
    {
        for _ in 0..self.warmup_iterations {
            batch().await?;
        }

        let mut reports = Vec::with_capacity(self.measurement_iterations as usize);
        for _ in 0..self.measurement_iterations {
            reports.push(batch().await?);
        }

        Ok(reports)
    }

    /// Keep running until the measured time reaches `min_time`.
    ///
    /// At least the configured number of iterations is always collected.
    /// Only each report's timed phase counts toward `min_time`.
    pub async fn run_for<F, Fut>(&self, min_time: Duration, mut batch: F) -> BenchResult<Vec<RunReport>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = BenchResult<RunReport>>,
    {
        for _ in 0..self.warmup_iterations {
            batch().await?;
        }

        let mut reports = Vec::new();
        let mut measured = Duration::ZERO;
        while (reports.len() as u64) < self.measurement_iterations || measured < min_time {
            let report = batch().await?;
            measured += report.elapsed;
            reports.push(report);
        }

        Ok(reports)
    }
}

impl Default for BenchmarkHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Measure the execution time of a closure.
pub fn measure<F, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    (result, elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use toonbench_core::{generate, run_parallel, CodecConfig, Format, Operation};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_harness_counts_warmup_separately() {
        let payload = Arc::new(generate(10).unwrap());
        let codec = CodecConfig::default_for(Format::Json).build().unwrap();
        let calls = Arc::new(AtomicU64::new(0));

        let harness = BenchmarkHarness::new().warmup(2).iterations(5);
        let reports = harness
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                let codec = codec.clone();
                let payload = payload.clone();
                async move { run_parallel(Operation::Encode, codec, 4, &payload).await }
            })
            .await
            .unwrap();

        assert_eq!(reports.len(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 7);
        assert!(reports.iter().all(|r| r.succeeded == 4));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_for_reaches_min_time() {
        let payload = Arc::new(generate(200).unwrap());
        let codec = CodecConfig::default_for(Format::Line).build().unwrap();
        let min_time = Duration::from_millis(20);

        let harness = BenchmarkHarness::new().warmup(0).iterations(1);
        let reports = harness
            .run_for(min_time, || {
                let codec = codec.clone();
                let payload = payload.clone();
                async move { run_parallel(Operation::Encode, codec, 8, &payload).await }
            })
            .await
            .unwrap();

        let measured: Duration = reports.iter().map(|r| r.elapsed).sum();
        assert!(measured >= min_time);
        assert!(!reports.is_empty());
    }

    #[test]
    fn test_measure() {
        let (result, duration) = measure(|| {
            std::thread::sleep(Duration::from_millis(5));
            42
        });

        assert_eq!(result, 42);
        assert!(duration >= Duration::from_millis(5));
    }
}
