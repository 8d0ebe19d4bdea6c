// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Standardized metrics types for benchmark results.
//!
//! This module defines the data structures used to capture and serialize
//! benchmark measurements. Latency is expressed per trial: each measured run
//! contributes one sample, its timed phase divided by the trial count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use sysinfo::System;
use toonbench_core::{EntryPoint, ExecutionMode, Format, Operation, RunReport};

/// Latency metrics with statistical analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Minimum observed latency in nanoseconds
    pub min_ns: u64,
    /// Maximum observed latency in nanoseconds
    pub max_ns: u64,
    /// Arithmetic mean latency in nanoseconds
    pub mean_ns: f64,
    /// Median (p50) latency in nanoseconds
    pub median_ns: u64,
    /// 95th percentile latency in nanoseconds
    pub p95_ns: u64,
    /// 99th percentile latency in nanoseconds
    pub p99_ns: u64,
    /// Standard deviation in nanoseconds
    pub std_dev_ns: f64,
    /// Raw sample data for visualization (optional, may be truncated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<u64>>,
}

impl LatencyMetrics {
    /// Calculate metrics from a vector of latency samples (in nanoseconds).
    pub fn from_samples(mut samples: Vec<u64>, keep_raw: bool) -> Self {
        if samples.is_empty() {
            return Self {
                min_ns: 0,
                max_ns: 0,
                mean_ns: 0.0,
                median_ns: 0,
                p95_ns: 0,
                p99_ns: 0,
                std_dev_ns: 0.0,
                samples: None,
            };
        }

        samples.sort_unstable();
        let len = samples.len();

        let min_ns = samples[0];
        let max_ns = samples[len - 1];
        let sum: u64 = samples.iter().sum();
        let mean_ns = sum as f64 / len as f64;
        let median_ns = samples[len / 2];
        let p95_ns = samples[(len as f64 * 0.95) as usize];
        let p99_ns = samples[(len as f64 * 0.99) as usize];

        let variance: f64 = samples
            .iter()
            .map(|&x| {
                let diff = x as f64 - mean_ns;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;
        let std_dev_ns = variance.sqrt();

        // Downsample large sample sets for storage
        let raw_samples = if keep_raw {
            if len > 10000 {
                Some(samples.iter().step_by(len / 1000).copied().collect())
            } else {
                Some(samples)
            }
        } else {
            None
        };

        Self {
            min_ns,
            max_ns,
            mean_ns,
            median_ns,
            p95_ns,
            p99_ns,
            std_dev_ns,
            samples: raw_samples,
        }
    }

    /// Format latency in human-readable form (auto-selects ns/μs/ms).
    pub fn format_latency(ns: u64) -> String {
        if ns < 1_000 {
            format!("{}ns", ns)
        } else if ns < 1_000_000 {
            format!("{:.2}μs", ns as f64 / 1_000.0)
        } else if ns < 1_000_000_000 {
            format!("{:.2}ms", ns as f64 / 1_000_000.0)
        } else {
            format!("{:.2}s", ns as f64 / 1_000_000_000.0)
        }
    }
}

/// Throughput over all measured runs of one entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThroughputMetrics {
    /// Successful trials per second
    pub trials_per_sec: f64,
    /// Encoded bytes produced or consumed per second
    pub bytes_per_sec: f64,
    /// Total successful trials
    pub total_trials: u64,
    /// Total encoded bytes
    pub total_bytes: u64,
    /// Summed timed phases in nanoseconds
    pub duration_ns: u64,
}

impl ThroughputMetrics {
    /// Calculate throughput from trial count, byte count, and duration.
    pub fn calculate(trials: u64, bytes: u64, duration_ns: u64) -> Self {
        let duration_secs = duration_ns as f64 / 1_000_000_000.0;
        let rate = |count: u64| {
            if duration_secs > 0.0 {
                count as f64 / duration_secs
            } else {
                0.0
            }
        };
        Self {
            trials_per_sec: rate(trials),
            bytes_per_sec: rate(bytes),
            total_trials: trials,
            total_bytes: bytes,
            duration_ns,
        }
    }

    /// Format throughput in human-readable form.
    pub fn format_bytes_per_sec(bps: f64) -> String {
        if bps < 1_000.0 {
            format!("{:.2} B/s", bps)
        } else if bps < 1_000_000.0 {
            format!("{:.2} KB/s", bps / 1_000.0)
        } else if bps < 1_000_000_000.0 {
            format!("{:.2} MB/s", bps / 1_000_000.0)
        } else {
            format!("{:.2} GB/s", bps / 1_000_000_000.0)
        }
    }
}

/// Trial outcomes other than success, summed across runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCounts {
    pub failed: u64,
    pub cancelled: u64,
    pub panicked: u64,
}

impl FailureCounts {
    pub fn total(&self) -> u64 {
        self.failed + self.cancelled + self.panicked
    }
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Result for one entry point with all associated metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Entry point name, e.g. `encode_line_parallel`
    pub name: String,
    pub format: Format,
    pub operation: Operation,
    pub mode: ExecutionMode,
    /// Users in the payload
    pub users: usize,
    /// Trials per measured run (B)
    pub trials: usize,
    /// Number of measured runs
    pub iterations: u64,
    /// Per-trial latency across runs
    pub latency: LatencyMetrics,
    pub throughput: ThroughputMetrics,
    #[serde(default)]
    pub failures: FailureCounts,
    /// Additional metadata specific to this benchmark
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl BenchmarkResult {
    /// Summarize the measured runs of one entry point.
    pub fn from_reports(
        entry: EntryPoint,
        users: usize,
        trials: usize,
        reports: &[RunReport],
        keep_raw_samples: bool,
    ) -> Self {
        let samples = reports
            .iter()
            .map(|r| r.nanos_per_trial().round() as u64)
            .collect();

        let mut failures = FailureCounts::default();
        let mut succeeded = 0u64;
        let mut bytes = 0u64;
        let mut duration_ns = 0u64;
        for report in reports {
            succeeded += report.succeeded as u64;
            bytes += report.bytes;
            duration_ns += report.elapsed.as_nanos() as u64;
            failures.failed += report.failed as u64;
            failures.cancelled += report.cancelled as u64;
            failures.panicked += report.panicked as u64;
        }

        Self {
            name: entry.name(),
            format: entry.format,
            operation: entry.operation,
            mode: entry.mode,
            users,
            trials,
            iterations: reports.len() as u64,
            latency: LatencyMetrics::from_samples(samples, keep_raw_samples),
            throughput: ThroughputMetrics::calculate(succeeded, bytes, duration_ns),
            failures,
            metadata: HashMap::new(),
        }
    }

    /// Add metadata to the result. Values that fail to serialize are skipped.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), value);
        }
        self
    }
}

/// Complete benchmark suite report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Framework version
    pub version: String,
    /// Timestamp when benchmarks were run
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    /// Individual benchmark results
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    /// Create a new, empty report for a suite.
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            benchmark_suite: suite.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            results: Vec::new(),
        }
    }

    /// Add a result to the report.
    pub fn add_result(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }

    /// Total failed, cancelled or panicked trials across all results.
    pub fn total_failures(&self) -> u64 {
        self.results.iter().map(|r| r.failures.total()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use toonbench_core::{generate, run_sequential, CodecConfig};

    #[test]
    fn test_latency_metrics_from_samples() {
        let samples = vec![100, 200, 300, 400, 500, 600, 700, 800, 900, 1000];
        let metrics = LatencyMetrics::from_samples(samples, false);

        assert_eq!(metrics.min_ns, 100);
        assert_eq!(metrics.max_ns, 1000);
        assert_eq!(metrics.median_ns, 600);
        assert!((metrics.mean_ns - 550.0).abs() < 0.01);
        assert!(metrics.samples.is_none());
    }

    #[test]
    fn test_latency_format() {
        assert_eq!(LatencyMetrics::format_latency(500), "500ns");
        assert_eq!(LatencyMetrics::format_latency(1500), "1.50μs");
        assert_eq!(LatencyMetrics::format_latency(1_500_000), "1.50ms");
        assert_eq!(LatencyMetrics::format_latency(1_500_000_000), "1.50s");
    }

    #[test]
    fn test_throughput_calculation() {
        let metrics = ThroughputMetrics::calculate(1000, 1_000_000, 1_000_000_000);
        assert!((metrics.trials_per_sec - 1000.0).abs() < 0.01);
        assert!((metrics.bytes_per_sec - 1_000_000.0).abs() < 0.01);
    }

    #[test]
    fn test_throughput_zero_duration() {
        let metrics = ThroughputMetrics::calculate(0, 0, 0);
        assert_eq!(metrics.trials_per_sec, 0.0);
    }

    #[test]
    fn test_system_info_collect() {
        let info = SystemInfo::collect();
        assert!(!info.os.is_empty());
        assert!(info.cpu_cores > 0);
        assert!(info.memory_bytes > 0);
    }

    #[test]
    fn test_result_from_reports() {
        let payload = generate(10).unwrap();
        let codec = CodecConfig::default_for(Format::Binary).build().unwrap();
        let mut reports: Vec<_> = (0..3)
            .map(|_| run_sequential(Operation::Encode, codec.as_ref(), 5, &payload).unwrap())
            .collect();
        reports[0].elapsed = Duration::from_micros(50);
        reports[1].elapsed = Duration::from_micros(100);
        reports[2].elapsed = Duration::from_micros(150);

        let entry = EntryPoint::new(Format::Binary, Operation::Encode, ExecutionMode::Sequential);
        let result = BenchmarkResult::from_reports(entry, 10, 5, &reports, true)
            .with_metadata("input_strategy", "replicate");

        assert_eq!(result.name, "encode_binary_sequential");
        assert_eq!(result.iterations, 3);
        assert_eq!(result.latency.min_ns, 10_000);
        assert_eq!(result.latency.max_ns, 30_000);
        assert_eq!(result.throughput.total_trials, 15);
        assert_eq!(result.failures.total(), 0);

        let json = serde_json::to_string_pretty(&result).unwrap();
        assert!(json.contains("encode_binary_sequential"));
        assert!(json.contains("\"format\": \"binary\""));
        assert!(json.contains("input_strategy"));
    }
}
