// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! toonbench Benchmarking Framework
//!
//! Measures the line format, JSON and protobuf codecs single-threaded and
//! under parallel fan-out, and writes comparable JSON reports.
//!
//! # Benchmark Entry Points
//!
//! One per format × operation × mode, e.g. `encode_line_parallel` or
//! `decode_binary_sequential`. Criterion benches drive them with its own
//! iteration count as the trial count; the suite runner repeats them a
//! configured number of times.
//!
//! # Data Output
//!
//! All suites output JSON files with standardized metrics for visualization.

pub mod harness;
pub mod metrics;
pub mod reporter;
pub mod suite;

pub use harness::BenchmarkHarness;
pub use metrics::{
    BenchmarkReport, BenchmarkResult, FailureCounts, LatencyMetrics, SystemInfo,
    ThroughputMetrics,
};
pub use reporter::{JsonReporter, ReporterError};
pub use suite::{run_suite, select_entries, SuiteOptions};
