// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Suite execution: every selected entry point, repeated by the harness,
//! summarized into one [`BenchmarkReport`].

use std::time::Duration;

use toonbench_core::{BenchResult, EntryPoint, ExecutionMode, Format, Runner};

use crate::harness::BenchmarkHarness;
use crate::metrics::{BenchmarkReport, BenchmarkResult};

/// How each entry point of a suite is measured.
#[derive(Debug, Clone)]
pub struct SuiteOptions {
    /// Trials per run (B).
    pub trials: usize,
    pub warmup: u64,
    pub iterations: u64,
    /// Keep measuring each entry point until this much timed work accumulates.
    pub min_time: Option<Duration>,
    pub keep_samples: bool,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            trials: 100,
            warmup: 1,
            iterations: 10,
            min_time: None,
            keep_samples: true,
        }
    }
}

/// Narrow entry points to the given formats and modes. Empty filters match all.
pub fn select_entries(
    entries: Vec<EntryPoint>,
    formats: &[Format],
    modes: &[ExecutionMode],
) -> Vec<EntryPoint> {
    entries
        .into_iter()
        .filter(|e| formats.is_empty() || formats.contains(&e.format))
        .filter(|e| modes.is_empty() || modes.contains(&e.mode))
        .collect()
}

/// Measure `entries` and collect the results.
///
/// Trial failures are counted in the results; driver errors such as a
/// deadline expiry stop the suite.
pub async fn run_suite(
    runner: &Runner,
    entries: &[EntryPoint],
    options: &SuiteOptions,
) -> BenchResult<BenchmarkReport> {
    let context = runner.context();
    let config = context.config();
    let mut report = BenchmarkReport::new(config.suite.name.clone());

    let harness = BenchmarkHarness::new()
        .warmup(options.warmup)
        .iterations(options.iterations)
        .keep_samples(options.keep_samples);

    for &entry in entries {
        tracing::info!(entry = %entry, trials = options.trials, "Measuring entry point");

        let batch = move || runner.run(entry, options.trials);
        let reports = match options.min_time {
            Some(min_time) => harness.run_for(min_time, batch).await?,
            None => harness.run(batch).await?,
        };

        let result = BenchmarkResult::from_reports(
            entry,
            context.payload().user_count(),
            options.trials,
            &reports,
            harness.should_keep_samples(),
        )
        .with_metadata("input_strategy", config.suite.input_strategy)
        .with_metadata("failure_policy", config.suite.driver.failure_policy)
        .with_metadata("verified", reports.iter().all(|r| r.verified));

        if result.failures.total() > 0 {
            tracing::warn!(
                entry = %entry,
                failed = result.failures.failed,
                cancelled = result.failures.cancelled,
                panicked = result.failures.panicked,
                "Entry point recorded trial failures"
            );
        }
        report.add_result(result);
    }

    Ok(report)
}
