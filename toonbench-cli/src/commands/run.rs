// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `toonbench run` command - Measure entry points and save a report.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use toonbench_benchmark::{
    run_suite, select_entries, BenchmarkReport, JsonReporter, LatencyMetrics, SuiteOptions,
};
use toonbench_core::{
    BenchContext, Config, ExecutionMode, Format, PayloadSize, Runner, ValidationError,
};

/// Iterations used by `--quick`.
const QUICK_ITERATIONS: usize = 3;

/// Options collected from the command line.
pub struct RunArgs {
    pub users: Option<i64>,
    pub trials: Option<usize>,
    pub iterations: Option<usize>,
    pub min_time_ms: Option<u64>,
    pub formats: Vec<Format>,
    pub modes: Vec<ExecutionMode>,
    pub output: PathBuf,
    pub quick: bool,
}

pub async fn execute(
    config_path: Option<&Path>,
    args: RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;
    let options = suite_options(&mut config, &args)?;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  TOONBENCH BENCHMARK SUITE                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Suite:       {}", config.suite.name);
    println!("  Users:       {}", config.suite.users);
    println!("  Trials/run:  {}", options.trials);
    println!("  Iterations:  {} (+{} warmup)", options.iterations, options.warmup);
    println!("  CPU cores:   {}", num_cpus::get());
    println!();

    let reporter = JsonReporter::new(&args.output)?;
    let runner = Runner::new(Arc::new(BenchContext::new(config)?));
    let entries = select_entries(runner.entry_points(), &args.formats, &args.modes);

    if entries.is_empty() {
        println!("No entry points match the selected formats and modes.");
        return Ok(());
    }

    let report = run_suite(&runner, &entries, &options).await?;
    print!("{}", render_summary(&report));

    let path = reporter.save(&report)?;
    println!();
    println!("Report saved to: {}", path.display());

    if report.total_failures() > 0 {
        tracing::warn!(
            failures = report.total_failures(),
            "Some trials failed; timings for affected entry points may be misleading"
        );
    }

    Ok(())
}

/// Apply command-line overrides to `config` and derive the suite options.
fn suite_options(config: &mut Config, args: &RunArgs) -> Result<SuiteOptions, ValidationError> {
    if let Some(users) = args.users {
        config.suite.users = PayloadSize::new(users)?;
    }
    let iterations = if args.quick {
        Some(QUICK_ITERATIONS)
    } else {
        args.iterations
    };
    config.suite.apply_overrides(args.trials, iterations)?;

    Ok(SuiteOptions {
        trials: config.suite.trials,
        warmup: if args.quick {
            0
        } else {
            config.suite.warmup as u64
        },
        iterations: config.suite.iterations as u64,
        min_time: args.min_time_ms.map(Duration::from_millis),
        keep_samples: true,
    })
}

/// Summary table; latency columns are per trial.
fn render_summary(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    out.push_str("╔══════════════════════════════════╦══════════════╦════════════════╦══════════╗\n");
    out.push_str("║ Entry point                      ║ Median/trial ║ Trials/sec     ║ Failures ║\n");
    out.push_str("╠══════════════════════════════════╬══════════════╬════════════════╬══════════╣\n");

    for result in &report.results {
        out.push_str(&format!(
            "║ {:<32} ║ {:>12} ║ {:>14.0} ║ {:>8} ║\n",
            result.name,
            LatencyMetrics::format_latency(result.latency.median_ns),
            result.throughput.trials_per_sec,
            result.failures.total()
        ));
    }

    out.push_str("╚══════════════════════════════════╩══════════════╩════════════════╩══════════╝\n");
    out
}
