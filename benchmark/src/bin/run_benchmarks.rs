// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI tool to run all benchmark entry points and generate reports.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use toonbench_benchmark::{
    run_suite, select_entries, BenchmarkReport, JsonReporter, LatencyMetrics, SuiteOptions,
    ThroughputMetrics,
};
use toonbench_core::{
    BenchContext, Config, ConfigLoader, ExecutionMode, Format, PayloadSize, Runner,
};

#[derive(Parser)]
#[command(name = "run_benchmarks")]
#[command(about = "Run toonbench entry points and generate JSON reports")]
struct Args {
    /// Suite configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for benchmark data
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Users in the generated payload
    #[arg(short, long)]
    users: Option<i64>,

    /// Trials per run
    #[arg(short, long)]
    trials: Option<usize>,

    /// Measured runs per entry point
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Keep measuring each entry point for at least this many milliseconds
    #[arg(long)]
    min_time_ms: Option<u64>,

    /// Formats to run (all configured if not specified)
    #[arg(short, long)]
    format: Vec<Format>,

    /// Execution modes to run (both if not specified)
    #[arg(short, long)]
    mode: Vec<ExecutionMode>,

    /// Run in quick mode (fewer iterations)
    #[arg(long)]
    quick: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_file(path)?,
        None => Config::default(),
    };
    if let Some(users) = args.users {
        config.suite.users = PayloadSize::new(users)?;
    }

    let iterations = if args.quick { Some(3) } else { args.iterations };
    config.suite.apply_overrides(args.trials, iterations)?;

    let options = SuiteOptions {
        trials: config.suite.trials,
        warmup: config.suite.warmup as u64,
        iterations: config.suite.iterations as u64,
        min_time: args.min_time_ms.map(Duration::from_millis),
        keep_samples: true,
    };

    println!("toonbench Benchmark Suite");
    println!("=========================");
    println!("Output directory: {:?}", args.output);
    println!("Users: {}", config.suite.users);
    println!("Trials per run: {}", options.trials);
    println!("Iterations: {}", options.iterations);
    println!();

    let reporter = JsonReporter::new(&args.output)?;
    let runner = Runner::new(Arc::new(BenchContext::new(config)?));
    let entries = select_entries(runner.entry_points(), &args.format, &args.mode);

    let report = run_suite(&runner, &entries, &options).await?;

    let path = reporter.save(&report)?;
    println!();
    println!("Benchmark report saved to: {:?}", path);
    println!();

    print_summary(&report);

    Ok(())
}

fn print_summary(report: &BenchmarkReport) {
    println!("Summary");
    println!("-------");
    println!();

    for result in &report.results {
        println!(
            "{}: median={}/op, p99={}/op, {}, failures={}",
            result.name,
            LatencyMetrics::format_latency(result.latency.median_ns),
            LatencyMetrics::format_latency(result.latency.p99_ns),
            ThroughputMetrics::format_bytes_per_sec(result.throughput.bytes_per_sec),
            result.failures.total()
        );
    }
}
