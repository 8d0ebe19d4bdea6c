// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! toonbench CLI
//!
//! Command-line interface for the toonbench serialization benchmark harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use toonbench_core::{ExecutionMode, Format};

mod commands;

/// toonbench - Compare line-format, JSON and protobuf codecs under parallel load
#[derive(Parser)]
#[command(name = "toonbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults are used when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run benchmark entry points and save a JSON report
    Run {
        /// Users in the generated payload
        #[arg(short, long)]
        users: Option<i64>,

        /// Trials per run (B)
        #[arg(short, long)]
        trials: Option<usize>,

        /// Measured runs per entry point
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Keep measuring each entry point for at least this many milliseconds
        #[arg(long)]
        min_time_ms: Option<u64>,

        /// Formats to run (repeatable; all configured if omitted)
        #[arg(short, long)]
        format: Vec<Format>,

        /// Execution modes to run (repeatable; both if omitted)
        #[arg(short, long)]
        mode: Vec<ExecutionMode>,

        /// Output directory for reports
        #[arg(short, long, default_value = "data")]
        output: PathBuf,

        /// Quick mode: three iterations, no warmup
        #[arg(long)]
        quick: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: PathBuf,
    },

    /// List configured codecs and their encoded sizes
    Codecs,

    /// Print one encoded payload
    Sample {
        /// Format to encode with
        #[arg(short, long, default_value = "line")]
        format: Format,

        /// Users in the payload
        #[arg(short, long, default_value_t = 3)]
        users: i64,
    },

    /// Round-trip the payload through every configured codec
    Verify,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let config = cli.config.as_deref();

    // Dispatch to command handlers
    match cli.command {
        Commands::Run {
            users,
            trials,
            iterations,
            min_time_ms,
            format,
            mode,
            output,
            quick,
        } => {
            let args = commands::run::RunArgs {
                users,
                trials,
                iterations,
                min_time_ms,
                formats: format,
                modes: mode,
                output,
                quick,
            };
            commands::run::execute(config, args).await
        }
        Commands::Validate { file } => commands::validate::execute(&file).await,
        Commands::Codecs => commands::codecs::execute(config).await,
        Commands::Sample { format, users } => commands::sample::execute(config, format, users).await,
        Commands::Verify => commands::verify::execute(config).await,
    }
}
