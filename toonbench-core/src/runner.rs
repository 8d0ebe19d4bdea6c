// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark registry and runner.
//!
//! Every configured codec exposes one entry point per operation and execution
//! mode. The [`BenchContext`] holds the validated configuration, the
//! canonical payload (generated once) and the built codecs; it is shared by
//! `Arc` with every run.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::codec::SharedCodec;
use crate::config::Config;
use crate::driver::{run_label, InputSource, ParallelDriver, RunReport, SequentialDriver};
use crate::error::{BenchError, BenchResult};
use crate::payload::{Payload, PayloadGenerator, UserGenerator};
use crate::types::{ExecutionMode, Format, Operation};

/// One benchmarkable combination of format, operation and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryPoint {
    pub format: Format,
    pub operation: Operation,
    pub mode: ExecutionMode,
}

impl EntryPoint {
    pub fn new(format: Format, operation: Operation, mode: ExecutionMode) -> Self {
        Self {
            format,
            operation,
            mode,
        }
    }

    /// Name such as `decode_binary_sequential`.
    pub fn name(&self) -> String {
        run_label(self.operation, self.format, self.mode)
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything a run needs, built once before the first measurement.
pub struct BenchContext {
    config: Config,
    payload: Payload,
    codecs: BTreeMap<Format, SharedCodec>,
    generator: Arc<dyn PayloadGenerator>,
}

impl BenchContext {
    /// Build codecs and generate the canonical payload with the default generator.
    pub fn new(config: Config) -> BenchResult<Self> {
        Self::with_generator(config, Arc::new(UserGenerator))
    }

    /// Build the context around a custom payload generator.
    pub fn with_generator(
        config: Config,
        generator: Arc<dyn PayloadGenerator>,
    ) -> BenchResult<Self> {
        let mut codecs = BTreeMap::new();
        for codec_config in &config.codecs {
            codecs.insert(codec_config.format(), codec_config.build()?);
        }

        let payload = generator.generate(config.suite.users);
        tracing::info!(
            users = payload.user_count(),
            codecs = codecs.len(),
            "Benchmark context ready"
        );

        Ok(Self {
            config,
            payload,
            codecs,
            generator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The canonical payload every codec sees.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn codec(&self, format: Format) -> Option<&SharedCodec> {
        self.codecs.get(&format)
    }

    /// Configured codecs, in configuration order.
    pub fn codecs(&self) -> impl Iterator<Item = &SharedCodec> {
        self.config
            .codecs
            .iter()
            .filter_map(|c| self.codecs.get(&c.format()))
    }

    /// Input source selected by the configured strategy.
    pub fn input_source(&self) -> InputSource<'_> {
        InputSource::for_strategy(
            self.config.suite.input_strategy,
            &self.payload,
            self.generator.as_ref(),
            self.config.suite.users,
        )
    }
}

impl fmt::Debug for BenchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchContext")
            .field("config", &self.config)
            .field("users", &self.payload.user_count())
            .field("codecs", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Executes entry points against a shared context.
#[derive(Debug, Clone)]
pub struct Runner {
    context: Arc<BenchContext>,
}

impl Runner {
    pub fn new(context: Arc<BenchContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<BenchContext> {
        &self.context
    }

    /// All format × operation × mode combinations for the configured codecs.
    pub fn entry_points(&self) -> Vec<EntryPoint> {
        let mut entries = Vec::new();
        for format in self.context.config.formats() {
            for operation in Operation::ALL {
                for mode in ExecutionMode::ALL {
                    entries.push(EntryPoint::new(format, operation, mode));
                }
            }
        }
        entries
    }

    /// Look up an entry point by name.
    pub fn find(&self, name: &str) -> BenchResult<EntryPoint> {
        self.entry_points()
            .into_iter()
            .find(|e| e.name() == name)
            .ok_or_else(|| BenchError::UnknownEntryPoint {
                name: name.to_string(),
            })
    }

    /// Execute one entry point with `trials` trials.
    ///
    /// Failed trials are reported, not raised; call
    /// [`RunReport::into_result`] to turn them into an error.
    pub async fn run(&self, entry: EntryPoint, trials: usize) -> BenchResult<RunReport> {
        let codec = self
            .context
            .codec(entry.format)
            .cloned()
            .ok_or_else(|| BenchError::UnknownEntryPoint { name: entry.name() })?;
        let driver_config = self.context.config.suite.driver;

        tracing::debug!(entry = %entry, trials, "Running entry point");

        match entry.mode {
            ExecutionMode::Parallel => {
                let source = self.context.input_source();
                ParallelDriver::new(driver_config)
                    .run_from(entry.operation, codec, trials, &source)
                    .await
            }
            ExecutionMode::Sequential => {
                let context = Arc::clone(&self.context);
                tokio::task::spawn_blocking(move || {
                    let source = context.input_source();
                    SequentialDriver::new(driver_config).run_from(
                        entry.operation,
                        codec.as_ref(),
                        trials,
                        &source,
                    )
                })
                .await
                .map_err(|e| BenchError::TaskPanicked {
                    message: e.to_string(),
                })?
            }
        }
    }
}
