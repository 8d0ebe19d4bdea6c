// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Single-threaded baseline driver.
//!
//! Executes trials one after another on the calling thread. A failing codec
//! call aborts the run immediately.

use std::time::Instant;

use super::{
    execute_trial, run_label, verify_outputs, DriverConfig, InputSource, RunReport, TrialInputs,
};
use crate::codec::Codec;
use crate::error::{BenchError, BenchResult};
use crate::payload::Payload;
use crate::state::{RunState, RunStateMachine};
use crate::types::{ExecutionMode, Operation};

/// Runs B trials back to back and times the loop.
///
/// The failure policy is ignored: the first error always stops the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialDriver {
    config: DriverConfig,
}

impl SequentialDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn run(
        &self,
        operation: Operation,
        codec: &dyn Codec,
        trials: usize,
        payload: &Payload,
    ) -> BenchResult<RunReport> {
        self.run_from(operation, codec, trials, &InputSource::Canonical(payload))
    }

    pub fn run_from(
        &self,
        operation: Operation,
        codec: &dyn Codec,
        trials: usize,
        source: &InputSource<'_>,
    ) -> BenchResult<RunReport> {
        let format = codec.format();
        let label = run_label(operation, format, ExecutionMode::Sequential);
        let mut machine = RunStateMachine::new(label.clone());
        let mut report =
            RunReport::new(label, operation, format, ExecutionMode::Sequential, trials);

        machine.transition_to(RunState::Preparing)?;
        let inputs = TrialInputs::prepare(operation, codec, trials, source)?;
        let reference = self.config.verify.then(|| source.produce());

        machine.transition_to(RunState::Running)?;
        let keep_output = self.config.verify;
        let mut outputs = Vec::new();

        let start = Instant::now();
        for (trial, input) in inputs.into_items().into_iter().enumerate() {
            if let Some(deadline) = self.config.deadline {
                if start.elapsed() > deadline {
                    machine.transition_to(RunState::Aborted)?;
                    tracing::warn!(
                        run = %report.label,
                        completed = trial,
                        trials,
                        "Deadline exceeded"
                    );
                    return Err(BenchError::Timeout {
                        deadline,
                        completed: trial,
                        trials,
                    });
                }
            }

            match execute_trial(codec, input, keep_output) {
                Ok(success) => {
                    report.succeeded += 1;
                    report.bytes += success.bytes as u64;
                    if let Some(output) = success.output {
                        outputs.push((trial, output));
                    }
                }
                Err(error) => {
                    machine.transition_to(RunState::Aborted)?;
                    tracing::warn!(run = %report.label, trial, error = %error, "Trial failed");
                    return Err(error.into());
                }
            }
        }
        report.elapsed = start.elapsed();

        machine.transition_to(RunState::Completed)?;
        report.state = machine.state();

        if let Some(reference) = reference {
            verify_outputs(codec, &reference, outputs)?;
            report.verified = true;
        }

        tracing::info!(
            run = %report.label,
            trials,
            bytes = report.bytes,
            elapsed_us = report.elapsed.as_micros() as u64,
            "Sequential run finished"
        );

        Ok(report)
    }
}

/// Run `trials` sequential copies of `operation` with the default driver.
pub fn run_sequential(
    operation: Operation,
    codec: &dyn Codec,
    trials: usize,
    payload: &Payload,
) -> BenchResult<RunReport> {
    SequentialDriver::default().run(operation, codec, trials, payload)
}
