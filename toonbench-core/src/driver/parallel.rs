// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Parallel fan-out driver.
//!
//! Launches one blocking task per trial on the tokio runtime and waits for
//! every one of them before the clock stops. Trials share nothing except the
//! read-only codec; each owns its input outright.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;

use super::{
    execute_trial, run_label, verify_outputs, DriverConfig, FailurePolicy, InputSource,
    RunReport, TrialInputs, TrialOutput, TrialSuccess,
};
use crate::codec::SharedCodec;
use crate::error::{BenchError, BenchResult, CodecError};
use crate::payload::Payload;
use crate::state::{RunState, RunStateMachine};
use crate::types::{ExecutionMode, Operation};

/// What a single trial task hands back to the join loop.
enum TrialResult {
    Done(Result<TrialSuccess, CodecError>),
    /// Cancelled before the codec was called.
    Skipped,
    Panicked(String),
}

/// Runs B trials concurrently and times the whole batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelDriver {
    config: DriverConfig,
}

impl ParallelDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run `trials` copies of `operation` against a replicated payload.
    pub async fn run(
        &self,
        operation: Operation,
        codec: SharedCodec,
        trials: usize,
        payload: &Payload,
    ) -> BenchResult<RunReport> {
        self.run_from(operation, codec, trials, &InputSource::Canonical(payload))
            .await
    }

    /// Run `trials` copies of `operation` with inputs drawn from `source`.
    ///
    /// Input preparation happens before the clock starts. The returned
    /// report's `elapsed` covers task launch through the last join only.
    pub async fn run_from(
        &self,
        operation: Operation,
        codec: SharedCodec,
        trials: usize,
        source: &InputSource<'_>,
    ) -> BenchResult<RunReport> {
        let format = codec.format();
        let label = run_label(operation, format, ExecutionMode::Parallel);
        let mut machine = RunStateMachine::new(label.clone());
        let mut report = RunReport::new(label, operation, format, ExecutionMode::Parallel, trials);

        machine.transition_to(RunState::Preparing)?;
        let inputs = TrialInputs::prepare(operation, codec.as_ref(), trials, source)?;
        let reference = self.config.verify.then(|| source.produce());

        machine.transition_to(RunState::Running)?;
        let keep_output = self.config.verify;
        let cancel = Arc::new(AtomicBool::new(false));
        let mut tasks = JoinSet::new();
        let mut outputs = Vec::new();

        let start = Instant::now();
        for (trial, input) in inputs.into_items().into_iter().enumerate() {
            let codec = Arc::clone(&codec);
            let cancel = Arc::clone(&cancel);
            tasks.spawn_blocking(move || {
                if cancel.load(Ordering::Acquire) {
                    return (trial, TrialResult::Skipped);
                }
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    execute_trial(codec.as_ref(), input, keep_output)
                }));
                match outcome {
                    Ok(result) => (trial, TrialResult::Done(result)),
                    Err(payload) => (trial, TrialResult::Panicked(panic_message(payload.as_ref()))),
                }
            });
        }

        let policy = self.config.failure_policy;
        let join = join_all(&mut tasks, &mut report, &mut outputs, &cancel, policy);
        let stopped_early = match self.config.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, join).await {
                Ok(stopped) => stopped,
                Err(_) => {
                    report.elapsed = start.elapsed();
                    cancel.store(true, Ordering::Release);
                    tasks.abort_all();
                    machine.transition_to(RunState::Aborted)?;

                    let completed = report.succeeded + report.failed + report.panicked;
                    tracing::warn!(
                        run = %report.label,
                        deadline_ms = deadline.as_millis() as u64,
                        completed,
                        trials,
                        "Deadline exceeded, abandoning outstanding trials"
                    );
                    return Err(BenchError::Timeout {
                        deadline,
                        completed,
                        trials,
                    });
                }
            },
            None => join.await,
        };
        report.elapsed = start.elapsed();

        let terminal = if stopped_early {
            RunState::Aborted
        } else {
            RunState::Completed
        };
        machine.transition_to(terminal)?;
        report.state = machine.state();

        if let Some(reference) = reference {
            verify_outputs(codec.as_ref(), &reference, outputs)?;
            report.verified = true;
        }

        if report.failed > 0 || report.panicked > 0 {
            tracing::warn!(
                run = %report.label,
                trials,
                failed = report.failed,
                panicked = report.panicked,
                cancelled = report.cancelled,
                elapsed_us = report.elapsed.as_micros() as u64,
                "Parallel run finished with failures"
            );
        } else {
            tracing::info!(
                run = %report.label,
                trials,
                bytes = report.bytes,
                elapsed_us = report.elapsed.as_micros() as u64,
                "Parallel run finished"
            );
        }

        Ok(report)
    }
}

/// Drain the join set, tallying outcomes. Returns true if fail-fast fired.
async fn join_all(
    tasks: &mut JoinSet<(usize, TrialResult)>,
    report: &mut RunReport,
    outputs: &mut Vec<(usize, TrialOutput)>,
    cancel: &AtomicBool,
    policy: FailurePolicy,
) -> bool {
    let mut stopped = false;

    while let Some(joined) = tasks.join_next().await {
        let failed = match joined {
            Ok((trial, TrialResult::Done(Ok(success)))) => {
                report.succeeded += 1;
                report.bytes += success.bytes as u64;
                if let Some(output) = success.output {
                    outputs.push((trial, output));
                }
                false
            }
            Ok((trial, TrialResult::Done(Err(error)))) => {
                tracing::debug!(run = %report.label, trial, error = %error, "Trial failed");
                report.record_failure(error);
                true
            }
            Ok((trial, TrialResult::Panicked(message))) => {
                report.record_panic(format!("trial {}: {}", trial, message));
                true
            }
            Ok((_, TrialResult::Skipped)) => {
                report.cancelled += 1;
                false
            }
            Err(e) if e.is_cancelled() => {
                report.cancelled += 1;
                false
            }
            Err(e) => {
                report.record_panic(e.to_string());
                true
            }
        };

        if failed && policy == FailurePolicy::FailFast && !stopped {
            stopped = true;
            cancel.store(true, Ordering::Release);
            tasks.abort_all();
            tracing::debug!(run = %report.label, "Fail-fast: cancelling outstanding trials");
        }
    }

    stopped
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run `trials` parallel copies of `operation` with the default driver.
pub async fn run_parallel(
    operation: Operation,
    codec: SharedCodec,
    trials: usize,
    payload: &Payload,
) -> BenchResult<RunReport> {
    ParallelDriver::default()
        .run(operation, codec, trials, payload)
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::codec::CodecConfig;
    use crate::driver::test_support::{FlakyCodec, PanickingCodec, SlowGenerator, StuckCodec};
    use crate::payload::generate;
    use crate::types::{Format, PayloadSize};

    fn codec(format: Format) -> SharedCodec {
        CodecConfig::default_for(format).build().unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_zero_trials_returns_immediately() {
        let payload = generate(10).unwrap();
        let report = run_parallel(Operation::Encode, codec(Format::Line), 0, &payload)
            .await
            .unwrap();

        assert_eq!(report.trials, 0);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.state, RunState::Completed);
        assert!(report.elapsed < Duration::from_millis(50));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_small_line_batch_round_trips() {
        let payload = generate(3).unwrap();
        let driver = ParallelDriver::new(DriverConfig::default().verify(true));
        let report = driver
            .run(Operation::Encode, codec(Format::Line), 10, &payload)
            .await
            .unwrap();

        assert!(report.is_clean());
        assert!(report.verified);
        assert!(report.elapsed > Duration::ZERO);
        assert_eq!(report.label, "encode_line_parallel");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_thousand_trials_stay_isolated() {
        let payload = generate(20).unwrap();
        let driver = ParallelDriver::new(DriverConfig::default().verify(true));

        for operation in Operation::ALL {
            for format in Format::ALL {
                let report = driver
                    .run(operation, codec(format), 1000, &payload)
                    .await
                    .unwrap();
                assert_eq!(report.succeeded, 1000, "{}", report.label);
                assert!(report.verified);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_decode_bytes_accounted() {
        let payload = generate(50).unwrap();
        let binary = codec(Format::Binary);
        let encoded_len = binary.encode(&payload).unwrap().len() as u64;

        let report = run_parallel(Operation::Decode, binary, 20, &payload)
            .await
            .unwrap();
        assert_eq!(report.bytes, encoded_len * 20);
        assert!(!report.verified);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_input_preparation_is_not_timed() {
        let generator = SlowGenerator::new(Duration::from_millis(40));
        let source = InputSource::Generated {
            generator: &generator,
            size: PayloadSize::new(10).unwrap(),
        };

        let wall = Instant::now();
        let report = ParallelDriver::default()
            .run_from(Operation::Encode, codec(Format::Line), 5, &source)
            .await
            .unwrap();
        let wall = wall.elapsed();

        assert_eq!(generator.calls.load(Ordering::SeqCst), 5);
        assert!(wall >= Duration::from_millis(200));
        assert!(report.elapsed < Duration::from_millis(200));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_count_and_continue_runs_everything() {
        let payload = generate(1).unwrap();
        let flaky = Arc::new(FlakyCodec::new(3));
        let report = ParallelDriver::default()
            .run(Operation::Encode, flaky.clone(), 9, &payload)
            .await
            .unwrap();

        assert_eq!(flaky.calls.load(Ordering::SeqCst), 9);
        assert_eq!(report.failed, 3);
        assert_eq!(report.succeeded, 6);
        assert_eq!(report.state, RunState::Completed);

        let err = report.into_result().unwrap_err();
        assert!(matches!(
            err,
            BenchError::TaskFailures {
                failed: 3,
                trials: 9,
                ..
            }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fail_fast_cancels_outstanding() {
        let payload = generate(1).unwrap();
        let driver =
            ParallelDriver::new(DriverConfig::default().failure_policy(FailurePolicy::FailFast));
        let report = driver
            .run(Operation::Encode, Arc::new(FlakyCodec::new(1)), 50, &payload)
            .await
            .unwrap();

        assert!(report.failed >= 1);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed + report.cancelled, 50);
        assert_eq!(report.state, RunState::Aborted);
        assert!(report.first_error.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_deadline_expiry_is_reported() {
        let payload = generate(1).unwrap();
        let stuck = Arc::new(StuckCodec {
            delay: Duration::from_millis(500),
        });
        let driver =
            ParallelDriver::new(DriverConfig::default().deadline(Duration::from_millis(50)));

        let err = driver
            .run(Operation::Encode, stuck, 2, &payload)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BenchError::Timeout {
                completed: 0,
                trials: 2,
                ..
            }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_panicking_trial_is_contained() {
        let payload = generate(1).unwrap();
        let report = run_parallel(Operation::Encode, Arc::new(PanickingCodec), 3, &payload)
            .await
            .unwrap();

        assert_eq!(report.panicked, 3);
        assert_eq!(report.state, RunState::Completed);
        let err = report.into_result().unwrap_err();
        assert!(err.to_string().contains("codec exploded"));
    }
}
