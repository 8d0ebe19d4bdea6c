// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark drivers.
//!
//! A driver runs B trials of one operation against one codec:
//!
//! 1. **Preparing** (untimed): materialize B independently owned inputs.
//! 2. **Running** (timed): execute one codec call per input.
//! 3. **Completed/Aborted**: the clock stops only once every trial reported.
//!
//! [`ParallelDriver`] launches one task per trial and joins them;
//! [`SequentialDriver`] loops on the calling thread.

pub mod parallel;
pub mod sequential;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::Codec;
use crate::error::{BenchError, BenchResult, CodecError};
use crate::payload::{Payload, PayloadGenerator};
use crate::state::RunState;
use crate::types::{ExecutionMode, Format, Operation, PayloadSize};

pub use parallel::{run_parallel, ParallelDriver};
pub use sequential::{run_sequential, SequentialDriver};

/// What to do when a trial's codec call fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Cancel outstanding trials on the first failure.
    FailFast,
    /// Let every trial finish and count failures.
    #[default]
    CountAndContinue,
}

/// How the trial input set is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputStrategy {
    /// Clone the canonical payload once per trial.
    #[default]
    Replicate,
    /// Run the generator once per trial.
    Regenerate,
}

/// Driver behaviour shared by both execution modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverConfig {
    pub failure_policy: FailurePolicy,
    /// Give up waiting for trials after this long.
    pub deadline: Option<Duration>,
    /// Keep outputs and check them round-trip once the clock has stopped.
    pub verify: bool,
}

impl DriverConfig {
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

/// Where trial inputs come from.
#[derive(Clone, Copy)]
pub enum InputSource<'a> {
    /// Replicate an already generated payload.
    Canonical(&'a Payload),
    /// Regenerate a payload per trial.
    Generated {
        generator: &'a dyn PayloadGenerator,
        size: PayloadSize,
    },
}

impl<'a> InputSource<'a> {
    /// Pick a source for the given strategy.
    pub fn for_strategy(
        strategy: InputStrategy,
        payload: &'a Payload,
        generator: &'a dyn PayloadGenerator,
        size: PayloadSize,
    ) -> Self {
        match strategy {
            InputStrategy::Replicate => Self::Canonical(payload),
            InputStrategy::Regenerate => Self::Generated { generator, size },
        }
    }

    fn produce(&self) -> Payload {
        match self {
            Self::Canonical(payload) => (*payload).clone(),
            Self::Generated { generator, size } => generator.generate(*size),
        }
    }
}

/// One trial's exclusively owned input.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialInput {
    Payload(Payload),
    Buffer(Vec<u8>),
}

/// The trial input set: exactly B independently owned inputs.
#[derive(Debug)]
pub struct TrialInputs {
    operation: Operation,
    items: Vec<TrialInput>,
}

impl TrialInputs {
    /// Materialize `trials` inputs for `operation`.
    ///
    /// Encode trials get their own payload; decode trials get their own copy
    /// of the encoded bytes. A replicated decode input encodes once and copies
    /// the buffer.
    pub fn prepare(
        operation: Operation,
        codec: &dyn Codec,
        trials: usize,
        source: &InputSource<'_>,
    ) -> BenchResult<Self> {
        let mut items = Vec::with_capacity(trials);
        if trials == 0 {
            return Ok(Self { operation, items });
        }

        match (operation, source) {
            (Operation::Encode, _) => {
                items.extend((0..trials).map(|_| TrialInput::Payload(source.produce())));
            }
            (Operation::Decode, InputSource::Canonical(payload)) => {
                let encoded = codec.encode(payload).map_err(CodecError::from)?;
                items.extend((0..trials).map(|_| TrialInput::Buffer(encoded.clone())));
            }
            (Operation::Decode, InputSource::Generated { .. }) => {
                for _ in 0..trials {
                    let encoded = codec.encode(&source.produce()).map_err(CodecError::from)?;
                    items.push(TrialInput::Buffer(encoded));
                }
            }
        }

        Ok(Self { operation, items })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn into_items(self) -> Vec<TrialInput> {
        self.items
    }
}

/// A trial's result, kept only in verify mode.
#[derive(Debug)]
pub(crate) enum TrialOutput {
    Bytes(Vec<u8>),
    Payload(Payload),
}

/// Successful trial: bytes processed plus the retained output, if any.
#[derive(Debug)]
pub(crate) struct TrialSuccess {
    pub bytes: usize,
    pub output: Option<TrialOutput>,
}

/// Run one codec call on an owned input.
pub(crate) fn execute_trial(
    codec: &dyn Codec,
    input: TrialInput,
    keep_output: bool,
) -> Result<TrialSuccess, CodecError> {
    match input {
        TrialInput::Payload(payload) => {
            let bytes = codec.encode(&payload)?;
            Ok(TrialSuccess {
                bytes: bytes.len(),
                output: keep_output.then_some(TrialOutput::Bytes(bytes)),
            })
        }
        TrialInput::Buffer(buffer) => {
            let payload = codec.decode(&buffer)?;
            Ok(TrialSuccess {
                bytes: buffer.len(),
                output: keep_output.then_some(TrialOutput::Payload(payload)),
            })
        }
    }
}

/// Check retained outputs against the reference payload.
pub(crate) fn verify_outputs(
    codec: &dyn Codec,
    reference: &Payload,
    outputs: Vec<(usize, TrialOutput)>,
) -> BenchResult<()> {
    for (trial, output) in outputs {
        let decoded = match output {
            TrialOutput::Bytes(bytes) => {
                codec
                    .decode(&bytes)
                    .map_err(|e| BenchError::Verification {
                        trial,
                        reason: format!("encoded output does not decode: {}", e),
                    })?
            }
            TrialOutput::Payload(payload) => payload,
        };
        if decoded != *reference {
            return Err(BenchError::Verification {
                trial,
                reason: format!(
                    "output differs from reference ({} users vs {})",
                    decoded.user_count(),
                    reference.user_count()
                ),
            });
        }
    }
    Ok(())
}

/// Outcome of one benchmark run.
#[derive(Debug)]
pub struct RunReport {
    pub label: String,
    pub operation: Operation,
    pub format: Format,
    pub mode: ExecutionMode,
    /// Requested trial count B.
    pub trials: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Trials that never ran because the run was cancelled.
    pub cancelled: usize,
    pub panicked: usize,
    /// Wall time of the timed phase only.
    pub elapsed: Duration,
    /// Encoded bytes produced (encode) or consumed (decode).
    pub bytes: u64,
    pub state: RunState,
    pub first_error: Option<CodecError>,
    pub first_panic: Option<String>,
    /// Whether outputs were checked after the timed phase.
    pub verified: bool,
}

impl RunReport {
    pub(crate) fn new(
        label: String,
        operation: Operation,
        format: Format,
        mode: ExecutionMode,
        trials: usize,
    ) -> Self {
        Self {
            label,
            operation,
            format,
            mode,
            trials,
            succeeded: 0,
            failed: 0,
            cancelled: 0,
            panicked: 0,
            elapsed: Duration::ZERO,
            bytes: 0,
            state: RunState::NotStarted,
            first_error: None,
            first_panic: None,
            verified: false,
        }
    }

    pub(crate) fn record_failure(&mut self, error: CodecError) {
        self.failed += 1;
        if self.first_error.is_none() {
            self.first_error = Some(error);
        }
    }

    pub(crate) fn record_panic(&mut self, message: String) {
        self.panicked += 1;
        if self.first_panic.is_none() {
            self.first_panic = Some(message);
        }
    }

    /// Every trial ran and succeeded.
    pub fn is_clean(&self) -> bool {
        self.state == RunState::Completed && self.succeeded == self.trials
    }

    /// Average nanoseconds per trial over the timed phase.
    pub fn nanos_per_trial(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.elapsed.as_nanos() as f64 / self.trials as f64
    }

    /// Completed trials per second.
    pub fn trials_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.succeeded as f64 / secs
    }

    /// Turn recorded failures into an error that still carries the timing.
    pub fn into_result(self) -> BenchResult<Self> {
        if let Some(message) = self.first_panic {
            return Err(BenchError::TaskPanicked { message });
        }
        if let Some(first) = self.first_error {
            return Err(BenchError::TaskFailures {
                failed: self.failed,
                trials: self.trials,
                elapsed: self.elapsed,
                first,
            });
        }
        Ok(self)
    }
}

/// Run label used in logs and reports, e.g. `encode_line_parallel`.
pub fn run_label(operation: Operation, format: Format, mode: ExecutionMode) -> String {
    format!("{}_{}_{}", operation, format, mode)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Codecs with scripted misbehaviour for driver tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::codec::Codec;
    use crate::error::{DecodeError, EncodeError};
    use crate::payload::{Payload, PayloadGenerator, UserGenerator};
    use crate::types::{Format, PayloadSize};

    /// Fails every `every`-th encode call.
    #[derive(Debug)]
    pub struct FlakyCodec {
        pub every: usize,
        pub calls: AtomicUsize,
    }

    impl FlakyCodec {
        pub fn new(every: usize) -> Self {
            Self {
                every,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Codec for FlakyCodec {
        fn format(&self) -> Format {
            Format::Json
        }

        fn encode(&self, _payload: &Payload) -> Result<Vec<u8>, EncodeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call % self.every == 0 {
                return Err(EncodeError::NonFiniteNumber {
                    field: "score",
                    value: f64::NAN,
                });
            }
            Ok(vec![0u8; 8])
        }

        fn decode(&self, _bytes: &[u8]) -> Result<Payload, DecodeError> {
            Err(DecodeError::UnexpectedEof { expected: "anything" })
        }
    }

    /// Blocks every call for a fixed time.
    #[derive(Debug)]
    pub struct StuckCodec {
        pub delay: Duration,
    }

    impl Codec for StuckCodec {
        fn format(&self) -> Format {
            Format::Binary
        }

        fn encode(&self, _payload: &Payload) -> Result<Vec<u8>, EncodeError> {
            std::thread::sleep(self.delay);
            Ok(Vec::new())
        }

        fn decode(&self, _bytes: &[u8]) -> Result<Payload, DecodeError> {
            std::thread::sleep(self.delay);
            Ok(Payload::default())
        }
    }

    /// Panics on every encode.
    #[derive(Debug)]
    pub struct PanickingCodec;

    impl Codec for PanickingCodec {
        fn format(&self) -> Format {
            Format::Line
        }

        fn encode(&self, _payload: &Payload) -> Result<Vec<u8>, EncodeError> {
            panic!("codec exploded");
        }

        fn decode(&self, _bytes: &[u8]) -> Result<Payload, DecodeError> {
            panic!("codec exploded");
        }
    }

    /// Generator that sleeps before producing each payload.
    pub struct SlowGenerator {
        pub delay: Duration,
        pub calls: AtomicUsize,
    }

    impl SlowGenerator {
        pub fn new(delay: Duration) -> Self {
            Self {
                delay,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PayloadGenerator for SlowGenerator {
        fn generate(&self, size: PayloadSize) -> Payload {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            UserGenerator.generate(size)
        }
    }
}
