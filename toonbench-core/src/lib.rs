// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! toonbench Core Library
//!
//! Serialization benchmark harness comparing a line-oriented text format,
//! JSON and a protobuf binary format. Provides the payload generator, codec
//! adapters, the parallel and sequential benchmark drivers, configuration
//! parsing and the entry-point runner.

pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod payload;
pub mod runner;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use codec::{Codec, CodecConfig, SharedCodec};
pub use config::{Config, ConfigLoader, SuiteConfig};
pub use driver::{
    run_parallel, run_sequential, DriverConfig, FailurePolicy, InputSource, InputStrategy,
    ParallelDriver, RunReport, SequentialDriver, TrialInputs,
};
pub use error::{BenchError, BenchResult, CodecError, DecodeError, EncodeError, ValidationError};
pub use payload::{generate, Payload, PayloadGenerator, Profile, User, UserGenerator};
pub use runner::{BenchContext, EntryPoint, Runner};
pub use state::{RunState, RunStateMachine};
pub use types::{ExecutionMode, Format, Operation, PayloadSize};
