// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for toonbench.
//!
//! Explicit enum error types throughout the library.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the benchmark harness.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Argument / Configuration Errors - Abort Before Any Measurement
    // =========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Unknown benchmark entry point: {name}")]
    UnknownEntryPoint { name: String },

    // =========================================================================
    // Codec Errors - Single-Threaded Runs Abort Immediately
    // =========================================================================
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    // =========================================================================
    // Parallel Driver Errors
    // =========================================================================
    #[error(
        "{failed} of {trials} trials failed (elapsed {elapsed:?} may be misleading): {first}"
    )]
    TaskFailures {
        failed: usize,
        trials: usize,
        elapsed: Duration,
        #[source]
        first: CodecError,
    },

    #[error("A trial panicked: {message}")]
    TaskPanicked { message: String },

    #[error("Deadline of {deadline:?} exceeded: {completed}/{trials} trials completed")]
    Timeout {
        deadline: Duration,
        completed: usize,
        trials: usize,
    },

    #[error("Verification failed for trial {trial}: {reason}")]
    Verification { trial: usize, reason: String },

    #[error("Invalid driver state transition: {0}")]
    InvalidStateTransition(#[from] StateTransitionError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors for arguments and configuration.
/// Raised before any payload is generated or any trial is launched.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} out of bounds: {value} (min: {min}, max: {max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Codec configured more than once: {format}")]
    DuplicateCodec { format: String },

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

/// Failures while serializing a payload.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Field '{field}' holds non-finite number {value}, which the format cannot represent")]
    NonFiniteNumber { field: &'static str, value: f64 },

    #[error("JSON encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while deserializing a buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Input is not valid UTF-8 at byte {valid_up_to}")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: &'static str },

    #[error("Malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Length mismatch for '{field}' at line {line}: declared {declared}, found {actual}")]
    LengthMismatch {
        field: &'static str,
        line: usize,
        declared: usize,
        actual: usize,
    },

    #[error("Missing required field '{field}' in record starting at line {line}")]
    MissingField { field: &'static str, line: usize },

    #[error("Duplicate field '{field}' at line {line}")]
    DuplicateField { field: String, line: usize },

    #[error("Unexpected trailing content at line {line}")]
    TrailingContent { line: usize },

    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary decode failed: {0}")]
    Binary(#[from] prost::DecodeError),
}

/// Error raised by a single codec call inside one trial.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// Driver state transition errors.
#[derive(Debug, Error)]
pub enum StateTransitionError {
    #[error("Cannot transition from {from} to {to} for run {run}")]
    InvalidTransition {
        run: String,
        from: &'static str,
        to: &'static str,
    },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;
