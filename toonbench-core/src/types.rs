// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers and identifiers for benchmark inputs.
//!
//! Validated types ensure a run is well-formed by construction:
//! a negative or absurd payload size never reaches the generator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum number of users a generated payload may contain.
pub const MAX_PAYLOAD_USERS: i64 = 10_000_000;

/// Payload size used when none is configured.
pub const DEFAULT_PAYLOAD_USERS: usize = 5000;

/// Validated payload size (number of top-level user records).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct PayloadSize(usize);

impl PayloadSize {
    /// Create a new PayloadSize with bounds validation.
    pub fn new(users: i64) -> Result<Self, ValidationError> {
        if !(0..=MAX_PAYLOAD_USERS).contains(&users) {
            return Err(ValidationError::OutOfRange {
                field: "users",
                value: users,
                min: 0,
                max: MAX_PAYLOAD_USERS,
            });
        }
        Ok(Self(users as usize))
    }

    /// Number of user records.
    pub fn users(&self) -> usize {
        self.0
    }
}

impl Default for PayloadSize {
    fn default() -> Self {
        Self(DEFAULT_PAYLOAD_USERS)
    }
}

impl fmt::Display for PayloadSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} users", self.0)
    }
}

impl TryFrom<i64> for PayloadSize {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PayloadSize> for i64 {
    fn from(size: PayloadSize) -> Self {
        size.0 as i64
    }
}

/// Serialization formats under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Indentation-structured, line-oriented text (TOON style)
    Line,
    /// JSON text
    Json,
    /// Protocol Buffers binary wire format
    Binary,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Line, Format::Json, Format::Binary];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Json => "json",
            Self::Binary => "binary",
        }
    }

    /// Whether encoded buffers are human-readable text.
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Line | Self::Json)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line" | "toon" => Ok(Self::Line),
            "json" => Ok(Self::Json),
            "binary" | "proto" | "protobuf" => Ok(Self::Binary),
            _ => Err(ValidationError::InvalidFieldValue {
                field: "format",
                value: s.to_string(),
                reason: "Expected one of: line, json, binary".to_string(),
            }),
        }
    }
}

/// The codec operation measured by a benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Encode,
    Decode,
}

impl Operation {
    pub const ALL: [Operation; 2] = [Operation::Encode, Operation::Decode];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Encode => "encode",
            Self::Decode => "decode",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How trials are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One trial after another on a single thread.
    Sequential,
    /// One concurrent task per trial, joined at the end.
    Parallel,
}

impl ExecutionMode {
    pub const ALL: [ExecutionMode; 2] = [ExecutionMode::Sequential, ExecutionMode::Parallel];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExecutionMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" | "single" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            _ => Err(ValidationError::InvalidFieldValue {
                field: "mode",
                value: s.to_string(),
                reason: "Expected one of: sequential, parallel".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_size_bounds() {
        assert_eq!(PayloadSize::new(0).unwrap().users(), 0);
        assert_eq!(PayloadSize::new(5_000).unwrap().users(), 5_000);
        assert!(PayloadSize::new(-1).is_err());
        assert!(PayloadSize::new(MAX_PAYLOAD_USERS + 1).is_err());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("toon".parse::<Format>().unwrap(), Format::Line);
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("protobuf".parse::<Format>().unwrap(), Format::Binary);
        assert!("xml".parse::<Format>().is_err());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(
            "parallel".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::Parallel
        );
        assert!("async".parse::<ExecutionMode>().is_err());
    }
}
