// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Codec adapters.
//!
//! One adapter per competing format, all exposing the same stateless
//! encode/decode pair over the canonical [`Payload`]. Format-specific
//! options live in [`CodecConfig`] and are validated before an adapter is
//! built; adapters never consult global state.

pub mod binary;
pub mod json;
pub mod line;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError, ValidationError};
use crate::payload::Payload;
use crate::types::Format;

pub use binary::BinaryCodec;
pub use json::{JsonCodec, JsonOptions};
pub use line::{Delimiter, LineCodec, LineOptions};

/// Uniform encode/decode capability for one serialization format.
///
/// Adapters are invoked concurrently from many trials and must not carry
/// mutable state.
pub trait Codec: Send + Sync + fmt::Debug {
    /// The format this adapter speaks.
    fn format(&self) -> Format;

    /// Serialize a payload into an owned buffer.
    fn encode(&self, payload: &Payload) -> Result<Vec<u8>, EncodeError>;

    /// Deserialize a buffer back into a payload.
    fn decode(&self, bytes: &[u8]) -> Result<Payload, DecodeError>;

    /// Short display name.
    fn name(&self) -> &'static str {
        self.format().name()
    }
}

/// A codec shared read-only between trials.
pub type SharedCodec = Arc<dyn Codec>;

/// Binary format takes no options; kept as a struct so every format has one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinaryOptions {}

/// Construction-time configuration for one codec adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum CodecConfig {
    Line(LineOptions),
    Json(JsonOptions),
    Binary(BinaryOptions),
}

impl CodecConfig {
    /// Default configuration for a format.
    pub fn default_for(format: Format) -> Self {
        match format {
            Format::Line => Self::Line(LineOptions::default()),
            Format::Json => Self::Json(JsonOptions::default()),
            Format::Binary => Self::Binary(BinaryOptions::default()),
        }
    }

    /// Format selected by this configuration.
    pub fn format(&self) -> Format {
        match self {
            Self::Line(_) => Format::Line,
            Self::Json(_) => Format::Json,
            Self::Binary(_) => Format::Binary,
        }
    }

    /// Check option values without building the adapter.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Line(options) => options.validate(),
            Self::Json(_) | Self::Binary(_) => Ok(()),
        }
    }

    /// Validate and build the adapter.
    pub fn build(&self) -> Result<SharedCodec, ValidationError> {
        let codec: SharedCodec = match self {
            Self::Line(options) => Arc::new(LineCodec::new(*options)?),
            Self::Json(options) => Arc::new(JsonCodec::new(*options)),
            Self::Binary(_) => Arc::new(BinaryCodec),
        };
        Ok(codec)
    }
}

/// Reject floats the text formats cannot carry.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<(), EncodeError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EncodeError::NonFiniteNumber { field, value })
    }
}
