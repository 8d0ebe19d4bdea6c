// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON adapter backed by `serde_json`.

use serde::{Deserialize, Serialize};

use super::{ensure_finite, Codec};
use crate::error::{DecodeError, EncodeError};
use crate::payload::Payload;
use crate::types::Format;

/// JSON adapter options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonOptions {
    /// Emit indented output instead of compact output.
    pub pretty: bool,
}

/// JSON codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    options: JsonOptions,
}

impl JsonCodec {
    pub fn new(options: JsonOptions) -> Self {
        Self { options }
    }
}

impl Codec for JsonCodec {
    fn format(&self) -> Format {
        Format::Json
    }

    fn encode(&self, payload: &Payload) -> Result<Vec<u8>, EncodeError> {
        // serde_json writes non-finite floats as `null`, which would only
        // surface later as a decode failure.
        for profile in payload.users.iter().filter_map(|u| u.profile.as_ref()) {
            ensure_finite("score", profile.score)?;
        }

        let bytes = if self.options.pretty {
            serde_json::to_vec_pretty(payload)?
        } else {
            serde_json::to_vec(payload)?
        };
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Payload, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
