// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Protocol Buffers adapter.
//!
//! The payload types carry `prost` derives, so the binary format encodes the
//! canonical structs directly without a conversion layer.

use prost::Message;

use super::Codec;
use crate::error::{DecodeError, EncodeError};
use crate::payload::Payload;
use crate::types::Format;

/// Binary schema-based codec (protobuf wire format).
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn format(&self) -> Format {
        Format::Binary
    }

    fn encode(&self, payload: &Payload) -> Result<Vec<u8>, EncodeError> {
        Ok(payload.encode_to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Payload, DecodeError> {
        Ok(Payload::decode(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::generate;

    #[test]
    fn test_missing_profile_survives() {
        let payload = generate(7).unwrap();
        let decoded = BinaryCodec.decode(&BinaryCodec.encode(&payload).unwrap()).unwrap();
        assert!(decoded.users[6].profile.is_none());
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_empty_payload_is_empty_buffer() {
        let bytes = BinaryCodec.encode(&generate(0).unwrap()).unwrap();
        assert!(bytes.is_empty());
        assert_eq!(BinaryCodec.decode(&bytes).unwrap().user_count(), 0);
    }

    #[test]
    fn test_garbage_rejected() {
        let err = BinaryCodec.decode(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap_err();
        assert!(matches!(err, DecodeError::Binary(_)));
    }
}
