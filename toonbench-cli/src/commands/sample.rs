// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `toonbench sample` command - Print one encoded payload.

use std::path::Path;

use toonbench_core::{generate, CodecConfig, Format};

/// Binary output longer than this is truncated in the hex dump.
const HEX_PREVIEW_BYTES: usize = 64;

pub async fn execute(
    config_path: Option<&Path>,
    format: Format,
    users: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let codec_config = config
        .codec(format)
        .cloned()
        .unwrap_or_else(|| CodecConfig::default_for(format));
    let codec = codec_config.build()?;

    let payload = generate(users)?;
    let encoded = codec.encode(&payload)?;

    print!("{}", render(format, &encoded));
    println!();
    Ok(())
}

/// Text formats verbatim; binary as a length line plus a hex preview.
fn render(format: Format, encoded: &[u8]) -> String {
    if format.is_text() {
        return String::from_utf8_lossy(encoded).into_owned();
    }

    let preview = &encoded[..encoded.len().min(HEX_PREVIEW_BYTES)];
    let mut out = format!("{} bytes\n{}", encoded.len(), hex::encode(preview));
    if encoded.len() > HEX_PREVIEW_BYTES {
        out.push_str("...");
    }
    out
}
