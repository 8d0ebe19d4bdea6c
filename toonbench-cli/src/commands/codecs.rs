// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `toonbench codecs` command - List configured codecs.
//!
//! Shows each codec's encoded size for the configured payload and the time
//! of one encode.

use std::path::Path;

use toonbench_benchmark::harness::measure;
use toonbench_benchmark::LatencyMetrics;
use toonbench_core::BenchContext;

pub async fn execute(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let context = BenchContext::new(config)?;
    let payload = context.payload();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                     CONFIGURED CODECS                        ║");
    println!("╠════════════╦═══════════════╦═══════════════╦═════════════════╣");
    println!("║ Format     ║ Encoded bytes ║ Bytes/user    ║ One encode      ║");
    println!("╠════════════╬═══════════════╬═══════════════╬═════════════════╣");

    for codec in context.codecs() {
        let (encoded, elapsed) = measure(|| codec.encode(payload));
        let encoded = encoded?;
        let per_user = if payload.user_count() == 0 {
            0.0
        } else {
            encoded.len() as f64 / payload.user_count() as f64
        };

        println!(
            "║ {:<10} ║ {:>13} ║ {:>13.1} ║ {:>15} ║",
            codec.name(),
            encoded.len(),
            per_user,
            LatencyMetrics::format_latency(elapsed.as_nanos() as u64)
        );
    }

    println!("╚════════════╩═══════════════╩═══════════════╩═════════════════╝");
    println!();
    println!("Payload: {} user(s)", payload.user_count());

    Ok(())
}
