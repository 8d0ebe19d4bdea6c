// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `toonbench verify` command - Round-trip the payload through every codec.
//!
//! Checks a single encode/decode per codec, then a parallel batch in verify
//! mode so every concurrently produced output is compared as well.

use std::path::Path;

use toonbench_core::{
    BenchContext, BenchError, BenchResult, CodecError, Operation, ParallelDriver, SharedCodec,
};

pub async fn execute(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let context = BenchContext::new(config)?;
    let trials = num_cpus::get() * 4;
    let driver = ParallelDriver::new(context.config().suite.driver.verify(true));

    println!(
        "Verifying {} codec(s) with {} user(s), {} parallel trials each",
        context.config().codecs.len(),
        context.payload().user_count(),
        trials
    );
    println!();

    let mut failures = 0;
    for codec in context.codecs() {
        match verify_codec(&driver, codec, &context, trials).await {
            Ok(()) => println!("  ✓ {}", codec.name()),
            Err(e) => {
                failures += 1;
                println!("  ✗ {}: {}", codec.name(), e);
            }
        }
    }

    println!();
    if failures > 0 {
        eprintln!("✗ {} codec(s) failed verification", failures);
        std::process::exit(1);
    }
    println!("✓ All codecs round-trip");
    Ok(())
}

async fn verify_codec(
    driver: &ParallelDriver,
    codec: &SharedCodec,
    context: &BenchContext,
    trials: usize,
) -> BenchResult<()> {
    let payload = context.payload();
    let encoded = codec.encode(payload).map_err(CodecError::from)?;
    let decoded = codec.decode(&encoded).map_err(CodecError::from)?;
    if decoded != *payload {
        return Err(BenchError::Verification {
            trial: 0,
            reason: "decoded payload differs from the canonical payload".to_string(),
        });
    }

    for operation in Operation::ALL {
        driver
            .run(operation, codec.clone(), trials, payload)
            .await?
            .into_result()?;
    }
    Ok(())
}
