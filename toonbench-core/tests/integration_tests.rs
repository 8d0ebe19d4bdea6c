// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end integration tests for toonbench.
//!
//! These tests verify the complete flow from a configuration file to
//! measured runs of every entry point.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use toonbench_core::{
    generate, run_parallel, run_sequential, BenchContext, BenchError, CodecConfig, ConfigLoader,
    ExecutionMode, FailurePolicy, Format, Operation, RunState, Runner,
};

const SUITE_CONFIG: &str = r#"
suite:
  name: integration
  users: 50
  trials: 16
  iterations: 2
  verify: true

codecs:
  - format: line
    delimiter: pipe
  - format: json
  - format: binary
"#;

/// Load a config from disk, build the context and run every entry point.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_config_file_to_reports() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("toonbench.yaml");
    std::fs::write(&config_path, SUITE_CONFIG).expect("Failed to write config");

    let config = ConfigLoader::load_file(&config_path).expect("Config should be valid");
    let trials = config.suite.trials;
    let context = BenchContext::new(config).expect("Context should build");
    let runner = Runner::new(Arc::new(context));

    let entries = runner.entry_points();
    assert_eq!(entries.len(), 12);

    for entry in entries {
        let report = runner
            .run(entry, trials)
            .await
            .expect("Run should succeed")
            .into_result()
            .expect("No trial should fail");

        assert_eq!(report.succeeded, trials, "{}", entry);
        assert_eq!(report.state, RunState::Completed);
        assert!(report.verified, "{} was not verified", entry);
        assert!(report.bytes > 0);
    }
}

/// Canonical scenario: three users, line format, ten parallel encodes.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_three_users_line_ten_trials() {
    let payload = generate(3).expect("Valid size");
    assert_eq!(payload.users[0].id, 1);
    assert_eq!(payload.users[2].name, "User_2");

    let codec = CodecConfig::default_for(Format::Line)
        .build()
        .expect("Default options are valid");

    let report = run_parallel(Operation::Encode, codec.clone(), 10, &payload)
        .await
        .expect("Parallel run should succeed");
    assert_eq!(report.succeeded, 10);
    assert!(report.elapsed > Duration::ZERO);

    // Every encoded buffer decodes back to the canonical payload.
    let encoded = codec.encode(&payload).expect("Encode");
    assert_eq!(codec.decode(&encoded).expect("Decode"), payload);
}

/// Sequential and parallel runs of the same entry point agree on byte counts.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_modes_process_same_bytes() {
    let payload = generate(100).expect("Valid size");
    for format in Format::ALL {
        let codec = CodecConfig::default_for(format).build().expect("Build");
        let parallel = run_parallel(Operation::Decode, codec.clone(), 8, &payload)
            .await
            .expect("Parallel run");
        let sequential =
            run_sequential(Operation::Decode, codec.as_ref(), 8, &payload).expect("Sequential run");

        assert_eq!(parallel.bytes, sequential.bytes, "{}", format);
        assert_eq!(parallel.mode, ExecutionMode::Parallel);
        assert_eq!(sequential.mode, ExecutionMode::Sequential);
    }
}

/// Negative sizes are rejected before anything runs.
#[test]
fn test_invalid_size_aborts_before_measurement() {
    let err = generate(-1).expect_err("Negative size must fail");
    assert!(err.to_string().contains("users"));

    let config_err = ConfigLoader::load_string("suite:\n  users: -5\n")
        .expect_err("Negative size in config must fail");
    assert!(matches!(config_err, BenchError::InvalidArgument(_)));
}

/// Driver settings configured in YAML reach the parallel driver.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_driver_settings_flow_from_config() {
    let config = ConfigLoader::load_string(
        "suite:\n  users: 10\n  failure_policy: fail_fast\n  deadline_ms: 5000\n",
    )
    .expect("Config should be valid");
    assert_eq!(config.suite.driver.failure_policy, FailurePolicy::FailFast);

    let runner = Runner::new(Arc::new(BenchContext::new(config).expect("Context")));
    let entry = runner.find("encode_binary_parallel").expect("Entry exists");
    let report = runner.run(entry, 32).await.expect("Run should complete");
    assert!(report.is_clean());
}

/// Unknown entry points are reported by name.
#[test]
fn test_unknown_entry_point() {
    let config = ConfigLoader::load_string("suite:\n  users: 1\n").expect("Config");
    let runner = Runner::new(Arc::new(BenchContext::new(config).expect("Context")));

    match runner.find("encode_xml_parallel") {
        Err(BenchError::UnknownEntryPoint { name }) => assert_eq!(name, "encode_xml_parallel"),
        other => panic!("Expected UnknownEntryPoint, got {:?}", other),
    }
}
