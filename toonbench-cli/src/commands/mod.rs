// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod codecs;
pub mod run;
pub mod sample;
pub mod validate;
pub mod verify;

use std::path::Path;

use toonbench_core::{BenchResult, Config, ConfigLoader};

/// Load the configuration file if one was given, otherwise use defaults.
pub fn load_config(path: Option<&Path>) -> BenchResult<Config> {
    match path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_file(path)
        }
        None => Ok(Config::default()),
    }
}
