// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Validates the suite settings and codec options before any payload is
//! generated. Any invalid field results in a ValidationError that prevents
//! the run from starting.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::codec::CodecConfig;
use crate::driver::{DriverConfig, FailurePolicy, InputStrategy};
use crate::error::{BenchError, BenchResult, ValidationError};
use crate::types::{Format, PayloadSize, DEFAULT_PAYLOAD_USERS};

/// Upper bound on trials per run.
pub const MAX_TRIALS: usize = 1_000_000;

/// Upper bound on repetitions per entry point.
pub const MAX_ITERATIONS: usize = 10_000;

/// Raw suite configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSuiteConfig {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_users")]
    users: i64,
    #[serde(default = "default_trials")]
    trials: usize,
    #[serde(default = "default_iterations")]
    iterations: usize,
    #[serde(default = "default_warmup")]
    warmup: usize,
    #[serde(default)]
    failure_policy: FailurePolicy,
    #[serde(default)]
    deadline_ms: Option<u64>,
    #[serde(default)]
    verify: bool,
    #[serde(default)]
    input_strategy: InputStrategy,
}

fn default_name() -> String {
    "toonbench".to_string()
}

fn default_users() -> i64 {
    DEFAULT_PAYLOAD_USERS as i64
}

fn default_trials() -> usize {
    100
}

fn default_iterations() -> usize {
    10
}

fn default_warmup() -> usize {
    1
}

impl Default for RawSuiteConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            users: default_users(),
            trials: default_trials(),
            iterations: default_iterations(),
            warmup: default_warmup(),
            failure_policy: FailurePolicy::default(),
            deadline_ms: None,
            verify: false,
            input_strategy: InputStrategy::default(),
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    suite: RawSuiteConfig,
    /// Absent means "all formats with default options".
    codecs: Option<Vec<CodecConfig>>,
}

/// Validated suite configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteConfig {
    /// Used in report file names.
    pub name: String,
    pub users: PayloadSize,
    pub trials: usize,
    pub iterations: usize,
    pub warmup: usize,
    pub driver: DriverConfig,
    pub input_strategy: InputStrategy,
}

/// Complete validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub suite: SuiteConfig,
    pub codecs: Vec<CodecConfig>,
}

impl Config {
    /// Options for `format`, if that codec is configured.
    pub fn codec(&self, format: Format) -> Option<&CodecConfig> {
        self.codecs.iter().find(|c| c.format() == format)
    }

    /// Configured formats in declaration order.
    pub fn formats(&self) -> Vec<Format> {
        self.codecs.iter().map(CodecConfig::format).collect()
    }
}

impl SuiteConfig {
    /// Apply command-line overrides under the same limits as the file.
    pub fn apply_overrides(
        &mut self,
        trials: Option<usize>,
        iterations: Option<usize>,
    ) -> Result<(), ValidationError> {
        if let Some(trials) = trials {
            check_trials(trials)?;
            self.trials = trials;
        }
        if let Some(iterations) = iterations {
            check_iterations(iterations)?;
            self.iterations = iterations;
        }
        Ok(())
    }
}

fn check_trials(trials: usize) -> Result<(), ValidationError> {
    if trials > MAX_TRIALS {
        return Err(ValidationError::OutOfRange {
            field: "trials",
            value: trials as i64,
            min: 0,
            max: MAX_TRIALS as i64,
        });
    }
    Ok(())
}

fn check_iterations(iterations: usize) -> Result<(), ValidationError> {
    if iterations == 0 || iterations > MAX_ITERATIONS {
        return Err(ValidationError::OutOfRange {
            field: "iterations",
            value: iterations as i64,
            min: 1,
            max: MAX_ITERATIONS as i64,
        });
    }
    Ok(())
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            users: PayloadSize::default(),
            trials: default_trials(),
            iterations: default_iterations(),
            warmup: default_warmup(),
            driver: DriverConfig::default(),
            input_strategy: InputStrategy::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            suite: SuiteConfig::default(),
            codecs: Format::ALL
                .iter()
                .map(|f| CodecConfig::default_for(*f))
                .collect(),
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> BenchResult<Config> {
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| BenchError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?
        };

        Ok(Self::validate(raw)?)
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawConfig) -> Result<Config, ValidationError> {
        let suite = Self::validate_suite(raw.suite)?;

        let codecs = match raw.codecs {
            None => Config::default().codecs,
            Some(codecs) => {
                let mut seen = HashSet::new();
                for codec in &codecs {
                    if !seen.insert(codec.format()) {
                        return Err(ValidationError::DuplicateCodec {
                            format: codec.format().to_string(),
                        });
                    }
                    codec.validate()?;
                }
                codecs
            }
        };

        if codecs.is_empty() {
            return Err(ValidationError::SchemaValidation {
                message: "At least one codec must be configured".to_string(),
            });
        }

        Ok(Config { suite, codecs })
    }

    /// Validate suite settings.
    fn validate_suite(raw: RawSuiteConfig) -> Result<SuiteConfig, ValidationError> {
        if raw.name.is_empty()
            || !raw
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::InvalidFieldValue {
                field: "name",
                value: raw.name,
                reason: "Must be non-empty and contain only [A-Za-z0-9_-]".to_string(),
            });
        }

        let users = PayloadSize::new(raw.users)?;

        check_trials(raw.trials)?;
        check_iterations(raw.iterations)?;

        let mut driver = DriverConfig::default()
            .failure_policy(raw.failure_policy)
            .verify(raw.verify);
        if let Some(ms) = raw.deadline_ms {
            if ms == 0 {
                return Err(ValidationError::InvalidFieldValue {
                    field: "deadline_ms",
                    value: "0".to_string(),
                    reason: "Deadline must be greater than 0".to_string(),
                });
            }
            driver = driver.deadline(Duration::from_millis(ms));
        }

        Ok(SuiteConfig {
            name: raw.name,
            users,
            trials: raw.trials,
            iterations: raw.iterations,
            warmup: raw.warmup,
            driver,
            input_strategy: raw.input_strategy,
        })
    }
}
