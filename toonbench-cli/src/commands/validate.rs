// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `toonbench validate` command - Validate configuration file.

use std::path::Path;

use toonbench_core::{CodecConfig, ConfigLoader};

pub async fn execute(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file.display(), "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            let suite = &config.suite;
            println!("✓ Configuration is valid");
            println!();
            println!("Suite Settings:");
            println!("  Name:            {}", suite.name);
            println!("  Users:           {}", suite.users);
            println!("  Trials per run:  {}", suite.trials);
            println!("  Iterations:      {} (+{} warmup)", suite.iterations, suite.warmup);
            println!("  Failure policy:  {:?}", suite.driver.failure_policy);
            match suite.driver.deadline {
                Some(deadline) => println!("  Deadline:        {}ms", deadline.as_millis()),
                None => println!("  Deadline:        none"),
            }
            println!("  Verify outputs:  {}", suite.driver.verify);
            println!("  Input strategy:  {:?}", suite.input_strategy);
            println!();
            println!("Codecs ({}):", config.codecs.len());
            for codec in &config.codecs {
                println!("  - {}", describe(codec));
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

fn describe(codec: &CodecConfig) -> String {
    match codec {
        CodecConfig::Line(options) => format!(
            "line (length markers: {}, indent: {}, delimiter: {:?})",
            options.length_markers, options.indent, options.delimiter
        ),
        CodecConfig::Json(options) => format!("json (pretty: {})", options.pretty),
        CodecConfig::Binary(_) => "binary".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toonbench_core::codec::{Delimiter, LineOptions};

    #[test]
    fn test_describe_line_options() {
        let codec = CodecConfig::Line(LineOptions {
            length_markers: false,
            indent: 4,
            delimiter: Delimiter::Pipe,
        });
        assert_eq!(
            describe(&codec),
            "line (length markers: false, indent: 4, delimiter: Pipe)"
        );
    }
}
