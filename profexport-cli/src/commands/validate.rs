// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `profexport validate` command - Validate configuration file.

use std::path::Path;

use profexport_core::{ConfigLoader, Status};

pub fn execute(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file.display(), "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Export Settings:");
            println!("  Simple Profile:     {}", config.simple);
            println!("  Pretty Output:      {}", config.pretty);
            println!("  Atomic Write:       {}", config.atomic_write);
            println!("  Write Buffer:       {} bytes", config.write_buffer_bytes);
            println!("  Version:            {}", config.version);
            println!("  Endpoint:           {}", config.endpoint);
            match config.service_kind.service_kind() {
                Some(label) => println!("  Service Kind:       {}", label),
                None => println!(
                    "  Service Kind:       {} (will be omitted from profiles)",
                    config.service_kind
                ),
            }
            Ok(())
        }
        Err(e) => {
            let status = Status::from(&e);
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", status.message);
            std::process::exit(status.code as i32);
        }
    }
}
