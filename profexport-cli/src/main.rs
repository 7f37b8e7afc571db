// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Profile Export CLI
//!
//! Command-line interface for exporting captured benchmark records.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// profexport - Export inference benchmark telemetry to a JSON profile
#[derive(Parser)]
#[command(name = "profexport")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export captured experiment records to a profile file
    Export {
        /// JSON file holding an array of experiment records
        #[arg(short, long)]
        input: PathBuf,

        /// Destination of the profile, overwritten if present
        #[arg(short, long, default_value = "profile_export.json")]
        output: PathBuf,

        /// Backend kind of the benchmarked service (e.g. triton, openai)
        #[arg(long)]
        service_kind: Option<String>,

        /// Endpoint the requests were sent to
        #[arg(long)]
        endpoint: Option<String>,

        /// Version string recorded in the profile
        #[arg(long = "profile-version")]
        profile_version: Option<String>,

        /// Omit tensor payloads, keep timing only
        #[arg(short, long)]
        simple: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Export {
            input,
            output,
            service_kind,
            endpoint,
            profile_version,
            simple,
        } => commands::export::execute(
            cli.config.as_deref(),
            commands::export::Overrides {
                service_kind,
                endpoint,
                version: profile_version,
                simple,
            },
            &input,
            &output,
        ),
        Commands::Validate { file } => commands::validate::execute(&file),
    }
}
