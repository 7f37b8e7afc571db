// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `profexport export` command - Export captured records to a profile.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use profexport_core::{
    BackendKind, ConfigLoader, ExportConfig, Experiment, ProfileExporter, Status,
};
use thiserror::Error;

/// Errors reading a captured records file.
#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("Failed to open records file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse records file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Command-line values that take precedence over the configuration file.
pub struct Overrides {
    pub service_kind: Option<String>,
    pub endpoint: Option<String>,
    pub version: Option<String>,
    pub simple: bool,
}

impl Overrides {
    fn apply(self, mut config: ExportConfig) -> ExportConfig {
        if let Some(kind) = self.service_kind {
            config.service_kind = BackendKind::from_label(&kind);
        }
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(version) = self.version {
            config.version = version;
        }
        config.simple |= self.simple;
        config
    }
}

fn load_records(path: &Path) -> Result<Vec<Experiment>, RecordsError> {
    let file = File::open(path).map_err(|e| RecordsError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| RecordsError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn execute(
    config_path: Option<&Path>,
    overrides: Overrides,
    input: &Path,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_file(path)?,
        None => ExportConfig::default(),
    };
    let config = overrides.apply(config);

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        simple = config.simple,
        "Exporting profile data"
    );

    let experiments = load_records(input)?;
    tracing::debug!(experiments = experiments.len(), "Loaded records");

    let exporter = ProfileExporter::create(&config)?;
    let result = exporter.export(
        &experiments,
        &config.version,
        output,
        &config.service_kind,
        &config.endpoint,
    );

    let status = Status::from(&result);
    if !status.is_ok() {
        eprintln!("✗ Export failed: {}", status.message);
        std::process::exit(status.code as i32);
    }

    println!(
        "✓ Exported {} experiment(s) to {}",
        experiments.len(),
        output.display()
    );
    Ok(())
}
