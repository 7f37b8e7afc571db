// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict validation.
//!
//! Every key is optional. Invalid values are rejected before any export runs.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ExportError, ExportResult};
use crate::types::BackendKind;

/// Smallest accepted writer buffer: 4 KiB
const MIN_WRITE_BUFFER: usize = 4 * 1024;
/// Largest accepted writer buffer: 64 MiB
const MAX_WRITE_BUFFER: usize = 64 * 1024 * 1024;

/// Raw configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExportConfig {
    #[serde(default)]
    simple: bool,
    #[serde(default)]
    pretty: bool,
    #[serde(default)]
    atomic_write: bool,
    #[serde(default = "default_write_buffer_bytes")]
    write_buffer_bytes: usize,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    endpoint: String,
    #[serde(default = "default_service_kind")]
    service_kind: String,
}

fn default_write_buffer_bytes() -> usize {
    64 * 1024 // 64 KiB
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_service_kind() -> String {
    "triton".to_string()
}

impl Default for RawExportConfig {
    fn default() -> Self {
        Self {
            simple: false,
            pretty: false,
            atomic_write: false,
            write_buffer_bytes: default_write_buffer_bytes(),
            version: default_version(),
            endpoint: String::new(),
            service_kind: default_service_kind(),
        }
    }
}

/// Validated export configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Omit tensor payloads, keep timing only.
    pub simple: bool,
    /// Use the pretty printer instead of compact output.
    pub pretty: bool,
    /// Write to a temporary file and rename it over the destination.
    pub atomic_write: bool,
    pub write_buffer_bytes: usize,
    pub version: String,
    pub endpoint: String,
    pub service_kind: BackendKind,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            simple: false,
            pretty: false,
            atomic_write: false,
            write_buffer_bytes: default_write_buffer_bytes(),
            version: default_version(),
            endpoint: String::new(),
            service_kind: BackendKind::from_label(&default_service_kind()),
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> ExportResult<ExportConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ExportError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ExportError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    pub fn load_string(content: &str) -> ExportResult<ExportConfig> {
        if content.trim().is_empty() {
            return Self::validate(RawExportConfig::default());
        }

        let raw: RawExportConfig =
            serde_yaml::from_str(content).map_err(|e| ExportError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    /// Check a writer buffer size against the accepted range.
    pub(crate) fn validate_write_buffer(bytes: usize) -> ExportResult<()> {
        if !(MIN_WRITE_BUFFER..=MAX_WRITE_BUFFER).contains(&bytes) {
            return Err(ExportError::InvalidConfig {
                field: "write_buffer_bytes",
                value: bytes.to_string(),
                reason: format!(
                    "Must be between {} and {} bytes",
                    MIN_WRITE_BUFFER, MAX_WRITE_BUFFER
                ),
            });
        }
        Ok(())
    }

    /// Validate raw configuration and convert to validated types.
    fn validate(raw: RawExportConfig) -> ExportResult<ExportConfig> {
        Self::validate_write_buffer(raw.write_buffer_bytes)?;

        if raw.version.trim().is_empty() {
            return Err(ExportError::InvalidConfig {
                field: "version",
                value: raw.version,
                reason: "Version cannot be empty".to_string(),
            });
        }

        // Unknown kinds are kept; the exporter omits them with a warning.
        let service_kind = BackendKind::from_label(&raw.service_kind);

        Ok(ExportConfig {
            simple: raw.simple,
            pretty: raw.pretty,
            atomic_write: raw.atomic_write,
            write_buffer_bytes: raw.write_buffer_bytes,
            version: raw.version,
            endpoint: raw.endpoint,
            service_kind,
        })
    }
}
