// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for the profile exporter.
//!
//! This module defines explicit enum error types as per coding guidelines.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for an export.
///
/// Only destination I/O, configuration and precondition failures surface here.
/// Per-field decode problems are reported as [`DecodeError`] and never abort
/// an export.
#[derive(Debug, Error)]
pub enum ExportError {
    // =========================================================================
    // Destination Errors - Fatal, Never Retried
    // =========================================================================
    #[error("Failed to open file for outputting raw profile data: {path} - {source}")]
    OpenDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize profile document: {0}")]
    Serialization(#[from] serde_json::Error),

    // =========================================================================
    // Input Precondition Errors
    // =========================================================================
    #[error("Experiment {experiment} has no window boundaries; cannot determine its time origin")]
    MissingTimeOrigin { experiment: usize },

    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value: {field} = {value} - {reason}")]
    InvalidConfig {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ExportError {
    /// Stable, non-zero status code for this error at the library boundary.
    pub fn code(&self) -> u32 {
        match self {
            ExportError::OpenDestination { .. } => 1,
            ExportError::Io { .. } => 2,
            ExportError::Serialization(_) => 3,
            ExportError::MissingTimeOrigin { .. } => 4,
            ExportError::ConfigNotFound { .. } => 5,
            ExportError::ConfigParse { .. } => 6,
            ExportError::InvalidConfig { .. } => 7,
        }
    }
}

/// Per-value decode failures. Callers log these and skip the value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Data type '{tag}' is not supported with JSON")]
    UnsupportedType { tag: String },

    #[error("Index out of bounds: element {index} of width {width} exceeds buffer of {len} bytes")]
    OutOfBounds {
        index: usize,
        width: usize,
        len: usize,
    },
}

/// Result type alias using ExportError.
pub type ExportResult<T> = Result<T, ExportError>;
