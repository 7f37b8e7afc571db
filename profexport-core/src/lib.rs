// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Profile Export Core Library
//!
//! Turns telemetry collected during an inference benchmarking run into one
//! versioned JSON profile. Provides typed decoding of raw tensor payloads,
//! the profile document model, the export engine and the file writer.

pub mod config;
pub mod decode;
pub mod document;
pub mod error;
pub mod exporter;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use config::{ConfigLoader, ExportConfig};
pub use decode::{decode_element, decode_tensor, ElementType};
pub use document::{ExperimentDescriptor, ExperimentEntry, ExportDocument, RequestEntry};
pub use error::{DecodeError, ExportError, ExportResult};
pub use exporter::ProfileExporter;
pub use types::{
    BackendKind, Experiment, ExperimentMode, RequestRecord, Status, TensorMap, TensorPayload,
};
pub use writer::{ProfileWriter, WriteOptions};
