// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Record shapes consumed by the exporter.
//!
//! These are populated by the collecting layer before an export starts and are
//! only ever borrowed by the engine. Timestamps are nanoseconds since the Unix
//! epoch.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Tensor name to payload, one mapping per request input set or response.
pub type TensorMap = BTreeMap<String, TensorPayload>;

/// Raw tensor bytes as they appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorPayload {
    /// Host-order element bytes, or opaque text for `BYTES`/`JSON`.
    pub raw_bytes: Vec<u8>,
    /// Declared element type tag, e.g. `INT32` or `BYTES`.
    pub element_type: String,
}

impl TensorPayload {
    pub fn new(raw_bytes: impl Into<Vec<u8>>, element_type: impl Into<String>) -> Self {
        Self {
            raw_bytes: raw_bytes.into(),
            element_type: element_type.into(),
        }
    }
}

/// Load setting of an experiment.
///
/// Exactly one field is meaningful; a non-zero `concurrency` takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExperimentMode {
    #[serde(default)]
    pub concurrency: u64,
    #[serde(default)]
    pub request_rate: f64,
}

impl ExperimentMode {
    pub fn concurrency(concurrency: u64) -> Self {
        Self {
            concurrency,
            request_rate: 0.0,
        }
    }

    pub fn request_rate(request_rate: f64) -> Self {
        Self {
            concurrency: 0,
            request_rate,
        }
    }
}

/// One inference call within an experiment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestRecord {
    pub start_time: u64,
    /// 0 means the request belongs to no sequence.
    #[serde(default)]
    pub sequence_id: u64,
    #[serde(default)]
    pub request_inputs: Vec<TensorMap>,
    #[serde(default)]
    pub response_timestamps: Vec<u64>,
    /// Aligned one-to-one with `response_timestamps`.
    #[serde(default)]
    pub response_outputs: Vec<TensorMap>,
}

/// One benchmarking run at a fixed load setting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Experiment {
    pub mode: ExperimentMode,
    #[serde(default)]
    pub requests: Vec<RequestRecord>,
    /// Non-decreasing; the first entry is the run's time origin.
    pub window_boundaries: Vec<u64>,
}

/// Inference-serving backend the benchmarked endpoint belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Triton,
    TensorflowServing,
    TorchServe,
    TritonCApi,
    OpenAi,
    DynamicGrpc,
    /// A kind outside the known table, holding the raw label or code seen.
    Unrecognized(String),
}

impl BackendKind {
    /// Label written to the `service_kind` field, if the kind is known.
    pub fn service_kind(&self) -> Option<&'static str> {
        match self {
            BackendKind::Triton => Some("triton"),
            BackendKind::TensorflowServing => Some("tfserving"),
            BackendKind::TorchServe => Some("torchserve"),
            BackendKind::TritonCApi => Some("triton_c_api"),
            BackendKind::OpenAi => Some("openai"),
            BackendKind::DynamicGrpc => Some("dynamic_grpc"),
            BackendKind::Unrecognized(_) => None,
        }
    }

    /// Parse an enum-style name (`TENSORFLOW_SERVING`) or an exported label
    /// (`tfserving`), case-insensitively. Anything else is kept as
    /// [`BackendKind::Unrecognized`].
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "triton" => BackendKind::Triton,
            "tensorflow_serving" | "tfserving" => BackendKind::TensorflowServing,
            "torchserve" => BackendKind::TorchServe,
            "triton_c_api" => BackendKind::TritonCApi,
            "openai" => BackendKind::OpenAi,
            "dynamic_grpc" => BackendKind::DynamicGrpc,
            _ => BackendKind::Unrecognized(label.to_string()),
        }
    }
}

impl From<u32> for BackendKind {
    fn from(code: u32) -> Self {
        match code {
            0 => BackendKind::Triton,
            1 => BackendKind::TensorflowServing,
            2 => BackendKind::TorchServe,
            3 => BackendKind::TritonCApi,
            4 => BackendKind::OpenAi,
            5 => BackendKind::DynamicGrpc,
            other => BackendKind::Unrecognized(other.to_string()),
        }
    }
}

impl FromStr for BackendKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Unrecognized(raw) => write!(f, "unrecognized({})", raw),
            known => write!(f, "{}", known.service_kind().unwrap_or_default()),
        }
    }
}

/// Lightweight status passed across the collecting-layer boundary.
/// A zero code means success.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub message: String,
    pub code: u32,
}

impl Status {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

impl From<&ExportError> for Status {
    fn from(err: &ExportError) -> Self {
        Self {
            message: err.to_string(),
            code: err.code(),
        }
    }
}

impl<T> From<&Result<T, ExportError>> for Status {
    fn from(result: &Result<T, ExportError>) -> Self {
        match result {
            Ok(_) => Status::success(),
            Err(e) => e.into(),
        }
    }
}
