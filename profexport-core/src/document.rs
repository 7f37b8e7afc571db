// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Document model for exported profiles.
//!
//! Every builder here is a pure function returning an owned sub-tree. The time
//! origin and the simple flag are explicit parameters, so one experiment's
//! entry never depends on another's.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::decode::decode_tensor;
use crate::types::{Experiment, ExperimentMode, RequestRecord, TensorMap};

/// Load setting of an experiment as written to the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum ExperimentDescriptor {
    Concurrency(u64),
    RequestRate(f64),
}

impl From<&ExperimentMode> for ExperimentDescriptor {
    fn from(mode: &ExperimentMode) -> Self {
        if mode.concurrency != 0 {
            ExperimentDescriptor::Concurrency(mode.concurrency)
        } else {
            ExperimentDescriptor::RequestRate(mode.request_rate)
        }
    }
}

/// One request as written to the document. Field order is the key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEntry {
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_inputs: Option<Map<String, Value>>,
    pub response_timestamps: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_outputs: Option<Vec<Map<String, Value>>>,
}

/// One experiment as written to the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentEntry {
    pub experiment: ExperimentDescriptor,
    pub requests: Vec<RequestEntry>,
    pub window_boundaries: Vec<i64>,
}

/// Root of the exported artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub experiments: Vec<ExperimentEntry>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_kind: Option<String>,
    pub endpoint: String,
}

/// Offset of `raw` from `origin` in nanoseconds.
///
/// Timestamps earlier than the origin come out negative instead of wrapping.
/// Offsets beyond the `i64` range saturate at `i64::MAX` or `i64::MIN`.
pub fn normalize(raw: u64, origin: u64) -> i64 {
    let offset = i128::from(raw) - i128::from(origin);
    i64::try_from(offset).unwrap_or(if offset > 0 { i64::MAX } else { i64::MIN })
}

/// The time origin of an experiment: its first window boundary.
pub fn time_origin(experiment: &Experiment) -> Option<u64> {
    experiment.window_boundaries.first().copied()
}

/// Decode tensor mappings into one JSON object, in order.
///
/// A name seen again replaces the earlier value. Payloads that cannot be
/// decoded are logged and left out.
pub fn tensor_object<'a>(maps: impl IntoIterator<Item = &'a TensorMap>) -> Map<String, Value> {
    let mut object = Map::new();
    for map in maps {
        for (name, payload) in map {
            match decode_tensor(payload) {
                Ok(value) => {
                    object.insert(name.clone(), value);
                }
                Err(e) => {
                    tracing::warn!(
                        tensor = %name,
                        element_type = %payload.element_type,
                        error = %e,
                        "Omitting tensor from profile"
                    );
                }
            }
        }
    }
    object
}

/// Build the entry for one request.
pub fn request_entry(request: &RequestRecord, origin: u64, simple: bool) -> RequestEntry {
    let sequence_id = (request.sequence_id != 0).then_some(request.sequence_id);

    let request_inputs = (!simple).then(|| tensor_object(&request.request_inputs));

    let response_timestamps = request
        .response_timestamps
        .iter()
        .map(|&ts| normalize(ts, origin))
        .collect();

    let response_outputs = (!simple).then(|| {
        request
            .response_outputs
            .iter()
            .map(|output| tensor_object(std::iter::once(output)))
            .collect()
    });

    RequestEntry {
        timestamp: normalize(request.start_time, origin),
        sequence_id,
        request_inputs,
        response_timestamps,
        response_outputs,
    }
}

/// Fold one experiment into its document entry.
pub fn experiment_entry(experiment: &Experiment, origin: u64, simple: bool) -> ExperimentEntry {
    ExperimentEntry {
        experiment: ExperimentDescriptor::from(&experiment.mode),
        requests: experiment
            .requests
            .iter()
            .map(|request| request_entry(request, origin, simple))
            .collect(),
        window_boundaries: experiment
            .window_boundaries
            .iter()
            .map(|&boundary| normalize(boundary, origin))
            .collect(),
    }
}
