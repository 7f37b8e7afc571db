// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end export tests.
//!
//! These tests drive the exporter from records to a file on disk and parse the
//! result back.

use std::io::Write;
use std::sync::{Arc, Mutex};

use profexport_core::{
    BackendKind, ConfigLoader, ExportConfig, ExportError, Experiment, ExperimentMode,
    ProfileExporter, RequestRecord, Status, TensorMap, TensorPayload,
};
use serde_json::{json, Value};
use tempfile::TempDir;

const SECOND_NS: u64 = 1_000_000_000;

fn int32s(values: &[i32]) -> TensorPayload {
    TensorPayload::new(
        values
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect::<Vec<u8>>(),
        "INT32",
    )
}

fn tensors(name: &str, payload: TensorPayload) -> TensorMap {
    let mut map = TensorMap::new();
    map.insert(name.to_string(), payload);
    map
}

/// One experiment at concurrency 4 with a single request.
fn reference_experiment() -> Experiment {
    let origin = 1_700_000_000 * SECOND_NS;
    Experiment {
        mode: ExperimentMode::concurrency(4),
        requests: vec![RequestRecord {
            start_time: origin,
            sequence_id: 0,
            request_inputs: vec![tensors("INPUT0", int32s(&[1, 2, 3, 4]))],
            response_timestamps: vec![origin + 500_000],
            response_outputs: vec![tensors("OUTPUT0", int32s(&[5]))],
        }],
        window_boundaries: vec![origin, origin + 1_000_000],
    }
}

fn read_json(path: &std::path::Path) -> Value {
    let text = std::fs::read_to_string(path).expect("Failed to read profile");
    serde_json::from_str(&text).expect("Profile is not valid JSON")
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture.contents())
}

#[test]
fn test_reference_document_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profile_export.json");
    let exporter = ProfileExporter::create(&ExportConfig::default()).unwrap();

    exporter
        .export(
            &[reference_experiment()],
            "1.2.3",
            &path,
            &BackendKind::Triton,
            "v2/models/my_model/infer",
        )
        .unwrap();

    assert_eq!(
        read_json(&path),
        json!({
            "experiments": [
                {
                    "experiment": {"mode": "concurrency", "value": 4},
                    "requests": [
                        {
                            "timestamp": 0,
                            "request_inputs": {"INPUT0": [1, 2, 3, 4]},
                            "response_timestamps": [500000],
                            "response_outputs": [{"OUTPUT0": 5}]
                        }
                    ],
                    "window_boundaries": [0, 1000000]
                }
            ],
            "version": "1.2.3",
            "service_kind": "triton",
            "endpoint": "v2/models/my_model/infer"
        })
    );
}

#[test]
fn test_top_level_key_order() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profile_export.json");
    let exporter = ProfileExporter::create(&ExportConfig::default()).unwrap();

    exporter
        .export(
            &[reference_experiment()],
            "1.2.3",
            &path,
            &BackendKind::OpenAi,
            "v1/completions",
        )
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let positions: Vec<usize> = ["\"experiments\"", "\"version\"", "\"service_kind\"", "\"endpoint\""]
        .iter()
        .map(|key| text.rfind(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_simple_mode_keeps_only_timing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profile_export.json");
    let config = ConfigLoader::load_string("simple: true\n").unwrap();
    let exporter = ProfileExporter::create(&config).unwrap();

    let mut experiment = reference_experiment();
    experiment.requests[0].sequence_id = 17;
    exporter
        .export(&[experiment], "1.2.3", &path, &BackendKind::Triton, "infer")
        .unwrap();

    let document = read_json(&path);
    let request = &document["experiments"][0]["requests"][0];
    assert_eq!(
        request,
        &json!({
            "timestamp": 0,
            "sequence_id": 17,
            "response_timestamps": [500000]
        })
    );
}

#[test]
fn test_streamed_responses_and_request_rate() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profile_export.json");
    let exporter = ProfileExporter::create(&ExportConfig::default()).unwrap();

    let origin = 42 * SECOND_NS;
    let tokens = |text: &str| tensors("text_output", TensorPayload::new(text.as_bytes(), "BYTES"));
    let experiment = Experiment {
        mode: ExperimentMode::request_rate(2.5),
        requests: vec![RequestRecord {
            start_time: origin + 10,
            sequence_id: 1,
            request_inputs: vec![tensors("max_tokens", TensorPayload::new(8u32.to_ne_bytes(), "UINT32"))],
            response_timestamps: vec![origin + 20, origin + 30, origin + 40],
            response_outputs: vec![tokens("Hel"), tokens("lo"), tokens("")],
        }],
        window_boundaries: vec![origin, origin + 1_000, origin + 2_000],
    };

    exporter
        .export(&[experiment], "2.0.0", &path, &BackendKind::OpenAi, "v1/completions")
        .unwrap();

    let document = read_json(&path);
    let entry = &document["experiments"][0];
    assert_eq!(entry["experiment"], json!({"mode": "request_rate", "value": 2.5}));
    assert_eq!(entry["window_boundaries"], json!([0, 1000, 2000]));
    assert_eq!(
        entry["requests"][0],
        json!({
            "timestamp": 10,
            "sequence_id": 1,
            "request_inputs": {"max_tokens": 8},
            "response_timestamps": [20, 30, 40],
            "response_outputs": [
                {"text_output": "Hel"},
                {"text_output": "lo"},
                {"text_output": ""}
            ]
        })
    );
}

#[test]
fn test_bad_fields_do_not_abort_export() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profile_export.json");
    let exporter = ProfileExporter::create(&ExportConfig::default()).unwrap();

    let mut experiment = reference_experiment();
    let inputs = &mut experiment.requests[0].request_inputs[0];
    inputs.insert("HALF".to_string(), TensorPayload::new(vec![0, 60], "FP16"));
    inputs.insert("TRUNCATED".to_string(), TensorPayload::new(vec![1, 2, 3], "UINT32"));

    let (result, logs) = with_captured_logs(|| {
        exporter.export(&[experiment], "1.2.3", &path, &BackendKind::Triton, "infer")
    });

    result.unwrap();
    let document = read_json(&path);
    assert_eq!(
        document["experiments"][0]["requests"][0]["request_inputs"],
        json!({"INPUT0": [1, 2, 3, 4]})
    );
    assert!(logs.contains("FP16"));
    assert!(logs.contains("TRUNCATED"));
}

#[test]
fn test_unrecognized_service_kind_is_omitted_with_warning() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profile_export.json");
    let exporter = ProfileExporter::create(&ExportConfig::default()).unwrap();

    let (result, logs) = with_captured_logs(|| {
        exporter.export(
            &[reference_experiment()],
            "1.2.3",
            &path,
            &BackendKind::from(99),
            "infer",
        )
    });

    result.unwrap();
    let document = read_json(&path);
    assert!(document.get("service_kind").is_none());
    assert_eq!(document["endpoint"], json!("infer"));
    assert!(logs.contains("Unknown service kind"));
}

#[test]
fn test_unwritable_destination_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("no_such_dir").join("profile_export.json");
    let exporter = ProfileExporter::create(&ExportConfig::default()).unwrap();

    let result = exporter.export(
        &[reference_experiment()],
        "1.2.3",
        &path,
        &BackendKind::Triton,
        "infer",
    );

    let err = result.unwrap_err();
    assert!(matches!(err, ExportError::OpenDestination { .. }));
    assert!(err.to_string().contains("Failed to open file"));
    assert!(!path.exists());

    let status = Status::from(&err);
    assert!(!status.is_ok());
}

#[test]
fn test_missing_time_origin_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profile_export.json");
    let exporter = ProfileExporter::create(&ExportConfig::default()).unwrap();

    let mut experiment = reference_experiment();
    experiment.window_boundaries.clear();

    let result = exporter.export(&[experiment], "1.2.3", &path, &BackendKind::Triton, "infer");

    assert!(matches!(
        result,
        Err(ExportError::MissingTimeOrigin { experiment: 0 })
    ));
    assert!(!path.exists());
}

#[test]
fn test_atomic_pretty_export_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("export.yaml");
    std::fs::write(
        &config_path,
        "pretty: true\natomic_write: true\nwrite_buffer_bytes: 8192\n",
    )
    .unwrap();
    let path = temp_dir.path().join("profile_export.json");
    std::fs::write(&path, "previous run").unwrap();

    let config = ConfigLoader::load_file(&config_path).unwrap();
    let exporter = ProfileExporter::create(&config).unwrap();
    exporter
        .export(
            &[reference_experiment(), reference_experiment()],
            &config.version,
            &path,
            &config.service_kind,
            &config.endpoint,
        )
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.lines().count() > 1);
    let document: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(document["experiments"].as_array().unwrap().len(), 2);
    assert_eq!(document["version"], json!(env!("CARGO_PKG_VERSION")));
}
