// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Export engine: experiments in, one JSON profile file out.
//!
//! Soft problems (undecodable tensors, unknown backend kinds) are logged and
//! the affected field is left out. Only a missing time origin or a failure at
//! the destination aborts an export.

use std::path::Path;

use crate::config::{ConfigLoader, ExportConfig};
use crate::document::{experiment_entry, time_origin, ExperimentEntry, ExportDocument};
use crate::error::{ExportError, ExportResult};
use crate::types::{BackendKind, Experiment};
use crate::writer::{ProfileWriter, WriteOptions};

/// Exports collected profile data.
#[derive(Debug, Clone)]
pub struct ProfileExporter {
    simple: bool,
    writer: ProfileWriter,
}

impl ProfileExporter {
    /// Create an exporter from validated configuration.
    pub fn create(config: &ExportConfig) -> ExportResult<Self> {
        ConfigLoader::validate_write_buffer(config.write_buffer_bytes)?;
        Ok(Self {
            simple: config.simple,
            writer: ProfileWriter::new(WriteOptions::from(config)),
        })
    }

    /// Switch to the simplified profile: timing only, no tensor payloads.
    pub fn set_simple(&mut self) {
        self.simple = true;
    }

    pub fn is_simple(&self) -> bool {
        self.simple
    }

    /// Build the profile document without writing it.
    ///
    /// Experiments keep their input order. Each one is normalized against its
    /// own first window boundary.
    pub fn convert(
        &self,
        experiments: &[Experiment],
        version: &str,
        service_kind: &BackendKind,
        endpoint: &str,
    ) -> ExportResult<ExportDocument> {
        let entries = experiments
            .iter()
            .enumerate()
            .map(|(index, experiment)| self.convert_experiment(index, experiment))
            .collect::<ExportResult<Vec<_>>>()?;

        Ok(ExportDocument {
            experiments: entries,
            version: version.to_string(),
            service_kind: service_kind_field(service_kind),
            endpoint: endpoint.to_string(),
        })
    }

    fn convert_experiment(
        &self,
        index: usize,
        experiment: &Experiment,
    ) -> ExportResult<ExperimentEntry> {
        let origin = time_origin(experiment)
            .ok_or(ExportError::MissingTimeOrigin { experiment: index })?;
        tracing::debug!(
            experiment = index,
            start = origin,
            requests = experiment.requests.len(),
            "Converting experiment"
        );
        Ok(experiment_entry(experiment, origin, self.simple))
    }

    /// Convert `experiments` and write the profile to `destination`,
    /// overwriting any existing file.
    pub fn export(
        &self,
        experiments: &[Experiment],
        version: &str,
        destination: impl AsRef<Path>,
        service_kind: &BackendKind,
        endpoint: &str,
    ) -> ExportResult<()> {
        let destination = destination.as_ref();
        let document = self.convert(experiments, version, service_kind, endpoint)?;

        self.writer.write(document, destination)?;

        tracing::info!(
            path = %destination.display(),
            experiments = experiments.len(),
            simple = self.simple,
            "Exported profile data"
        );
        Ok(())
    }
}

/// Value of the `service_kind` field, `None` (with a warning) when the kind is
/// not one of the known backends.
pub fn service_kind_field(kind: &BackendKind) -> Option<String> {
    match kind.service_kind() {
        Some(label) => Some(label.to_string()),
        None => {
            tracing::warn!(
                kind = %kind,
                "Unknown service kind detected. The 'service_kind' will not be specified."
            );
            None
        }
    }
}
