// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Serialization of finished profile documents to disk.
//!
//! Output is streamed through a bounded buffer. By default the destination is
//! written in place, so a crash mid-write leaves a truncated file. With
//! `atomic` set, the document goes to a temporary file in the same directory
//! which is renamed over the destination once complete.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::{Builder, NamedTempFile};

use crate::config::ExportConfig;
use crate::document::ExportDocument;
use crate::error::{ExportError, ExportResult};

/// How a document is laid out and committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub pretty: bool,
    pub atomic: bool,
    pub buffer_bytes: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            atomic: false,
            buffer_bytes: 64 * 1024,
        }
    }
}

impl From<&ExportConfig> for WriteOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            pretty: config.pretty,
            atomic: config.atomic_write,
            buffer_bytes: config.write_buffer_bytes,
        }
    }
}

/// Writes profile documents to files.
#[derive(Debug, Clone, Default)]
pub struct ProfileWriter {
    options: WriteOptions,
}

impl ProfileWriter {
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> WriteOptions {
        self.options
    }

    /// Serialize `document` to `path`, replacing any existing content.
    ///
    /// The document is consumed. Failing to open the destination is reported
    /// as [`ExportError::OpenDestination`].
    pub fn write(&self, document: ExportDocument, path: impl AsRef<Path>) -> ExportResult<()> {
        let path = path.as_ref();
        if self.options.atomic {
            self.write_atomic(&document, path)
        } else {
            self.write_in_place(&document, path)
        }
    }

    fn write_in_place(&self, document: &ExportDocument, path: &Path) -> ExportResult<()> {
        let file = File::create(path).map_err(|e| ExportError::OpenDestination {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut writer = BufWriter::with_capacity(self.options.buffer_bytes, file);
        self.serialize(document, &mut writer)?;
        writer.flush().map_err(|e| ExportError::Io {
            context: "flushing profile data",
            source: e,
        })
    }

    fn write_atomic(&self, document: &ExportDocument, path: &Path) -> ExportResult<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = Self::temp_file_in(dir).map_err(|e| ExportError::OpenDestination {
            path: path.to_path_buf(),
            source: e,
        })?;

        // Keep the mode of the file being replaced.
        if let Ok(metadata) = fs::metadata(path) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| ExportError::Io {
                    context: "copying destination permissions",
                    source: e,
                })?;
        }

        {
            let mut writer = BufWriter::with_capacity(self.options.buffer_bytes, temp.as_file_mut());
            self.serialize(document, &mut writer)?;
            writer.flush().map_err(|e| ExportError::Io {
                context: "flushing profile data",
                source: e,
            })?;
        }

        temp.persist(path).map_err(|e| ExportError::Io {
            context: "replacing destination with temporary file",
            source: e.error,
        })?;
        Ok(())
    }

    /// Temporary file created with the same mode `File::create` would use
    /// (0o666 less the umask) rather than tempfile's owner-only default.
    #[cfg(unix)]
    fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
        use std::os::unix::fs::PermissionsExt;

        Builder::new()
            .prefix(".profexport")
            .permissions(fs::Permissions::from_mode(0o666))
            .tempfile_in(dir)
    }

    #[cfg(not(unix))]
    fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
        Builder::new().prefix(".profexport").tempfile_in(dir)
    }

    fn serialize<W: Write>(&self, document: &ExportDocument, writer: W) -> ExportResult<()> {
        if self.options.pretty {
            serde_json::to_writer_pretty(writer, document)?;
        } else {
            serde_json::to_writer(writer, document)?;
        }
        Ok(())
    }
}
