//! Error types for the office2md library.
//!
//! Two distinct error types reflect two distinct audiences:
//!
//! * [`ConvertError`] — **Detailed**: what actually went wrong (temp file
//!   could not be created, the converter exited non-zero, timed out, printed
//!   non-UTF-8). Returned from the `convert*` functions and written to the
//!   `tracing` log.
//!
//! * [`JobError`] — **User-facing**: a single undifferentiated "could not
//!   read this file" failure stored on a [`crate::job::ConversionJob`]. It
//!   names the file and nothing else, so converter internals never reach the
//!   rendered page.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the office2md conversion pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The file's extension is not on the allow-list.
    #[error("Unsupported file type '{extension}' for '{name}'")]
    UnsupportedExtension { name: String, extension: String },

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Staging errors ────────────────────────────────────────────────────
    /// The scoped temporary file could not be created or written.
    #[error("Failed to stage upload in a temporary file: {0}")]
    TempFile(#[source] std::io::Error),

    // ── Converter errors ──────────────────────────────────────────────────
    /// The converter executable could not be located.
    #[error(transparent)]
    ConverterNotFound(#[from] converter_locate::LocateError),

    /// The converter process could not be started.
    #[error("Failed to start converter '{program}': {source}")]
    ConverterSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran but reported failure.
    #[error("Converter '{program}' exited with {status}: {stderr}")]
    ConverterFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The converter did not finish within the configured timeout.
    #[error("Converter '{program}' timed out after {secs}s")]
    ConverterTimeout { program: String, secs: u64 },

    /// The converter produced output that is not valid UTF-8.
    #[error("Converter '{program}' produced invalid output: {detail}")]
    InvalidOutput { program: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// The user-facing failure of a single conversion job.
///
/// Deliberately carries only the file name; the underlying
/// [`ConvertError`] is logged, not shown.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Could not read {file_name}. Please check the format.")]
pub struct JobError {
    pub file_name: String,
}

impl JobError {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_error_names_the_file_only() {
        let e = JobError::new("corrupt.docx");
        assert_eq!(
            e.to_string(),
            "Could not read corrupt.docx. Please check the format."
        );
    }

    #[test]
    fn converter_failed_display() {
        let e = ConvertError::ConverterFailed {
            program: "markitdown".into(),
            status: "exit status: 1".into(),
            stderr: "zipfile.BadZipFile".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("markitdown"), "got: {msg}");
        assert!(msg.contains("BadZipFile"), "got: {msg}");
    }

    #[test]
    fn timeout_display() {
        let e = ConvertError::ConverterTimeout {
            program: "markitdown".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn unsupported_extension_display() {
        let e = ConvertError::UnsupportedExtension {
            name: "notes.rtf".into(),
            extension: ".rtf".into(),
        };
        assert!(e.to_string().contains(".rtf"));
        assert!(e.to_string().contains("notes.rtf"));
    }

    #[test]
    fn job_error_serializes_file_name() {
        let json = serde_json::to_string(&JobError::new("a.pdf")).unwrap();
        assert_eq!(json, r#"{"file_name":"a.pdf"}"#);
    }
}
