//! Conversion jobs: one per uploaded file, processed sequentially.
//!
//! A batch never aborts early. Each file is caught at its own boundary:
//! the detailed [`crate::error::ConvertError`] goes to the log (and to the
//! progress callback), while the job itself only records the user-facing
//! [`JobError`].

use crate::config::ConverterConfig;
use crate::convert::convert_bytes;
use crate::converter::DocumentConverter;
use crate::error::{ConvertError, JobError};
use crate::output::{Download, ExportFormat};
use crate::pipeline::upload::{FileName, UploadedFile};
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Position of a job within its batch (0-based, upload order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
}

/// One uploaded file's path to Markdown/text output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionJob {
    pub id: JobId,
    pub original_name: String,
    pub base_name: String,
    pub extension: String,
    pub status: JobStatus,
    pub text_content: Option<String>,
    pub error: Option<JobError>,
}

impl ConversionJob {
    /// A pending job for `name` at position `id`.
    pub fn new(id: JobId, name: &FileName) -> Self {
        Self {
            id,
            original_name: name.original.clone(),
            base_name: name.base_name.clone(),
            extension: name.extension.clone(),
            status: JobStatus::Pending,
            text_content: None,
            error: None,
        }
    }

    fn succeed(&mut self, text: String) {
        self.status = JobStatus::Succeeded;
        self.text_content = Some(text);
        self.error = None;
    }

    fn fail(&mut self) {
        self.status = JobStatus::Failed;
        self.text_content = None;
        self.error = Some(JobError::new(&self.original_name));
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == JobStatus::Succeeded
    }

    /// The download for `format`, or `None` unless the job succeeded.
    pub fn download(&self, format: ExportFormat) -> Option<Download> {
        self.text_content
            .as_deref()
            .filter(|_| self.is_succeeded())
            .map(|text| Download::new(format, &self.base_name, text))
    }

    /// Both downloads (Markdown first), empty unless the job succeeded.
    pub fn downloads(&self) -> Vec<Download> {
        ExportFormat::ALL
            .iter()
            .filter_map(|f| self.download(*f))
            .collect()
    }
}

/// Convert one upload into a finished job.
///
/// Unsupported extensions fail without invoking the converter.
pub async fn run_job(
    converter: &dyn DocumentConverter,
    id: JobId,
    upload: &UploadedFile,
    config: &ConverterConfig,
) -> (ConversionJob, Result<usize, ConvertError>) {
    let name = upload.file_name();
    let mut job = ConversionJob::new(id, &name);

    let result = match name.ensure_supported(config) {
        Ok(()) => convert_bytes(converter, &upload.bytes, &name.extension, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => {
            let len = output.text_content.len();
            job.succeed(output.text_content);
            (job, Ok(len))
        }
        Err(e) => {
            warn!("Error processing {}: {}", name.original, e);
            job.fail();
            (job, Err(e))
        }
    }
}

/// Convert every upload in order, one at a time.
///
/// Always returns exactly one job per upload. With no uploads the converter
/// is never touched.
pub async fn process_batch(
    converter: &dyn DocumentConverter,
    uploads: &[UploadedFile],
    config: &ConverterConfig,
    progress: Option<&ProgressCallback>,
) -> Vec<ConversionJob> {
    let total = uploads.len();
    if total == 0 {
        return Vec::new();
    }

    info!("Converting {} file(s) with {}", total, converter.name());
    if let Some(cb) = progress {
        cb.on_batch_start(total);
    }

    let mut jobs = Vec::with_capacity(total);
    for (i, upload) in uploads.iter().enumerate() {
        if let Some(cb) = progress {
            cb.on_file_start(i + 1, total, &upload.file_name().original);
        }

        let (job, result) = run_job(converter, JobId(i), upload, config).await;

        if let Some(cb) = progress {
            match &result {
                Ok(len) => cb.on_file_complete(i + 1, total, &job.original_name, *len),
                Err(e) => cb.on_file_error(i + 1, total, &job.original_name, &e.to_string()),
            }
        }
        jobs.push(job);
    }

    let succeeded = jobs.iter().filter(|j| j.is_succeeded()).count();
    info!("Batch complete: {}/{} converted", succeeded, total);
    if let Some(cb) = progress {
        cb.on_batch_complete(total, succeeded);
    }

    jobs
}
