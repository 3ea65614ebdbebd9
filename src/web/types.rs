//! JSON bodies for the `/api` routes.

use super::download_path;
use crate::job::{ConversionJob, JobId, JobStatus};
use crate::output::ExportFormat;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertResponse {
    /// `None` when the request carried no files.
    pub session_id: Option<Uuid>,
    pub jobs: Vec<JobResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: JobId,
    pub name: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    /// User-facing message only; details stay in the server log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub downloads: Vec<DownloadLink>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadLink {
    pub format: ExportFormat,
    pub file_name: String,
    pub media_type: String,
    pub url: String,
}

impl ConvertResponse {
    pub fn empty() -> Self {
        Self {
            session_id: None,
            jobs: Vec::new(),
        }
    }

    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: Some(session.id),
            jobs: session
                .jobs()
                .map(|job| JobResponse::new(session.id, job))
                .collect(),
        }
    }
}

impl JobResponse {
    fn new(session_id: Uuid, job: &ConversionJob) -> Self {
        let downloads = ExportFormat::ALL
            .into_iter()
            .filter_map(|format| {
                job.download(format).map(|d| DownloadLink {
                    format,
                    file_name: d.file_name,
                    media_type: d.media_type.to_string(),
                    url: download_path(session_id, job.id, format),
                })
            })
            .collect();

        Self {
            id: job.id,
            name: job.original_name.clone(),
            status: job.status,
            text_content: job.text_content.clone(),
            error: job.error.as_ref().map(|e| e.to_string()),
            downloads,
        }
    }
}
