use super::page;
use super::types::ConvertResponse;
use super::AppState;
use crate::job::{process_batch, JobId};
use crate::output::ExportFormat;
use crate::pipeline::upload::UploadedFile;
use crate::session::Session;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Multipart field carrying the uploaded documents.
const FILES_FIELD: &str = "files";

pub enum ApiError {
    Multipart(MultipartError),
    NotFound(String),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Multipart(err) => (
                err.status(),
                format!("Failed to read upload: {}", err.body_text()),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&state.config.accept_attribute(), None))
}

pub async fn health() -> &'static str {
    "ok"
}

/// Form submission: convert every uploaded file and render the results page.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    let uploads = read_uploads(multipart).await?;
    let session = convert_uploads(&state, uploads).await;
    Ok(Html(page::render(
        &state.config.accept_attribute(),
        session.as_deref(),
    )))
}

/// Same batch as [`upload`], answered as JSON.
pub async fn api_convert(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let uploads = read_uploads(multipart).await?;
    let response = match convert_uploads(&state, uploads).await {
        Some(session) => ConvertResponse::from_session(&session),
        None => ConvertResponse::empty(),
    };
    Ok(Json(response))
}

/// Serve one converted file as an attachment.
pub async fn download(
    State(state): State<AppState>,
    Path((session_id, job_id, format)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let not_found = || ApiError::NotFound("Download not found".to_string());

    let session_id: Uuid = session_id.parse().map_err(|_| not_found())?;
    let job_id = job_id.parse::<usize>().map(JobId).map_err(|_| not_found())?;
    let format: ExportFormat = format.parse().map_err(|_| not_found())?;

    let session = state.sessions.get(&session_id).ok_or_else(not_found)?;
    let download = session
        .job(job_id)
        .and_then(|job| job.download(format))
        .ok_or_else(not_found)?;

    debug!("Serving {} from session {}", download.file_name, session_id);
    Ok((
        [
            (
                header::CONTENT_TYPE,
                format!("{}; charset=utf-8", download.media_type),
            ),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&download.file_name),
            ),
        ],
        download.content,
    )
        .into_response())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Collect the `files` parts. A picker submitted with nothing selected sends
/// one part with an empty file name; such parts are skipped.
async fn read_uploads(mut multipart: Multipart) -> Result<Vec<UploadedFile>, MultipartError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let name = match field.file_name() {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => continue,
        };
        let bytes = field.bytes().await?;
        uploads.push(UploadedFile::new(name, bytes.to_vec()));
    }
    Ok(uploads)
}

/// Run the batch and store it as a new session. No uploads, no session.
async fn convert_uploads(state: &AppState, uploads: Vec<UploadedFile>) -> Option<Arc<Session>> {
    if uploads.is_empty() {
        return None;
    }
    let jobs = process_batch(state.converter.as_ref(), &uploads, &state.config, None).await;
    let session = state.sessions.insert(Session::new(jobs));
    info!("Stored session {} ({} job(s))", session.id, session.jobs.len());
    Some(session)
}

/// `attachment` header with an ASCII fallback name and the exact UTF-8 name.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_for_plain_name() {
        assert_eq!(
            content_disposition("report_converted.md"),
            "attachment; filename=\"report_converted.md\"; filename*=UTF-8''report_converted.md"
        );
    }

    #[test]
    fn disposition_escapes_quotes_and_unicode() {
        let h = content_disposition("Bericht \"Q1\" ü_converted.txt");
        assert!(h.starts_with("attachment; filename=\"Bericht _Q1_ __converted.txt\""));
        assert!(h.ends_with("filename*=UTF-8''Bericht%20%22Q1%22%20%C3%BC_converted.txt"));
    }
}
