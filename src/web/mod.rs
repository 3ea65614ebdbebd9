//! HTTP upload/render surface.
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET  | `/` | upload page, waiting state |
//! | POST | `/convert` | multipart `files` → results page |
//! | POST | `/api/convert` | multipart `files` → JSON |
//! | GET  | `/download/:session/:job/:format` | `md` or `txt` attachment |
//! | GET  | `/health` | liveness |

mod handlers;
pub mod page;
pub mod types;

pub use handlers::ApiError;

use crate::config::{ConverterConfig, ServerConfig};
use crate::converter::DocumentConverter;
use crate::job::JobId;
use crate::output::ExportFormat;
use crate::session::SessionStore;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<dyn DocumentConverter>,
    pub config: Arc<ConverterConfig>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(
        converter: Arc<dyn DocumentConverter>,
        config: ConverterConfig,
        server: &ServerConfig,
    ) -> Self {
        Self {
            converter,
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new(server.session_capacity)),
        }
    }
}

/// URL of one job's download in `format`.
pub fn download_path(session: Uuid, job: JobId, format: ExportFormat) -> String {
    format!("/download/{session}/{job}/{}", format.token())
}

pub fn router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/convert", post(handlers::upload))
        .route("/api/convert", post(handlers::api_convert))
        .route(
            "/download/:session/:job/:format",
            get(handlers::download),
        )
        // Multipart's own 2 MB default is replaced by the request cap.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `server.bind` and serve until Ctrl-C.
pub async fn serve(state: AppState, server: &ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(server.bind).await?;
    serve_on(listener, state, server).await
}

/// Serve on an already-bound listener until Ctrl-C.
pub async fn serve_on(
    listener: TcpListener,
    state: AppState,
    server: &ServerConfig,
) -> std::io::Result<()> {
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state, server))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        // Without a signal handler, run until the process is killed.
        Err(_) => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_path_shape() {
        let id = Uuid::nil();
        assert_eq!(
            download_path(id, JobId(3), ExportFormat::PlainText),
            "/download/00000000-0000-0000-0000-000000000000/3/txt"
        );
    }
}
