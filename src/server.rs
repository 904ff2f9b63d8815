//! HTTP service.
//!
//! Exposes source ingestion and chat as a JSON API for browser clients.
//! The service is stateless: clients hold their sources and history and
//! send them back on every chat turn.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` | One chat turn over the supplied sources and history |
//! | `POST` | `/sources/files` | Multipart upload (field `files`, first 10 used) |
//! | `POST` | `/sources/github` | Digest a GitHub repository (`{"url": ...}`) |
//! | `POST` | `/sources/url` | Digest a web page (`{"url": ...}`) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Every error response is `{ "error": "<message>" }`:
//! `400` for invalid input, `413` for an upload over
//! `[server].max_upload_bytes`, `500` for upstream or provider failures.
//! Provider failures never expose provider details.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser front end
//! can be served from a different origin.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::chat::{run_turn, ChatReply, ChatRequest};
use crate::config::Config;
use crate::error::{Error, ErrorKind};
use crate::github::GitHubClient;
use crate::ingest::{ingest_files, ingest_page, ingest_repository, UploadedFile};
use crate::llm::{create_provider, CompletionProvider};
use crate::models::{Source, SourceDetails};
use crate::web::{domain_of, validate_url, PageFetcher};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    github: GitHubClient,
    pages: PageFetcher,
    provider: Arc<dyn CompletionProvider>,
}

/// Starts the HTTP service with the provider named in `[llm]`.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let provider = create_provider(&config.llm)?;
    run_server_with_provider(config, provider).await
}

/// Starts the HTTP service with an explicit completion provider.
///
/// Useful for embedding the service with a custom backend.
pub async fn run_server_with_provider(
    config: &Config,
    provider: Arc<dyn CompletionProvider>,
) -> anyhow::Result<()> {
    let app = build_router(config, provider)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(
        "layman listening on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router without binding a socket.
pub fn build_router(
    config: &Config,
    provider: Arc<dyn CompletionProvider>,
) -> anyhow::Result<Router> {
    let state = AppState {
        config: Arc::new(config.clone()),
        github: GitHubClient::new(&config.fetch)?,
        pages: PageFetcher::new(&config.fetch)?,
        provider,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/chat", post(handle_chat))
        .route("/sources/files", post(handle_files))
        .route("/sources/github", post(handle_github))
        .route("/sources/url", post(handle_url))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.into(),
    }
}

/// Map a multipart read failure; exceeding `[server].max_upload_bytes` is a 413.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %err, "upload exceeds body limit");
        return AppError {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "Upload exceeds the size limit".to_string(),
        };
    }
    bad_request(format!("Failed to process files: {}", err.body_text()))
}

/// Map a pipeline error onto a response. Upstream messages are wrapped in
/// `context`; provider errors get a generic message.
fn classify_error(context: &str, err: Error) -> AppError {
    match err.kind() {
        ErrorKind::InvalidInput => bad_request(err.to_string()),
        ErrorKind::UpstreamUnavailable => {
            error!(error = %err, "{}", context);
            internal(format!("{}: {}", context, err))
        }
        ErrorKind::ProviderFailure => internal("Failed to process chat request"),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /chat ============

/// Handler for `POST /chat`.
///
/// Returns `400` for a malformed body or blank message and `500` when the
/// completion provider fails.
async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;

    let reply = run_turn(
        state.provider.as_ref(),
        &req.message,
        &req.conversation_history,
        &req.sources,
        state.config.llm.history_window,
    )
    .await
    .map_err(|e| classify_error("Failed to process chat request", e))?;

    Ok(Json(reply))
}

// ============ POST /sources/files ============

#[derive(Serialize)]
struct FilesResponse {
    sources: Vec<Source>,
    message: String,
}

/// Handler for `POST /sources/files`.
///
/// Reads every multipart field named `files`. Unreadable files are logged
/// and left out of the response.
async fn handle_files(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FilesResponse>, AppError> {
    let mut multipart = multipart.map_err(|_| bad_request(Error::NoFiles.to_string()))?;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("files") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            // An empty file input still submits one nameless, empty part.
            Ok(bytes) if name.is_empty() && bytes.is_empty() => {}
            Ok(bytes) => files.push(UploadedFile {
                name,
                bytes: bytes.to_vec(),
            }),
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(multipart_error(e));
            }
            Err(e) => warn!(file = %name, error = %e, "failed to read uploaded file"),
        }
    }

    let sources = ingest_files(&files).map_err(|e| classify_error("Failed to process files", e))?;
    info!(received = files.len(), processed = sources.len(), "processed uploads");

    Ok(Json(FilesResponse {
        message: format!("Successfully processed {} file(s)", sources.len()),
        sources,
    }))
}

// ============ POST /sources/github and /sources/url ============

#[derive(Deserialize)]
struct UrlRequest {
    #[serde(default)]
    url: String,
}

#[derive(Serialize)]
struct SourceResponse {
    source: Source,
    message: String,
}

/// Handler for `POST /sources/github`.
async fn handle_github(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<SourceResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;

    let source = ingest_repository(&state.github, req.url.trim())
        .await
        .map_err(|e| classify_error("Failed to fetch GitHub repository", e))?;

    let file_count = match &source.details {
        SourceDetails::Repository { files, .. } => files.len(),
        _ => 0,
    };

    Ok(Json(SourceResponse {
        message: format!(
            "Successfully loaded {} files from {}",
            file_count, source.name
        ),
        source,
    }))
}

/// Handler for `POST /sources/url`.
async fn handle_url(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<SourceResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;
    let url = req.url.trim();

    let domain = validate_url(url)
        .map(|u| domain_of(&u))
        .map_err(|e| classify_error("Failed to fetch URL content", e))?;

    let source = ingest_page(&state.pages, url)
        .await
        .map_err(|e| classify_error("Failed to fetch URL content", e))?;

    Ok(Json(SourceResponse {
        message: format!("Successfully loaded content from {}", domain),
        source,
    }))
}
