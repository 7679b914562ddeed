//! HTTP surface: the analysis page plus a JSON endpoint.
//!
//! | Route | Method | Body | Response |
//! |-------|--------|------|----------|
//! | `/` | GET | | empty page |
//! | `/analyze` | POST | multipart `kind`, `file` | page with results |
//! | `/api/analyze` | POST | multipart `kind`, `file` | JSON [`AnalysisResult`] |
//! | `/health` | GET | | `ok` |
//!
//! Each POST is one Analyze action, handled start to finish inside the
//! request. Upload size is not limited here.

use crate::analyze::Analyzer;
use crate::document::{DocumentKind, UploadedDocument};
use crate::error::AnalyzerError;
use crate::output::AnalysisResult;
use crate::ui::{render_page, PageView};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared across routes. The analyzer is immutable, so no locking.
#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<Analyzer>,
}

/// Build the router.
pub fn router(analyzer: Arc<Analyzer>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze_page))
        .route("/api/analyze", post(analyze_json))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::disable())
        .with_state(AppState { analyzer })
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, analyzer: Arc<Analyzer>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Medical report analyzer listening on http://{}", addr);
    }
    axum::serve(listener, router(analyzer)).await
}

/// Why a POST could not produce an [`AnalysisResult`].
#[derive(Debug, Error)]
enum RequestError {
    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("No file was uploaded. Choose a PDF or image and press Analyze.")]
    MissingFile,

    #[error("{0}")]
    Kind(String),

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
}

impl RequestError {
    fn status(&self) -> StatusCode {
        match self {
            RequestError::Multipart(_) | RequestError::MissingFile | RequestError::Kind(_) => {
                StatusCode::BAD_REQUEST
            }
            RequestError::Analyzer(
                AnalyzerError::UnsupportedFile { .. }
                | AnalyzerError::CorruptPdf { .. }
                | AnalyzerError::ImageDecode { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            RequestError::Analyzer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

async fn index() -> Html<String> {
    Html(render_page(&PageView::default()))
}

async fn analyze_page(State(state): State<AppState>, multipart: Multipart) -> Response {
    let mut selected = None;
    match run(&state, multipart, &mut selected).await {
        Ok(result) => Html(render_page(&PageView {
            result: Some(&result),
            ..Default::default()
        }))
        .into_response(),
        Err(e) => {
            warn!("Analyze request rejected: {}", e);
            let page = render_page(&PageView {
                selected,
                error: Some(e.to_string()),
                ..Default::default()
            });
            (e.status(), Html(page)).into_response()
        }
    }
}

async fn analyze_json(State(state): State<AppState>, multipart: Multipart) -> Response {
    let mut selected = None;
    match run(&state, multipart, &mut selected).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            warn!("Analyze request rejected: {}", e);
            (
                e.status(),
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn run(
    state: &AppState,
    multipart: Multipart,
    selected: &mut Option<DocumentKind>,
) -> Result<AnalysisResult, RequestError> {
    let doc = read_upload(multipart, selected).await?;
    Ok(state.analyzer.analyze(doc).await?)
}

/// Collect the `kind` and `file` fields.
///
/// Without a `kind` field the kind is inferred from the file extension.
async fn read_upload(
    mut multipart: Multipart,
    selected: &mut Option<DocumentKind>,
) -> Result<UploadedDocument, RequestError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RequestError::Multipart(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "kind" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| RequestError::Multipart(e.body_text()))?;
                *selected = Some(raw.parse().map_err(RequestError::Kind)?);
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| RequestError::Multipart(e.body_text()))?;
                if !filename.is_empty() {
                    file = Some((filename, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or(RequestError::MissingFile)?;
    let kind = match *selected {
        Some(kind) => kind,
        None => infer_kind(&filename).ok_or_else(|| {
            RequestError::Kind(format!(
                "Cannot tell whether '{filename}' is a PDF or an image; send a 'kind' field"
            ))
        })?,
    };

    Ok(UploadedDocument::new(bytes, kind, filename))
}

fn infer_kind(filename: &str) -> Option<DocumentKind> {
    [DocumentKind::Pdf, DocumentKind::Image]
        .into_iter()
        .find(|k| k.accepts(filename))
}
