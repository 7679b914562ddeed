//! Shared test helpers: a scripted model, image fixtures, a stub Gemini
//! endpoint.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use image::{DynamicImage, Rgb, RgbImage};
use medreport_analyzer::{AnalysisRequest, AnalyzerConfig, ModelError, ReportModel};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("medreport_analyzer=debug"))
        .with_test_writer()
        .try_init();
}

// ── Scripted model ───────────────────────────────────────────────────────

/// A [`ReportModel`] that returns a fixed reply and records every request.
pub struct FakeModel {
    reply: Result<Option<String>, ModelError>,
    pub requests: Mutex<Vec<(String, AnalysisRequest)>>,
}

impl FakeModel {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with(Ok(Some(text.to_string())))
    }

    pub fn silent() -> Arc<Self> {
        Self::with(Ok(None))
    }

    pub fn failing(err: ModelError) -> Arc<Self> {
        Self::with(Err(err))
    }

    fn with(reply: Result<Option<String>, ModelError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<(String, AnalysisRequest)> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ReportModel for FakeModel {
    fn name(&self) -> String {
        "fake".into()
    }

    async fn generate(
        &self,
        prompt: &str,
        request: &AnalysisRequest,
    ) -> Result<Option<String>, ModelError> {
        self.requests
            .lock()
            .unwrap()
            .push((prompt.to_string(), request.clone()));
        self.reply.clone()
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────

pub fn config_in(temp_dir: &std::path::Path) -> AnalyzerConfig {
    AnalyzerConfig::builder()
        .api_key("test-key")
        .temp_dir(temp_dir)
        .build()
        .expect("test config must build")
}

fn sample_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(16, 12, |x, y| {
        Rgb([(x * 15) as u8, (y * 20) as u8, 128])
    }))
}

pub fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    sample_image()
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub fn jpeg_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    sample_image()
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    buf
}

/// Number of entries left in `dir`.
pub fn entries(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

// ── Stub Gemini endpoint ─────────────────────────────────────────────────

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub call: String,
    pub api_key: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

async fn generate_content(
    State(stub): State<StubState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    stub.seen.lock().unwrap().push(SeenRequest {
        call,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
    });
    (stub.status, stub.body.clone())
}

/// Serve a canned `generateContent` reply on an ephemeral port.
///
/// Returns the base URL to configure and the log of received requests.
pub async fn start_gemini_stub(
    status: StatusCode,
    body: &str,
) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        status,
        body: body.to_string(),
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route("/v1beta/models/:call", post(generate_content))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1beta"), seen)
}

/// A successful Gemini reply carrying `text`.
pub fn gemini_reply(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}
