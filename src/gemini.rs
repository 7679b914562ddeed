//! Gemini `generateContent` client.
//!
//! One POST per analysis, no retries. HTTP failures are classified into
//! [`ModelError`] kinds from the status code, with one Gemini quirk: an
//! invalid key is reported as `400 INVALID_ARGUMENT` with reason
//! `API_KEY_INVALID`, which is classified as [`ModelError::Auth`].

use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, ModelError};
use crate::pipeline::llm::{AnalysisRequest, ReportModel};
use crate::prompts::text_request_body;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Gemini-backed [`ReportModel`].
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    timeout_secs: u64,
}

impl std::fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModel")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiModel {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| AnalyzerError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            timeout_secs: config.api_timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_body(&self, prompt: &str, request: &AnalysisRequest) -> GenerateRequest {
        let parts = match request {
            AnalysisRequest::Image { image } => vec![
                Part::Text {
                    text: prompt.to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.data.clone(),
                    },
                },
            ],
            AnalysisRequest::Text { text } => vec![Part::Text {
                text: text_request_body(prompt, text),
            }],
        };

        let generation_config = (self.temperature.is_some() || self.max_output_tokens.is_some())
            .then(|| GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            });

        GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config,
        }
    }
}

// ── Wire format ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if any.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Map a non-success HTTP status and its body to a [`ModelError`] kind.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> ModelError {
    let detail = error_detail(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::Auth {
            status: status.as_u16(),
            detail,
        },
        StatusCode::BAD_REQUEST if body.contains("API_KEY_INVALID") || body.contains("API key not valid") => {
            ModelError::Auth {
                status: status.as_u16(),
                detail,
            }
        }
        StatusCode::TOO_MANY_REQUESTS => ModelError::Quota { detail },
        _ => ModelError::Api {
            status: status.as_u16(),
            detail,
        },
    }
}

/// Pull `error.message` out of a Google API error body, else the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl ReportModel for GeminiModel {
    fn name(&self) -> String {
        format!("gemini:{}", self.model)
    }

    async fn generate(
        &self,
        prompt: &str,
        request: &AnalysisRequest,
    ) -> Result<Option<String>, ModelError> {
        let body = self.build_body(prompt, request);
        debug!(model = %self.model, kind = request.kind_label(), "Sending request to Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Network {
                detail: if e.is_timeout() {
                    format!("request timed out after {}s", self.timeout_secs)
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &error_body));
        }

        let raw = response.text().await.map_err(|e| ModelError::Network {
            detail: e.to_string(),
        })?;
        let parsed: GenerateResponse =
            serde_json::from_str(&raw).map_err(|e| ModelError::MalformedResponse {
                detail: e.to_string(),
            })?;

        Ok(parsed.text())
    }
}
