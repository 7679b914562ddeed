//! Hosted-model interaction: build the request and call the model.
//!
//! The request payload is a tagged variant ([`AnalysisRequest`]) dispatched
//! explicitly by the model implementation. [`run_analysis`] is the request
//! boundary: whatever the model does, the caller gets a displayable string
//! back and, on failure, the typed [`ModelError`] next to it.

use crate::error::ModelError;
use crate::output::NO_RESPONSE_PLACEHOLDER;
use crate::pipeline::encode::ImageData;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, warn};

/// The two payload shapes sent alongside the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    /// Prompt plus an inline image.
    Image { image: ImageData },
    /// Prompt followed by extracted report text (may be empty).
    Text { text: String },
}

impl AnalysisRequest {
    pub fn kind_label(&self) -> &'static str {
        match self {
            AnalysisRequest::Image { .. } => "image",
            AnalysisRequest::Text { .. } => "text",
        }
    }
}

/// A hosted generative model.
///
/// `Ok(None)` means the call succeeded but the reply carried no text.
#[async_trait]
pub trait ReportModel: Send + Sync {
    /// Short identifier for logs, e.g. `gemini:gemini-2.0-flash`.
    fn name(&self) -> String;

    async fn generate(
        &self,
        prompt: &str,
        request: &AnalysisRequest,
    ) -> Result<Option<String>, ModelError>;
}

/// What the request boundary hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    /// Model text, the no-response placeholder, or `"Error: …"`.
    pub response: String,
    pub error: Option<ModelError>,
}

/// Send one request and convert every outcome into a displayable string.
///
/// Never returns an error and never retries.
pub async fn run_analysis(
    model: &dyn ReportModel,
    prompt: &str,
    request: &AnalysisRequest,
) -> AnalysisOutcome {
    let start = Instant::now();
    let result = model.generate(prompt, request).await;
    let elapsed = start.elapsed();

    match result {
        Ok(Some(text)) => {
            debug!(
                "{}: {} request answered with {} chars in {:?}",
                model.name(),
                request.kind_label(),
                text.len(),
                elapsed
            );
            AnalysisOutcome {
                response: text,
                error: None,
            }
        }
        Ok(None) => {
            warn!("{}: reply carried no text payload", model.name());
            AnalysisOutcome {
                response: NO_RESPONSE_PLACEHOLDER.to_string(),
                error: None,
            }
        }
        Err(e) => {
            warn!("{}: {} request failed — {}", model.name(), request.kind_label(), e);
            AnalysisOutcome {
                response: e.user_message(),
                error: Some(e),
            }
        }
    }
}
