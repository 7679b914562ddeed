//! Analyze entry points.
//!
//! One call to [`Analyzer::analyze`] is one user-triggered Analyze action:
//!
//! ```text
//! stage ──▶ extract (PDF) / decode (image) ──▶ request ──▶ AnalysisResult
//! ```
//!
//! The scoped temporary file is owned by this function, so it is removed
//! before the result is handed back for display, whichever way the action
//! ends.

use crate::config::AnalyzerConfig;
use crate::document::{DocumentKind, UploadedDocument};
use crate::error::AnalyzerError;
use crate::gemini::GeminiModel;
use crate::output::{sniff_image_mime, AnalysisResult, ImagePreview, SourceInfo};
use crate::pipeline::extract::{PageTextSource, PdfiumPageText};
use crate::pipeline::llm::{run_analysis, AnalysisRequest, ReportModel};
use crate::pipeline::{encode, extract, input};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs Analyze actions against one hosted model.
///
/// Immutable after construction; share it behind an `Arc` across requests.
pub struct Analyzer {
    model: Arc<dyn ReportModel>,
    pdf_text: Arc<dyn PageTextSource>,
    prompt: String,
    temp_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("model", &self.model.name())
            .field("prompt", &self.prompt)
            .field("temp_dir", &self.temp_dir)
            .finish()
    }
}

impl Analyzer {
    /// Build an analyzer backed by Gemini.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let model = GeminiModel::new(config)?;
        Ok(Self::with_model(Arc::new(model), config))
    }

    /// Build an analyzer around any [`ReportModel`], e.g. a test fake.
    pub fn with_model(model: Arc<dyn ReportModel>, config: &AnalyzerConfig) -> Self {
        Self {
            model,
            pdf_text: Arc::new(PdfiumPageText),
            prompt: config.effective_prompt().to_string(),
            temp_dir: config.temp_dir.clone(),
        }
    }

    /// Read PDF page text from `source` instead of pdfium.
    pub fn with_page_text_source(mut self, source: Arc<dyn PageTextSource>) -> Self {
        self.pdf_text = source;
        self
    }

    pub fn model_name(&self) -> String {
        self.model.name()
    }

    /// Run one Analyze action.
    ///
    /// # Errors
    /// Returns `Err(AnalyzerError)` only when the upload cannot be processed
    /// at all: wrong extension, temp-file I/O, a PDF that cannot be opened,
    /// an image that cannot be decoded. Model failures are not errors here;
    /// they arrive as `"Error: …"` in [`AnalysisResult::response`].
    pub async fn analyze(&self, doc: UploadedDocument) -> Result<AnalysisResult, AnalyzerError> {
        let start = Instant::now();
        info!(
            "Analyzing {} upload '{}' ({} bytes)",
            doc.kind,
            doc.filename,
            doc.bytes.len()
        );

        // ── Step 1: Stage upload ─────────────────────────────────────────
        let staged = input::stage_upload(&doc, self.temp_dir.as_deref())?;

        // ── Step 2: Extract content ──────────────────────────────────────
        let (request, extracted_text, image_preview) = match doc.kind {
            DocumentKind::Pdf => {
                let text =
                    extract::extract_pdf_text(Arc::clone(&self.pdf_text), staged.path()).await?;
                debug!("Extracted {} chars of text", text.len());
                (AnalysisRequest::Text { text: text.clone() }, Some(text), None)
            }
            DocumentKind::Image => {
                let bytes = staged.read_back()?;
                let img = extract::decode_image(&bytes, &doc.filename)?;
                let image = encode::encode_png(&img).map_err(|e| AnalyzerError::ImageDecode {
                    filename: doc.filename.clone(),
                    detail: format!("PNG encoding failed: {e}"),
                })?;
                let preview = ImagePreview {
                    mime_type: sniff_image_mime(&bytes).to_string(),
                    bytes,
                };
                (AnalysisRequest::Image { image }, None, Some(preview))
            }
        };

        // ── Step 3: Request analysis ─────────────────────────────────────
        let outcome = run_analysis(self.model.as_ref(), &self.prompt, &request).await;

        // ── Step 4: Clean up before display ──────────────────────────────
        drop(staged);

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Analysis of '{}' finished in {}ms ({})",
            doc.filename,
            duration_ms,
            if outcome.error.is_none() { "ok" } else { "model error" }
        );

        Ok(AnalysisResult {
            source: SourceInfo {
                filename: doc.filename,
                kind: doc.kind,
                size_bytes: doc.bytes.len(),
            },
            extracted_text,
            image_preview,
            response: outcome.response,
            error: outcome.error,
            duration_ms,
        })
    }

    /// Synchronous wrapper around [`Analyzer::analyze`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from inside
    /// an async context.
    pub fn analyze_blocking(&self, doc: UploadedDocument) -> Result<AnalysisResult, AnalyzerError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| AnalyzerError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.analyze(doc))
    }
}
