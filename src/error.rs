//! Error types for the medreport-analyzer library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AnalyzerError`] — **Fatal**: startup or the current interaction cannot
//!   proceed (missing API key, unsupported file, PDF that cannot be opened).
//!   Returned as `Err(AnalyzerError)` from configuration and
//!   [`crate::analyze::Analyzer::analyze`].
//!
//! * [`ModelError`] — **Non-fatal**: the hosted model call failed. It never
//!   escapes the request boundary; it is rendered as `"Error: …"` and kept in
//!   [`crate::output::AnalysisResult::error`] so callers and tests can tell
//!   an expired key from a quota problem.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the medreport-analyzer library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// The API key environment variable is unset or empty.
    #[error("API key not found: set {var} in the environment or in a .env file")]
    MissingApiKey { var: &'static str },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// The file extension does not match the selected document kind.
    #[error("Unsupported file '{filename}' for {kind} upload (accepted: {accepted})")]
    UnsupportedFile {
        filename: String,
        kind: String,
        accepted: String,
    },

    /// The scoped temporary file could not be created, written or read.
    #[error("Temporary file error: {source}")]
    TempFile {
        #[source]
        source: std::io::Error,
    },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The PDF could not be opened at all.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium, or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    /// The uploaded image could not be decoded as PNG or JPEG.
    #[error("Image '{filename}' could not be decoded: {detail}")]
    ImageDecode { filename: String, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed call to the hosted model.
///
/// The kinds are what a caller can act on; the `detail` strings carry the
/// provider's own message for display.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelError {
    /// The endpoint could not be reached or did not answer in time.
    #[error("network error: {detail}")]
    Network { detail: String },

    /// The key was rejected (401/403, or 400 with an invalid-key reason).
    #[error("authentication failed (HTTP {status}): {detail}")]
    Auth { status: u16, detail: String },

    /// HTTP 429: rate limit or quota exhausted.
    #[error("quota exceeded: {detail}")]
    Quota { detail: String },

    /// The endpoint answered 2xx but the body was not the expected shape.
    #[error("malformed response: {detail}")]
    MalformedResponse { detail: String },

    /// Any other non-success status.
    #[error("API error (HTTP {status}): {detail}")]
    Api { status: u16, detail: String },
}

impl ModelError {
    /// The string shown to the user in place of an analysis.
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }
}
