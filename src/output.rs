//! Output types returned by [`crate::analyze::Analyzer::analyze`].

use crate::document::DocumentKind;
use crate::error::ModelError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Shown when the hosted call succeeds but carries no text.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response received.";

/// What was analysed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub filename: String,
    pub kind: DocumentKind,
    pub size_bytes: usize,
}

/// The uploaded image as read back from its scoped temporary file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePreview {
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ImagePreview {
    /// `data:` URI suitable for an `<img src>` attribute.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

impl std::fmt::Debug for ImagePreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePreview")
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Result of one Analyze action. Displayed once, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub source: SourceInfo,

    /// Newline-joined page text. `None` for images.
    pub extracted_text: Option<String>,

    /// Image preview. `None` for PDFs.
    #[serde(skip)]
    pub image_preview: Option<ImagePreview>,

    /// The string to display: model text, [`NO_RESPONSE_PLACEHOLDER`] or
    /// `"Error: …"`.
    pub response: String,

    /// Typed failure when the model call failed.
    pub error: Option<ModelError>,

    /// Wall-clock time of the whole action in milliseconds.
    pub duration_ms: u64,
}

impl AnalysisResult {
    /// Whether the model produced a usable answer.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Guess the MIME type of an uploaded image from its magic bytes.
pub(crate) fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}
