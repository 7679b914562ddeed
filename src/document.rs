//! The uploaded document and its declared kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What the user said they are uploading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A photo or scan of a report.
    Image,
    /// A paginated PDF report.
    Pdf,
}

impl DocumentKind {
    /// File extensions the upload surface accepts for this kind (lowercase, no dot).
    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Image => &["jpg", "jpeg", "png"],
            DocumentKind::Pdf => &["pdf"],
        }
    }

    /// Whether `filename` carries one of [`Self::accepted_extensions`].
    pub fn accepts(self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.accepted_extensions().contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// Suffix used for the scoped temporary file.
    pub fn temp_suffix(self) -> &'static str {
        match self {
            DocumentKind::Image => ".png",
            DocumentKind::Pdf => ".pdf",
        }
    }

    /// Value used in HTML `accept` attributes, e.g. `.jpg,.jpeg,.png`.
    pub fn accept_attr(self) -> String {
        self.accepted_extensions()
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Image => "image",
            DocumentKind::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the form values `pdf` and `image`, ignoring case and surrounding
/// whitespace.
impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(DocumentKind::Image),
            "pdf" => Ok(DocumentKind::Pdf),
            other => Err(format!("unknown document kind '{other}' (expected 'pdf' or 'image')")),
        }
    }
}

/// A file the user submitted for analysis.
///
/// Lives only for one Analyze action.
#[derive(Clone)]
pub struct UploadedDocument {
    pub bytes: Vec<u8>,
    pub kind: DocumentKind,
    pub filename: String,
}

impl UploadedDocument {
    pub fn new(bytes: impl Into<Vec<u8>>, kind: DocumentKind, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            kind,
            filename: filename.into(),
        }
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("filename", &self.filename)
            .field("kind", &self.kind)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}
