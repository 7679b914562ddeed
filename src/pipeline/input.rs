//! Input staging: persist an upload to a scoped temporary file.
//!
//! pdfium opens documents from a path, so every upload is written to a
//! `NamedTempFile` first. The file lives exactly as long as the returned
//! [`ScopedUpload`]; dropping it removes the file, which covers success,
//! extraction failure, model failure and unwinding alike.

use crate::document::UploadedDocument;
use crate::error::AnalyzerError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// An upload written to disk for the duration of one analysis.
#[derive(Debug)]
pub struct ScopedUpload {
    file: NamedTempFile,
}

impl ScopedUpload {
    /// Path of the temporary file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the staged bytes back from disk.
    pub fn read_back(&self) -> Result<Vec<u8>, AnalyzerError> {
        std::fs::read(self.file.path()).map_err(|source| AnalyzerError::TempFile { source })
    }
}

/// Validate the extension against the declared kind and write the bytes to a
/// fresh temporary file in `temp_dir` (or the OS temp dir).
pub fn stage_upload(
    doc: &UploadedDocument,
    temp_dir: Option<&Path>,
) -> Result<ScopedUpload, AnalyzerError> {
    if !doc.kind.accepts(&doc.filename) {
        return Err(AnalyzerError::UnsupportedFile {
            filename: doc.filename.clone(),
            kind: doc.kind.to_string(),
            accepted: doc.kind.accepted_extensions().join(", "),
        });
    }

    let mut builder = tempfile::Builder::new();
    builder.prefix("medreport-").suffix(doc.kind.temp_suffix());
    let created = match temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    };
    let mut file = created.map_err(|source| AnalyzerError::TempFile { source })?;

    file.write_all(&doc.bytes)
        .and_then(|_| file.flush())
        .map_err(|source| AnalyzerError::TempFile { source })?;

    debug!(
        "Staged '{}' ({} bytes) at {}",
        doc.filename,
        doc.bytes.len(),
        file.path().display()
    );

    Ok(ScopedUpload { file })
}
