//! Content extraction: page text from PDFs, decoded pixels from images.
//!
//! ## PDFs
//!
//! Every page contributes exactly one segment, in page order, and segments
//! are joined with `"\n"`. A page whose text layer cannot be read (scanned
//! pages, broken content streams) contributes an empty segment instead of
//! failing the document, so a 2-page PDF whose second page is a scan yields
//! `"page one text\n"`. Only a document that cannot be opened at all is an
//! error.
//!
//! pdfium is not async-safe; the work runs inside `spawn_blocking`. One
//! pdfium instance is shared by the whole process (see [`shared_pdfium`]).
//! Page text is read through [`PageTextSource`], so the join rules can be
//! exercised without the native library.

use crate::error::AnalyzerError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, info, warn};

/// Directory (or full library path) of a pdfium build to bind to.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Join per-page text, substituting `""` for pages without text.
///
/// N input pages always produce N segments separated by N-1 newlines.
pub fn join_page_texts<I>(pages: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    pages
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bind to a pdfium library.
///
/// Order: `PDFIUM_LIB_PATH` when set; otherwise a library next to the
/// working directory, then the system library.
fn bind_pdfium() -> Result<Pdfium, AnalyzerError> {
    let bindings = match std::env::var_os(PDFIUM_LIB_PATH_ENV) {
        Some(raw) => {
            let path = PathBuf::from(raw);
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            Pdfium::bind_to_library(&lib)
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| AnalyzerError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

static PDFIUM: OnceLock<Pdfium> = OnceLock::new();
static PDFIUM_INIT: Mutex<()> = Mutex::new(());

/// The process-wide pdfium instance, bound on first use.
///
/// Dropping a `Pdfium` destroys the library for every user in the process,
/// so exactly one instance is created and it lives until exit. A failed
/// bind is not cached; the next call retries.
pub fn shared_pdfium() -> Result<&'static Pdfium, AnalyzerError> {
    if let Some(pdfium) = PDFIUM.get() {
        return Ok(pdfium);
    }
    let _init = PDFIUM_INIT.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(pdfium) = PDFIUM.get() {
        return Ok(pdfium);
    }
    let pdfium = bind_pdfium()?;
    info!("pdfium bound");
    Ok(PDFIUM.get_or_init(|| pdfium))
}

/// Where per-page PDF text comes from.
///
/// One entry per page, in page order; `None` for a page whose text could
/// not be read. `Err` only when the document cannot be opened at all.
pub trait PageTextSource: Send + Sync {
    fn page_texts(&self, pdf_path: &Path) -> Result<Vec<Option<String>>, AnalyzerError>;
}

/// [`PageTextSource`] backed by the shared pdfium instance.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumPageText;

impl PageTextSource for PdfiumPageText {
    fn page_texts(&self, pdf_path: &Path) -> Result<Vec<Option<String>>, AnalyzerError> {
        let pdfium = shared_pdfium()?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| AnalyzerError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

        let pages = document.pages();
        let total_pages = pages.len();
        info!("PDF loaded: {} pages", total_pages);

        Ok(collect_page_texts(total_pages, |idx| {
            pages
                .get(idx)
                .map(|page| page_text(idx as usize + 1, &page))
        }))
    }
}

/// Read `count` pages by index.
///
/// A page that fails to load yields `None` and the loop carries on, so the
/// output always has `count` entries.
fn collect_page_texts<E, F>(count: u16, mut load: F) -> Vec<Option<String>>
where
    E: std::fmt::Debug,
    F: FnMut(u16) -> Result<Option<String>, E>,
{
    (0..count)
        .map(|idx| match load(idx) {
            Ok(text) => text,
            Err(e) => {
                warn!("Page {}: failed to load — {:?}", idx + 1, e);
                None
            }
        })
        .collect()
}

/// Extract the text of every page of the PDF at `pdf_path`.
pub async fn extract_pdf_text(
    source: Arc<dyn PageTextSource>,
    pdf_path: &Path,
) -> Result<String, AnalyzerError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_pdf_text_blocking(source.as_ref(), &path))
        .await
        .map_err(|e| AnalyzerError::Internal(format!("Extraction task panicked: {e}")))?
}

/// Blocking implementation of [`extract_pdf_text`].
pub fn extract_pdf_text_blocking(
    source: &dyn PageTextSource,
    pdf_path: &Path,
) -> Result<String, AnalyzerError> {
    Ok(join_page_texts(source.page_texts(pdf_path)?))
}

/// Text of one page, or `None` when pdfium cannot read its text layer.
fn page_text(page_num: usize, page: &PdfPage) -> Option<String> {
    match page.text() {
        Ok(text) => {
            let all = text.all().replace("\r\n", "\n");
            if all.is_empty() {
                debug!("Page {}: no extractable text", page_num);
            }
            Some(all)
        }
        Err(e) => {
            warn!("Page {}: text extraction failed — {:?}", page_num, e);
            None
        }
    }
}

/// Decode an uploaded PNG or JPEG.
pub fn decode_image(bytes: &[u8], filename: &str) -> Result<DynamicImage, AnalyzerError> {
    let img = image::load_from_memory(bytes).map_err(|e| AnalyzerError::ImageDecode {
        filename: filename.to_string(),
        detail: e.to_string(),
    })?;
    debug!("Decoded '{}' → {}x{} px", filename, img.width(), img.height());
    Ok(img)
}
