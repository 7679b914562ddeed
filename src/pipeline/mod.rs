//! Pipeline stages for one Analyze action.
//!
//! Each submodule implements exactly one step, so each is testable without
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ encode ──▶ llm
//! (temp file) (pdfium / image) (base64 PNG) (hosted model)
//! ```
//!
//! 1. [`input`]   — validate the extension and stage the upload in a scoped
//!    temporary file
//! 2. [`extract`] — newline-joined page text for PDFs (in `spawn_blocking`),
//!    decoded pixels for images
//! 3. [`encode`]  — PNG-encode and base64-wrap images for the request body
//! 4. [`llm`]     — build the tagged request, call the model, turn every
//!    outcome into a displayable string

pub mod encode;
pub mod extract;
pub mod input;
pub mod llm;
