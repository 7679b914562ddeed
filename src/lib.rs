//! # medreport-analyzer
//!
//! Upload a medical report (PDF or image) and get a concise analysis from a
//! hosted Gemini model.
//!
//! The hosted model does the reading. This crate stages the upload in a
//! scoped temporary file, extracts PDF text page by page (pdfium), sends one
//! request with a fixed instruction prompt, and renders the answer, or a
//! readable `"Error: …"` string when the call fails.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (PDF | image)
//!  │
//!  ├─ 1. Input    extension check, scoped temp file (removed on every path)
//!  ├─ 2. Extract  PDF: per-page text joined by "\n"  │  image: decode
//!  ├─ 3. Encode   image → base64 PNG
//!  ├─ 4. Model    one generateContent call, typed failure kinds
//!  └─ 5. Display  preview / extracted text / analysis
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medreport_analyzer::{Analyzer, AnalyzerConfig, DocumentKind, UploadedDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY; fails fast when it is missing.
//!     let config = AnalyzerConfig::from_env()?;
//!     let analyzer = Analyzer::from_config(&config)?;
//!
//!     let bytes = std::fs::read("labs.pdf")?;
//!     let result = analyzer
//!         .analyze(UploadedDocument::new(bytes, DocumentKind::Pdf, "labs.pdf"))
//!         .await?;
//!     println!("{}", result.response);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `medreport` binary (clap + anyhow + dotenvy + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod document;
pub mod error;
pub mod gemini;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod ui;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::Analyzer;
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, API_KEY_ENV, DEFAULT_MODEL};
pub use document::{DocumentKind, UploadedDocument};
pub use error::{AnalyzerError, ModelError};
pub use gemini::GeminiModel;
pub use output::{AnalysisResult, ImagePreview, SourceInfo, NO_RESPONSE_PLACEHOLDER};
pub use pipeline::encode::ImageData;
pub use pipeline::extract::{PageTextSource, PdfiumPageText};
pub use pipeline::llm::{AnalysisRequest, ReportModel};
