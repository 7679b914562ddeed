//! Prompts sent to the hosted model.
//!
//! Callers can override the default via
//! [`crate::config::AnalyzerConfig::prompt`]; the constant here is used only
//! when no override is provided.

/// Default instruction sent with every report.
pub const ANALYSIS_PROMPT: &str =
    "Analyze this medical report concisely. Provide key findings, diagnoses, and recommendations.";

/// Build the single text part sent for a PDF report.
///
/// The extracted text follows the prompt after a blank line. An empty
/// extraction still produces a request; the model then answers from the
/// prompt alone.
pub fn text_request_body(prompt: &str, extracted_text: &str) -> String {
    format!("{prompt}\n\n{extracted_text}")
}
