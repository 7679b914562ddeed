//! HTML rendering of the single analysis page.
//!
//! Output regions appear in a fixed order: image preview (images only),
//! extracted text (PDFs only), then the analysis or error string. All
//! dynamic text goes through [`escape_html`].

use crate::document::DocumentKind;
use crate::output::AnalysisResult;
use std::fmt::Write as _;

/// Everything the page needs to render one state.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    /// Kind pre-selected in the radio group.
    pub selected: Option<DocumentKind>,
    pub result: Option<&'a AnalysisResult>,
    /// Fatal interaction error (unsupported file, unreadable PDF, …).
    pub error: Option<String>,
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #fff; color: #222; }
main { max-width: 960px; margin: 0 auto; padding: 24px; }
.header { font-size: 32px; font-weight: bold; color: #4CAF50; text-align: center; margin-bottom: 20px; }
button { background-color: #4CAF50; color: white; font-size: 16px; padding: 10px 20px; border: 0; border-radius: 8px; cursor: pointer; }
textarea { width: 100%; height: 300px; background-color: #f4f4f4; font-size: 14px; }
.image-preview { max-width: 100%; border-radius: 12px; box-shadow: 2px 2px 15px rgba(0,0,0,0.2); }
.result { background: #e8f5e9; border-left: 4px solid #4CAF50; padding: 12px 16px; white-space: pre-wrap; }
.error { background: #fdecea; border-left: 4px solid #e53935; padding: 12px 16px; white-space: pre-wrap; }
fieldset { border: 0; padding: 0; margin: 0 0 12px 0; }
"#;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the full page.
pub fn render_page(view: &PageView<'_>) -> String {
    let selected = view
        .result
        .map(|r| r.source.kind)
        .or(view.selected)
        .unwrap_or(DocumentKind::Pdf);

    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Medical Report Analyzer</title>\n");
    let _ = writeln!(html, "<style>{}</style>", STYLE);
    html.push_str("</head>\n<body>\n<main>\n");
    html.push_str("<div class=\"header\">AI Medical Report Analysis</div>\n");
    html.push_str("<p>Upload a <strong>medical report (Image or PDF)</strong> for AI-powered analysis.</p>\n");

    render_form(&mut html, selected);

    if let Some(err) = &view.error {
        let _ = writeln!(html, "<div class=\"error\" id=\"error\">{}</div>", escape_html(err));
    }

    if let Some(result) = view.result {
        render_result(&mut html, result);
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, selected: DocumentKind) {
    html.push_str(
        "<form method=\"post\" action=\"/analyze\" enctype=\"multipart/form-data\">\n<fieldset>\n<legend>Select file type:</legend>\n",
    );
    for (kind, label) in [(DocumentKind::Pdf, "PDF"), (DocumentKind::Image, "Image")] {
        let checked = if kind == selected { " checked" } else { "" };
        let _ = writeln!(
            html,
            "<label><input type=\"radio\" name=\"kind\" value=\"{}\" data-accept=\"{}\"{checked}> {label}</label>",
            kind.as_str(),
            kind.accept_attr(),
        );
    }
    html.push_str("</fieldset>\n");
    let _ = writeln!(
        html,
        "<input type=\"file\" name=\"file\" id=\"file\" accept=\"{}\" required>",
        selected.accept_attr()
    );
    html.push_str("<button type=\"submit\">Analyze</button>\n</form>\n");
    // Keep the picker's accept list in step with the selected kind.
    html.push_str(
        "<script>document.querySelectorAll('input[name=kind]').forEach(function(r){r.addEventListener('change',function(){document.getElementById('file').accept=r.dataset.accept;});});</script>\n",
    );
}

fn render_result(html: &mut String, result: &AnalysisResult) {
    if let Some(preview) = &result.image_preview {
        let _ = writeln!(
            html,
            "<h3>Uploaded Medical Report</h3>\n<img class=\"image-preview\" id=\"preview\" alt=\"{}\" src=\"{}\">",
            escape_html(&result.source.filename),
            preview.data_uri()
        );
    }

    if let Some(text) = &result.extracted_text {
        let _ = writeln!(
            html,
            "<h3>Extracted Text from PDF:</h3>\n<textarea id=\"extracted\" readonly>{}</textarea>",
            escape_html(text)
        );
    }

    let class = if result.is_success() { "result" } else { "error" };
    let _ = writeln!(
        html,
        "<h3>AI Analysis Results:</h3>\n<div class=\"{class}\" id=\"analysis\">{}</div>",
        escape_html(&result.response)
    );
}
