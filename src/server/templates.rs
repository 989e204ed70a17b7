//! HTML templates for the upload page.

use crate::ocr::{EngineMode, Language, OcrOptions, ProbeReport, SegmentationMode};
use crate::pipeline::ImageFormat;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 { margin-bottom: 0.25rem; }
.subtitle { color: #666; margin-top: 0; }
details { border: 1px solid #ddd; border-radius: 6px; padding: 0.5rem 1rem; margin: 1rem 0; }
summary { cursor: pointer; font-weight: 600; }
label { display: block; margin: 0.5rem 0 0.25rem; }
select, input[type=file] { width: 100%; }
button, .download { display: inline-block; margin: 0.75rem 0.5rem 0 0; padding: 0.5rem 1rem; border-radius: 6px; border: none; background: #2563eb; color: #fff; text-decoration: none; cursor: pointer; }
textarea { width: 100%; height: 400px; font-family: ui-monospace, monospace; }
.ok { color: #15803d; }
.warning { background: #fef9c3; padding: 0.75rem 1rem; border-radius: 6px; }
.error { background: #fee2e2; padding: 0.75rem 1rem; border-radius: 6px; }
pre { white-space: pre-wrap; }
footer { margin-top: 2rem; border-top: 1px solid #ddd; color: #666; padding-top: 0.5rem; }
"#;

/// Escape HTML special characters for safe rendering.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Base page layout.
pub fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Image Text Extractor</title>
    <style>{STYLE}</style>
</head>
<body>
    <h1><a href="/" style="color:inherit;text-decoration:none">Image Text Extractor</a></h1>
    <p class="subtitle">Upload an image to extract text and download as Word document</p>
    {content}
    <footer>Powered by Tesseract OCR</footer>
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Engine status panel, open when something is wrong.
pub fn status_panel(report: &ProbeReport) -> String {
    let version = match &report.version_output {
        Ok(out) => format!("<pre>{}</pre>", html_escape(out.trim())),
        Err(e) => format!(r#"<p class="error">{}</p>"#, html_escape(e)),
    };
    let resolved = report
        .resolved_path
        .as_ref()
        .map(|p| html_escape(&p.display().to_string()))
        .unwrap_or_else(|| "not found on PATH".to_string());
    let missing = report.missing_languages();
    let languages = if missing.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = missing.iter().map(|l| l.display_name()).collect();
        format!(
            r#"<p class="warning">Language packs not installed: {}</p>"#,
            names.join(", ")
        )
    };
    let hint = if report.status.is_ready() {
        String::new()
    } else {
        format!(
            r#"<p class="error">Tesseract OCR is not installed or not properly configured. {}</p>"#,
            html_escape(report.install_hint())
        )
    };

    format!(
        r#"<details{open}>
    <summary>Tesseract Status</summary>
    <p class="{class}">{summary}</p>
    {hint}
    <p><strong>Configured command:</strong> <code>{command}</code> ({resolved})</p>
    <p><strong>Operating system:</strong> {os} ({arch})</p>
    {version}
    {languages}
</details>"#,
        open = if report.status.is_ready() { "" } else { " open" },
        class = if report.status.is_ready() { "ok" } else { "error" },
        summary = html_escape(&report.status.summary()),
        command = html_escape(&report.command),
        os = report.os,
        arch = report.arch,
    )
}

fn select(name: &str, options: impl Iterator<Item = (String, String, bool)>) -> String {
    let mut html = format!(r#"<select name="{}" id="{}">"#, name, name);
    for (value, label, selected) in options {
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            html_escape(&value),
            if selected { " selected" } else { "" },
            html_escape(&label)
        ));
    }
    html.push_str("</select>");
    html
}

/// Upload form with the OCR settings preselected.
pub fn upload_form(defaults: &OcrOptions, sanitize: bool) -> String {
    let psm = select(
        "psm",
        SegmentationMode::ALL.iter().map(|m| {
            (
                m.code().to_string(),
                format!("{} - {}", m.code(), m.description()),
                *m == defaults.segmentation_mode,
            )
        }),
    );
    let oem = select(
        "oem",
        EngineMode::ALL.iter().map(|m| {
            (
                m.code().to_string(),
                format!("{} - {}", m.code(), m.description()),
                *m == defaults.engine_mode,
            )
        }),
    );
    let lang = select(
        "lang",
        Language::ALL.iter().map(|l| {
            (
                l.code().to_string(),
                l.display_name().to_string(),
                *l == defaults.language,
            )
        }),
    );
    let accept: Vec<String> = ImageFormat::EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect();

    format!(
        r#"<form action="/extract" method="post" enctype="multipart/form-data">
    <label for="image">Choose an image file</label>
    <input type="file" name="image" id="image" accept="{accept}" required>
    <details>
        <summary>OCR Settings</summary>
        <label for="psm">Page Segmentation Mode</label>
        {psm}
        <label for="oem">OCR Engine Mode</label>
        {oem}
        <label for="lang">Language</label>
        {lang}
        <label><input type="checkbox" name="raw" value="1"{raw}> Keep raw engine output (skip cleanup)</label>
    </details>
    <button type="submit">Extract text</button>
</form>"#,
        accept = accept.join(","),
        raw = if sanitize { "" } else { " checked" },
    )
}

/// Help section shown under the form.
pub fn usage_help() -> &'static str {
    r#"<details>
    <summary>How to Use This App</summary>
    <ol>
        <li><strong>Upload an image</strong> containing text</li>
        <li><strong>View the extracted text</strong></li>
        <li><strong>Download</strong> as Word or Text file</li>
    </ol>
    <p>Tips for better results: use clear, high-resolution images with good contrast
    between text and background, and adjust the OCR settings if needed.</p>
</details>"#
}

pub fn index_page(defaults: &OcrOptions, sanitize: bool, report: Option<&ProbeReport>) -> String {
    let content = format!(
        "{}\n{}\n{}",
        report.map(status_panel).unwrap_or_default(),
        upload_form(defaults, sanitize),
        usage_help()
    );
    base_template("Upload", &content)
}

/// Page showing recognized text and the download links.
pub fn text_page(filename: &str, text: &str, key: &str, options: &OcrOptions) -> String {
    let key = html_escape(key);
    let content = format!(
        r#"<h2>Extracted Text</h2>
<p>From <code>{filename}</code> with <code>{config}</code></p>
<textarea readonly>{text}</textarea>
<div>
    <a class="download" href="/download/{key}/docx">Download as Word</a>
    <a class="download" href="/download/{key}/txt">Download as Text</a>
</div>
<p><a href="/">Extract another image</a></p>"#,
        filename = html_escape(filename),
        config = html_escape(&options.config_string()),
        text = html_escape(text),
    );
    base_template("Extracted Text", &content)
}

/// Page shown when recognition succeeded but found nothing.
pub fn no_text_page(filename: &str) -> String {
    let content = format!(
        r#"<p class="warning">No text was extracted from <code>{}</code>. Try a clearer image or
a different page segmentation mode, and check the Tesseract status on the upload page.</p>
<p><a href="/">Try again</a></p>"#,
        html_escape(filename)
    );
    base_template("No Text Found", &content)
}

/// Page shown when the pipeline failed.
pub fn error_page(message: &str, report: Option<&ProbeReport>) -> String {
    let diagnostics = report.map(status_panel).unwrap_or_default();
    let content = format!(
        r#"<p class="error">Error extracting text: {}</p>
<p>Check the debug information below for troubleshooting.</p>
{}
<p><a href="/">Try again</a></p>"#,
        html_escape(message),
        diagnostics
    );
    base_template("Error", &content)
}
