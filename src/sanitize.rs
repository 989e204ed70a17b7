//! Cleanup of recognized text before it goes into a document.
//!
//! OCR output routinely contains form feeds, stray control characters and
//! long runs of blank lines. The document writer refuses control characters,
//! so text is passed through [`sanitize`] first.

use std::sync::LazyLock;

use regex::Regex;

/// Anything that is not printable ASCII, newline, carriage return or tab.
static NON_PRINTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\x20-\x7E\n\r\t]").expect("valid regex"));

/// Two or more line breaks with only whitespace between them.
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Strip non-printable characters, collapse blank-line runs to a single
/// blank line and trim the result.
pub fn sanitize(text: &str) -> String {
    let printable = NON_PRINTABLE.replace_all(text, "");
    let collapsed = BLANK_LINES.replace_all(&printable, "\n\n");
    collapsed.trim().to_string()
}

/// Whether a recognition result carries no text worth exporting.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
