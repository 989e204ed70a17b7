//! Word document export through `docx-rs`.
//!
//! The whole text goes into one paragraph. Line breaks inside the text become
//! text-wrapping breaks and tabs become tab elements, so the paragraph reads
//! the same as the plain-text artifact.

use std::io::{Cursor, Seek, Write};

use docx_rs::{BreakType, Docx, DocumentChild, Paragraph, ParagraphChild, Run, RunChild};

use super::ExportError;

/// Serialize `text` as a single-paragraph document into `writer`.
pub fn write_document<W: Write + Seek>(writer: W, text: &str) -> Result<(), ExportError> {
    check_xml_chars(text)?;

    Docx::new()
        .add_paragraph(Paragraph::new().add_run(text_run(text)))
        .build()
        .pack(writer)
        .map_err(|e| ExportError::Document(e.to_string()))?;
    Ok(())
}

/// Serialize `text` as a single-paragraph document in memory.
pub fn to_bytes(text: &str) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Cursor::new(Vec::new());
    write_document(&mut buffer, text)?;
    Ok(buffer.into_inner())
}

/// Read a document back and return the text of each paragraph.
///
/// Breaks read back as `\n` and tabs as `\t`. Word has no way to store a
/// carriage return, so `\r\n` and a lone `\r` in the exported text both come
/// back as `\n`.
pub fn paragraphs(bytes: &[u8]) -> Result<Vec<String>, ExportError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExportError::Document(format!("DOCX parse error: {e}")))?;

    Ok(docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect())
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}

/// One run holding `text`, with `\r\n`, `\r` and `\n` as breaks and `\t` as
/// tabs.
fn text_run(text: &str) -> Run {
    let mut run = Run::new();
    let mut segment = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\t' => {
                run = flush_text(run, &mut segment).add_tab();
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                run = flush_text(run, &mut segment).add_break(BreakType::TextWrapping);
            }
            _ => segment.push(c),
        }
    }
    flush_text(run, &mut segment)
}

fn flush_text(run: Run, segment: &mut String) -> Run {
    if segment.is_empty() {
        return run;
    }
    let run = run.add_text(segment.as_str());
    segment.clear();
    run
}

/// XML 1.0 only admits tab, newline and carriage return below U+0020, and
/// never U+FFFE or U+FFFF.
fn check_xml_chars(text: &str) -> Result<(), ExportError> {
    match text
        .chars()
        .enumerate()
        .find(|(_, c)| !is_xml_char(*c))
    {
        Some((position, ch)) => Err(ExportError::InvalidCharacter { ch, position }),
        None => Ok(()),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{fffe}' && c != '\u{ffff}')
}
