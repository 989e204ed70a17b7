//! Downloadable artifacts built from recognized text.
//!
//! Two artifacts come out of every successful extraction:
//! - `extracted_text.txt`: the text as UTF-8
//! - `extracted_text.docx`: the text as a one-paragraph Word document

pub mod docx;

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::pipeline::ExtractedText;

pub const TEXT_FILENAME: &str = "extracted_text.txt";
pub const TEXT_MIME: &str = "text/plain";
pub const DOCX_FILENAME: &str = "extracted_text.docx";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Errors from building or saving artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Character {ch:?} at position {position} cannot be stored in a Word document")]
    InvalidCharacter { ch: char, position: usize },

    #[error("Word document error: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which artifacts to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Plain text only
    Text,
    /// Word document only
    Docx,
    /// Both text and Word document
    #[default]
    Both,
    /// Nothing, just print the text
    #[value(name = "none")]
    Nothing,
}

impl ExportFormat {
    pub fn includes_text(&self) -> bool {
        matches!(self, ExportFormat::Text | ExportFormat::Both)
    }

    pub fn includes_docx(&self) -> bool {
        matches!(self, ExportFormat::Docx | ExportFormat::Both)
    }
}

/// A downloadable payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub filename: &'static str,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its filename.
    ///
    /// Goes through a temporary file in the same directory that is renamed
    /// into place, so a failed write never leaves a partial artifact or a
    /// stray temporary file behind.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let target = dir.join(self.filename);
        let mut tmp = tempfile::Builder::new()
            .prefix(".imgtext-")
            .tempfile_in(dir)?;
        tmp.write_all(&self.bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| ExportError::Io(e.error))?;
        tracing::debug!("Saved {} ({} bytes)", target.display(), self.bytes.len());
        Ok(target)
    }
}

/// Plain-text artifact: the text itself, UTF-8 encoded.
pub fn text_artifact(text: &ExtractedText) -> ExportArtifact {
    ExportArtifact {
        bytes: text.as_str().as_bytes().to_vec(),
        mime_type: TEXT_MIME,
        filename: TEXT_FILENAME,
    }
}

/// Word artifact: the text as a single paragraph.
pub fn document_artifact(text: &ExtractedText) -> Result<ExportArtifact, ExportError> {
    Ok(ExportArtifact {
        bytes: docx::to_bytes(text.as_str())?,
        mime_type: DOCX_MIME,
        filename: DOCX_FILENAME,
    })
}
