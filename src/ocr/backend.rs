//! Recognition engine abstraction.

use std::path::Path;

use thiserror::Error;

use super::options::OcrOptions;

/// Errors from the recognition engine.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine binary is missing or cannot be started.
    #[error("OCR engine not available: {0}")]
    EngineUnavailable(String),

    /// The engine ran but reported an error (e.g. missing language pack).
    #[error("OCR failed: {0}")]
    RecognitionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    /// Whether the engine diagnostics are worth showing alongside this error.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, OcrError::EngineUnavailable(_))
    }
}

/// Something that turns an image file into text.
pub trait Recognizer: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Run recognition on an image file. Blocks until the engine returns.
    fn recognize(&self, image_path: &Path, options: &OcrOptions) -> Result<String, OcrError>;
}
