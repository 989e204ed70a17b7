//! The extraction pipeline: image bytes in, exportable text out.
//!
//! Each run is independent. Callers decide when to run it and whether to
//! reuse an earlier [`Extraction`] (see [`RecognitionRequest::cache_key`]).

use std::fmt;
use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::ocr::{OcrError, OcrOptions, Recognizer};
use crate::sanitize::{is_blank, sanitize};

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported image format: {0} (expected jpg, jpeg, png, bmp or tiff)")]
    UnsupportedImage(String),

    #[error(transparent)]
    Recognition(#[from] OcrError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image formats accepted for recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// File extensions accepted on upload.
    pub const EXTENSIONS: &'static [&'static str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/bmp" => Some(ImageFormat::Bmp),
            "image/tiff" => Some(ImageFormat::Tiff),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "bmp" => Some(ImageFormat::Bmp),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            _ => None,
        }
    }

    /// Detect the format from content, falling back to the filename's
    /// extension when the content is not recognized at all.
    pub fn detect(bytes: &[u8], filename: Option<&str>) -> Result<Self, PipelineError> {
        if let Some(kind) = infer::get(bytes) {
            return Self::from_mime(kind.mime_type())
                .ok_or_else(|| PipelineError::UnsupportedImage(kind.mime_type().to_string()));
        }

        filename
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| {
                PipelineError::UnsupportedImage(
                    filename.unwrap_or("unrecognized content").to_string(),
                )
            })
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// An image plus the options to recognize it with.
#[derive(Debug, Clone)]
pub struct RecognitionRequest {
    image: Vec<u8>,
    format: ImageFormat,
    options: OcrOptions,
}

impl RecognitionRequest {
    /// Validate the image format and build a request.
    pub fn new(
        image: Vec<u8>,
        filename: Option<&str>,
        options: OcrOptions,
    ) -> Result<Self, PipelineError> {
        if image.is_empty() {
            return Err(PipelineError::UnsupportedImage("empty file".to_string()));
        }
        let format = ImageFormat::detect(&image, filename)?;
        Ok(Self {
            image,
            format,
            options,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn options(&self) -> &OcrOptions {
        &self.options
    }

    pub fn image_len(&self) -> usize {
        self.image.len()
    }

    /// Stable key for memoizing results: the same image with the same options
    /// always produces the same key.
    pub fn cache_key(&self, sanitized: bool) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.image);
        hasher.update([0u8]);
        hasher.update(self.options.config_string().as_bytes());
        hasher.update([sanitized as u8]);
        hex::encode(hasher.finalize())
    }
}

/// Recognized text that is known to be non-empty. Only obtainable from an
/// [`Extraction::Text`], so exports can never be built from nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    fn new(text: String) -> Option<Self> {
        if is_blank(&text) {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The engine found text.
    Text {
        /// Engine output as returned.
        raw: String,
        /// Text to show and export (sanitized unless disabled).
        text: ExtractedText,
    },
    /// The engine ran but found nothing.
    NoText,
}

impl Extraction {
    /// Classify raw engine output.
    pub fn from_raw(raw: String, sanitized: bool) -> Self {
        let text = if sanitized { sanitize(&raw) } else { raw.clone() };
        match ExtractedText::new(text) {
            Some(text) => Extraction::Text { raw, text },
            None => Extraction::NoText,
        }
    }

    pub fn text(&self) -> Option<&ExtractedText> {
        match self {
            Extraction::Text { text, .. } => Some(text),
            Extraction::NoText => None,
        }
    }
}

/// Run recognition on one request.
///
/// The image is written to a temporary file for the engine and removed
/// before this returns, whatever the outcome.
pub fn run(
    recognizer: &dyn Recognizer,
    request: &RecognitionRequest,
    sanitized: bool,
) -> Result<Extraction, PipelineError> {
    let mut image_file = tempfile::Builder::new()
        .prefix("imgtext-")
        .suffix(&format!(".{}", request.format.extension()))
        .tempfile()?;
    image_file.write_all(&request.image)?;
    image_file.flush()?;

    tracing::info!(
        "Recognizing {} byte {} image with {} ({})",
        request.image.len(),
        request.format,
        recognizer.name(),
        request.options.config_string()
    );

    let raw = recognizer.recognize(image_file.path(), &request.options)?;
    let extraction = Extraction::from_raw(raw, sanitized);
    if extraction == Extraction::NoText {
        tracing::warn!("No text was extracted from the image");
    }
    Ok(extraction)
}
