//! Tesseract OCR backend.
//!
//! Drives the `tesseract` command-line tool, reading the recognized text
//! from stdout.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use super::backend::{OcrError, Recognizer};
use super::options::OcrOptions;

/// Default command name, resolved through `PATH`.
pub const DEFAULT_TESSERACT_CMD: &str = "tesseract";

/// Tesseract OCR backend.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: PathBuf,
}

impl TesseractEngine {
    /// Create an engine that runs the given command (a bare name or a path).
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    fn run_tesseract(&self, image_path: &Path, options: &OcrOptions) -> Result<String, OcrError> {
        let args = options.args();
        tracing::debug!(
            "Running {} {} stdout {}",
            self.command.display(),
            image_path.display(),
            args.join(" ")
        );

        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .args(&args)
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::RecognitionFailed(format!(
                        "tesseract exited with {}: {}",
                        output.status,
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::EngineUnavailable(format!(
                    "{} not found (install tesseract-ocr or set the tesseract path)",
                    self.command.display()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(OcrError::EngineUnavailable(format!(
                    "{} is not executable: {}",
                    self.command.display(),
                    e
                )))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TESSERACT_CMD)
    }
}

impl Recognizer for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image_path: &Path, options: &OcrOptions) -> Result<String, OcrError> {
        let start = Instant::now();
        let text = self.run_tesseract(image_path, options)?;
        tracing::info!(
            "tesseract recognized {} chars in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}
