//! OCR engine integration.
//!
//! Text recognition itself is delegated to Tesseract, run as a subprocess.
//! This module owns the pieces around it:
//! - `options`: the engine flags (`--oem`, `--psm`, `-l`)
//! - `tesseract`: the subprocess backend
//! - `probe`: installation diagnostics

mod backend;
mod options;
mod probe;
mod tesseract;

pub use backend::{OcrError, Recognizer};
pub use options::{build_config, EngineMode, Language, OcrOptions, OptionsError, SegmentationMode};
pub use probe::{probe, EngineStatus, ProbeReport, KNOWN_LOCATIONS};
pub use tesseract::{TesseractEngine, DEFAULT_TESSERACT_CMD};
