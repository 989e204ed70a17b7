//! End-to-end pipeline tests with a scripted recognizer.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use imgtext::export::{self, docx, ExportError, TEXT_FILENAME};
use imgtext::ocr::{build_config, OcrError, OcrOptions, Recognizer};
use imgtext::pipeline::{self, Extraction, ImageFormat, PipelineError, RecognitionRequest};

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x02\0\0\0";

/// Returns a fixed result and remembers which file it was shown.
struct ScriptedRecognizer {
    output: Result<String, String>,
    seen: Mutex<Option<(PathBuf, Vec<u8>)>>,
}

impl ScriptedRecognizer {
    fn text(output: &str) -> Self {
        Self {
            output: Ok(output.to_string()),
            seen: Mutex::new(None),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            output: Err(message.to_string()),
            seen: Mutex::new(None),
        }
    }

    fn seen_path(&self) -> PathBuf {
        self.seen.lock().unwrap().as_ref().unwrap().0.clone()
    }
}

impl Recognizer for ScriptedRecognizer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&self, image_path: &Path, _options: &OcrOptions) -> Result<String, OcrError> {
        let contents = std::fs::read(image_path)?;
        *self.seen.lock().unwrap() = Some((image_path.to_path_buf(), contents));
        self.output
            .clone()
            .map_err(OcrError::RecognitionFailed)
    }
}

fn png_request() -> RecognitionRequest {
    RecognitionRequest::new(PNG_HEADER.to_vec(), Some("scan.png"), OcrOptions::default()).unwrap()
}

#[test]
fn recognizer_sees_the_uploaded_bytes_in_a_temporary_png() {
    let recognizer = ScriptedRecognizer::text("Hello");
    pipeline::run(&recognizer, &png_request(), true).unwrap();

    let (path, contents) = recognizer.seen.lock().unwrap().clone().unwrap();
    assert_eq!(contents, PNG_HEADER);
    assert_eq!(path.extension().unwrap(), "png");
}

#[test]
fn temporary_image_is_removed_after_success() {
    let recognizer = ScriptedRecognizer::text("Hello");
    pipeline::run(&recognizer, &png_request(), true).unwrap();
    assert!(!recognizer.seen_path().exists());
}

#[test]
fn temporary_image_is_removed_after_failure() {
    let recognizer = ScriptedRecognizer::failing("bad image");
    let err = pipeline::run(&recognizer, &png_request(), true).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Recognition(OcrError::RecognitionFailed(_))
    ));
    assert!(!recognizer.seen_path().exists());
}

#[test]
fn whitespace_only_output_is_no_text() {
    let recognizer = ScriptedRecognizer::text(" \n\x0c\n ");
    let extraction = pipeline::run(&recognizer, &png_request(), true).unwrap();
    assert_eq!(extraction, Extraction::NoText);
    assert!(extraction.text().is_none());
}

#[test]
fn sanitized_text_flows_into_both_artifacts() {
    let recognizer = ScriptedRecognizer::text("  Invoice #42\n\n\n\nTotal:\t$10\x0c\n");
    let extraction = pipeline::run(&recognizer, &png_request(), true).unwrap();
    let text = extraction.text().expect("text");
    assert_eq!(text.as_str(), "Invoice #42\n\nTotal:\t$10");

    let txt = export::text_artifact(text);
    assert_eq!(txt.bytes, text.as_str().as_bytes());

    let doc = export::document_artifact(text).unwrap();
    assert_eq!(
        docx::paragraphs(&doc.bytes).unwrap(),
        vec![text.as_str().to_string()]
    );
}

#[test]
fn raw_mode_keeps_engine_output() {
    let recognizer = ScriptedRecognizer::text("Hello\n\x0c");
    let extraction = pipeline::run(&recognizer, &png_request(), false).unwrap();
    let text = extraction.text().expect("text");
    assert_eq!(text.as_str(), "Hello\n\x0c");

    // form feeds are not allowed in document XML
    assert!(matches!(
        export::document_artifact(text),
        Err(ExportError::InvalidCharacter { ch: '\x0c', .. })
    ));
}

#[test]
fn saved_artifacts_land_in_the_output_directory() {
    let recognizer = ScriptedRecognizer::text("Saved text");
    let extraction = pipeline::run(&recognizer, &png_request(), true).unwrap();
    let text = extraction.text().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let txt_path = export::text_artifact(text).save_to(dir.path()).unwrap();
    let doc_path = export::document_artifact(text)
        .unwrap()
        .save_to(dir.path())
        .unwrap();

    assert_eq!(txt_path, dir.path().join(TEXT_FILENAME));
    assert_eq!(std::fs::read_to_string(&txt_path).unwrap(), "Saved text");
    assert_eq!(
        docx::paragraphs(&std::fs::read(&doc_path).unwrap()).unwrap(),
        vec!["Saved text".to_string()]
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn non_image_upload_is_rejected_before_recognition() {
    let err = RecognitionRequest::new(
        b"%PDF-1.7\n".to_vec(),
        Some("scan.png"),
        OcrOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedImage(_)));
}

#[test]
fn extension_decides_when_content_is_unknown() {
    assert_eq!(
        ImageFormat::detect(b"not sniffable", Some("photo.JPEG")).unwrap(),
        ImageFormat::Jpeg
    );
    assert!(ImageFormat::detect(b"not sniffable", Some("notes.txt")).is_err());
}

#[test]
fn build_config_contract() {
    assert_eq!(build_config(3, 3, "eng").unwrap(), "--oem 3 --psm 3");
    assert_eq!(build_config(1, 6, "deu").unwrap(), "--oem 1 --psm 6 -l deu");
    assert_eq!(build_config(3, 11, "fra").unwrap(), "--oem 3 --psm 11 -l fra");
    assert!(build_config(2, 3, "eng").is_err());
    assert!(build_config(3, 5, "eng").is_err());
    assert!(build_config(3, 3, "klingon").is_err());
}
