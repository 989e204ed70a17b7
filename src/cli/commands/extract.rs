//! Extract command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::export::{document_artifact, text_artifact, ExportError, ExportFormat};
use crate::ocr::{OcrOptions, TesseractEngine};
use crate::pipeline::{self, ExtractedText, Extraction, PipelineError, RecognitionRequest};

pub struct ExtractArgs {
    pub image: PathBuf,
    pub options: OcrOptions,
    pub sanitize: bool,
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    pub print: bool,
}

/// Recognize text in one image and write the requested artifacts.
pub async fn cmd_extract(config: &Config, args: ExtractArgs) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&args.image)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.image.display(), e))?;
    let filename = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().to_string());
    let request = RecognitionRequest::new(bytes, filename.as_deref(), args.options)?;

    if args.format != ExportFormat::Nothing && !args.output_dir.is_dir() {
        anyhow::bail!(
            "Output directory {} does not exist",
            args.output_dir.display()
        );
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message("Extracting text... This may take a moment.");
    pb.enable_steady_tick(Duration::from_millis(100));

    let engine = TesseractEngine::new(&config.tesseract_cmd);
    let sanitize = args.sanitize;
    let result =
        tokio::task::spawn_blocking(move || pipeline::run(&engine, &request, sanitize)).await?;
    pb.finish_and_clear();

    let extraction = match result {
        Ok(extraction) => extraction,
        Err(e) => {
            if let Some(hint) = pipeline_hint(&e) {
                eprintln!("{} {}", style("!").yellow(), hint);
            }
            return Err(anyhow::Error::new(e).context("Error extracting text"));
        }
    };

    let text = match &extraction {
        Extraction::Text { text, .. } => text,
        Extraction::NoText => {
            println!(
                "{} No text was extracted from the image. Run `imgtext doctor` to check the installation.",
                style("!").yellow()
            );
            return Ok(());
        }
    };

    if args.print || args.format == ExportFormat::Nothing {
        println!("{}", text);
    }

    save_artifacts(text, args.format, &args.output_dir, args.sanitize, |path| {
        println!("{} Saved {}", style("✓").green(), path.display())
    })
}

/// Write the artifacts `format` asks for into `dir`, text first.
///
/// Errors are returned, not printed; `saved` is called for each file written.
fn save_artifacts(
    text: &ExtractedText,
    format: ExportFormat,
    dir: &Path,
    sanitize: bool,
    mut saved: impl FnMut(&Path),
) -> anyhow::Result<()> {
    if format.includes_text() {
        let path = text_artifact(text)
            .save_to(dir)
            .context("Could not save the text file")?;
        saved(&path);
    }

    if format.includes_docx() {
        match document_artifact(text).and_then(|doc| doc.save_to(dir)) {
            Ok(path) => saved(&path),
            Err(e) => {
                if let Some(hint) = export_hint(&e, sanitize) {
                    eprintln!("{} {}", style("!").yellow(), hint);
                }
                return Err(anyhow::Error::new(e).context("Word export failed"));
            }
        }
    }

    Ok(())
}

fn pipeline_hint(error: &PipelineError) -> Option<&'static str> {
    match error {
        PipelineError::Recognition(err) if err.is_unavailable() => {
            Some("Run `imgtext doctor` for troubleshooting.")
        }
        _ => None,
    }
}

fn export_hint(error: &ExportError, sanitize: bool) -> Option<&'static str> {
    match error {
        ExportError::InvalidCharacter { .. } if !sanitize => {
            Some("Raw output keeps control characters; try again without --raw.")
        }
        _ => None,
    }
}
