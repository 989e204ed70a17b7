//! Request handlers for the web server.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};

use super::templates;
use super::AppState;
use crate::export::{document_artifact, text_artifact, ExportArtifact};
use crate::ocr::{probe, OcrError, OcrOptions, OptionsError, ProbeReport};
use crate::pipeline::{self, Extraction, PipelineError, RecognitionRequest};

/// Fields of the upload form.
#[derive(Default)]
struct UploadForm {
    image: Option<Vec<u8>>,
    filename: Option<String>,
    psm: Option<String>,
    oem: Option<String>,
    lang: Option<String>,
    raw: bool,
}

impl UploadForm {
    /// Options from the form, falling back to the configured defaults for
    /// fields that were left out.
    fn options(&self, defaults: OcrOptions) -> Result<OcrOptions, OptionsError> {
        let mut options = defaults;
        if let Some(psm) = non_empty(&self.psm) {
            options.segmentation_mode = psm.parse()?;
        }
        if let Some(oem) = non_empty(&self.oem) {
            options.engine_mode = oem.parse()?;
        }
        if let Some(lang) = non_empty(&self.lang) {
            options.language = lang.parse()?;
        }
        Ok(options)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn error_response(status: StatusCode, message: &str, report: Option<&ProbeReport>) -> Response {
    (status, Html(templates::error_page(message, report))).into_response()
}

async fn read_upload(multipart: &mut Multipart) -> Result<UploadForm, (StatusCode, String)> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                form.filename = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| (e.status(), e.body_text()))?;
                form.image = Some(bytes.to_vec());
            }
            "psm" | "oem" | "lang" | "raw" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| (e.status(), e.body_text()))?;
                match name.as_str() {
                    "psm" => form.psm = Some(value),
                    "oem" => form.oem = Some(value),
                    "lang" => form.lang = Some(value),
                    _ => {
                        form.raw = !matches!(value.trim(), "" | "0" | "false" | "off");
                    }
                }
            }
            other => tracing::debug!("Ignoring unexpected form field {:?}", other),
        }
    }

    Ok(form)
}

/// Probe the engine off the async runtime.
async fn probe_engine(state: &AppState) -> Option<ProbeReport> {
    let command = state.config.tesseract_cmd.clone();
    match tokio::task::spawn_blocking(move || probe(&command)).await {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::error!("Engine probe panicked: {}", e);
            None
        }
    }
}

/// Upload page.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let report = probe_engine(&state).await;
    Html(templates::index_page(
        &state.config.ocr_options(),
        state.config.sanitize,
        report.as_ref(),
    ))
}

/// Engine diagnostics as JSON.
pub async fn api_status(State(state): State<AppState>) -> Response {
    match probe_engine(&state).await {
        Some(report) => Json(report).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "engine probe failed").into_response(),
    }
}

/// Run recognition on an uploaded image.
pub async fn extract(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let form = match read_upload(&mut multipart).await {
        Ok(form) => form,
        Err((status, message)) => return error_response(status, &message, None),
    };

    let options = match form.options(state.config.ocr_options()) {
        Ok(options) => options,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string(), None),
    };
    let sanitized = !form.raw;
    let filename = form.filename.unwrap_or_else(|| "upload".to_string());

    let Some(image) = form.image else {
        return error_response(StatusCode::BAD_REQUEST, "No image file was uploaded", None);
    };

    let request = match RecognitionRequest::new(image, Some(&filename), options) {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::UNSUPPORTED_MEDIA_TYPE, &e.to_string(), None),
    };

    let key = request.cache_key(sanitized);
    let extraction = match state.cache.get(&key) {
        Some(extraction) => {
            tracing::debug!("Reusing extraction {}", key);
            extraction
        }
        None => {
            let recognizer = state.recognizer.clone();
            let result = tokio::task::spawn_blocking(move || {
                pipeline::run(recognizer.as_ref(), &request, sanitized)
            })
            .await;

            match result {
                Ok(Ok(extraction)) => {
                    state.cache.insert(key.clone(), extraction.clone());
                    extraction
                }
                Ok(Err(e)) => return pipeline_error_response(&state, e).await,
                Err(e) => {
                    tracing::error!("Recognition task failed: {}", e);
                    return error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Recognition task failed",
                        None,
                    );
                }
            }
        }
    };

    match extraction {
        Extraction::Text { text, .. } => {
            Html(templates::text_page(&filename, text.as_str(), &key, &options)).into_response()
        }
        Extraction::NoText => Html(templates::no_text_page(&filename)).into_response(),
    }
}

async fn pipeline_error_response(state: &AppState, error: PipelineError) -> Response {
    tracing::warn!("Extraction failed: {}", error);
    let status = match &error {
        PipelineError::UnsupportedImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        PipelineError::Recognition(OcrError::EngineUnavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        PipelineError::Recognition(OcrError::RecognitionFailed(_)) => StatusCode::BAD_GATEWAY,
        PipelineError::Recognition(OcrError::Io(_)) | PipelineError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let report = match &error {
        PipelineError::Recognition(_) => probe_engine(state).await,
        _ => None,
    };
    error_response(status, &error.to_string(), report.as_ref())
}

fn artifact_response(artifact: ExportArtifact) -> Response {
    (
        [
            (header::CONTENT_TYPE, artifact.mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.filename),
            ),
        ],
        artifact.bytes,
    )
        .into_response()
}

/// Download an artifact of an earlier extraction.
pub async fn download(
    State(state): State<AppState>,
    Path((key, kind)): Path<(String, String)>,
) -> Response {
    let Some(extraction) = state.cache.get(&key) else {
        return (StatusCode::NOT_FOUND, "Unknown or expired extraction").into_response();
    };
    let Some(text) = extraction.text() else {
        return (StatusCode::NOT_FOUND, "No text was extracted from this image").into_response();
    };

    match kind.as_str() {
        "txt" => artifact_response(text_artifact(text)),
        "docx" => match document_artifact(text) {
            Ok(artifact) => artifact_response(artifact),
            Err(e) => {
                tracing::warn!("Document export failed: {}", e);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("Could not build the Word document: {}", e),
                )
                    .into_response()
            }
        },
        _ => (StatusCode::NOT_FOUND, "Unknown download format").into_response(),
    }
}
