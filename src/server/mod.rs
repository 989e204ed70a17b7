//! Web interface for extracting text from uploaded images.
//!
//! - `GET /` upload form with OCR settings and engine diagnostics
//! - `POST /extract` runs recognition and shows the text
//! - `GET /download/:key/txt|docx` serves the artifacts
//! - `GET /api/status` engine diagnostics as JSON

mod cache;
mod handlers;
mod routes;
mod templates;

pub use cache::ExtractionCache;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::ocr::{probe, Recognizer, TesseractEngine};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub recognizer: Arc<dyn Recognizer>,
    pub cache: Arc<ExtractionCache>,
}

impl AppState {
    pub fn new(config: Config, recognizer: Arc<dyn Recognizer>) -> Self {
        let cache = ExtractionCache::new(
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_capacity,
        );
        Self {
            config: Arc::new(config),
            recognizer,
            cache: Arc::new(cache),
        }
    }
}

/// Start the web server.
pub async fn serve(config: Config, addr: SocketAddr) -> anyhow::Result<()> {
    let command = config.tesseract_cmd.clone();
    let report = tokio::task::spawn_blocking(move || probe(&command)).await?;
    if report.status.is_ready() {
        tracing::info!("{}", report.status.summary());
    } else {
        tracing::warn!("{} {}", report.status.summary(), report.install_hint());
    }

    let engine = TesseractEngine::new(&config.tesseract_cmd);
    let state = AppState::new(config, Arc::new(engine));
    let app = create_router(state);

    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::export::docx;
    use crate::ocr::{OcrError, OcrOptions};
    use crate::pipeline::RecognitionRequest;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01";
    const BOUNDARY: &str = "imgtext-test-boundary";

    enum Behavior {
        Text(&'static str),
        Unavailable,
        Fails,
    }

    struct FakeEngine {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FakeEngine {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Recognizer for FakeEngine {
        fn name(&self) -> &str {
            "fake"
        }

        fn recognize(&self, image_path: &Path, _options: &OcrOptions) -> Result<String, OcrError> {
            assert!(image_path.exists());
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Text(text) => Ok(text.to_string()),
                Behavior::Unavailable => Err(OcrError::EngineUnavailable(
                    "tesseract not found".to_string(),
                )),
                Behavior::Fails => Err(OcrError::RecognitionFailed(
                    "Failed loading language 'deu'".to_string(),
                )),
            }
        }
    }

    fn test_app(engine: Arc<FakeEngine>) -> axum::Router {
        let config = Config {
            tesseract_cmd: "imgtext-test-missing-tesseract".to_string(),
            ..Config::default()
        };
        create_router(AppState::new(config, engine))
    }

    fn multipart_body(image: &[u8], filename: &str, fields: &[(&str, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload(image: &[u8], filename: &str, fields: &[(&str, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/extract")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(image, filename, fields)))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_string(response: axum::response::Response) -> String {
        String::from_utf8(body_bytes(response).await).unwrap()
    }

    fn key_for(image: &[u8], options: OcrOptions, sanitized: bool) -> String {
        RecognitionRequest::new(image.to_vec(), None, options)
            .unwrap()
            .cache_key(sanitized)
    }

    #[tokio::test]
    async fn test_index_renders_form_and_status() {
        let app = test_app(FakeEngine::new(Behavior::Text("unused")));
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains(r#"action="/extract""#));
        assert!(body.contains("Page Segmentation Mode"));
        assert!(body.contains("imgtext-test-missing-tesseract"));
        assert!(body.contains("Tesseract not found in common locations")
            || body.contains("path explicitly"));
    }

    #[tokio::test]
    async fn test_extract_shows_text_and_serves_downloads() {
        let engine = FakeEngine::new(Behavior::Text("Hello\x0c\n\n\n\nWorld\n"));
        let app = test_app(engine.clone());

        let response = app
            .clone()
            .oneshot(upload(PNG_MAGIC, "hello.png", &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Hello\n\nWorld"));

        let key = key_for(PNG_MAGIC, OcrOptions::default(), true);
        assert!(body.contains(&format!("/download/{key}/txt")));

        let txt = app
            .clone()
            .oneshot(get(&format!("/download/{key}/txt")))
            .await
            .unwrap();
        assert_eq!(txt.status(), StatusCode::OK);
        assert_eq!(txt.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            txt.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"extracted_text.txt\""
        );
        assert_eq!(body_bytes(txt).await, b"Hello\n\nWorld");

        let doc = app
            .clone()
            .oneshot(get(&format!("/download/{key}/docx")))
            .await
            .unwrap();
        assert_eq!(doc.status(), StatusCode::OK);
        assert_eq!(
            doc.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        let bytes = body_bytes(doc).await;
        assert_eq!(docx::paragraphs(&bytes).unwrap(), vec!["Hello\n\nWorld"]);

        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeated_upload_reuses_cached_result() {
        let engine = FakeEngine::new(Behavior::Text("cached"));
        let app = test_app(engine.clone());

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(upload(PNG_MAGIC, "same.png", &[("psm", "6")]))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);

        let response = app
            .clone()
            .oneshot(upload(PNG_MAGIC, "same.png", &[("psm", "7")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_raw_upload_keeps_engine_output() {
        let engine = FakeEngine::new(Behavior::Text("a\n\n\n\nb"));
        let app = test_app(engine);

        let response = app
            .clone()
            .oneshot(upload(PNG_MAGIC, "raw.png", &[("raw", "1"), ("lang", "deu")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("a\n\n\n\nb"));

        let options = OcrOptions {
            language: crate::ocr::Language::German,
            ..OcrOptions::default()
        };
        let key = key_for(PNG_MAGIC, options, false);
        let txt = app
            .oneshot(get(&format!("/download/{key}/txt")))
            .await
            .unwrap();
        assert_eq!(body_bytes(txt).await, b"a\n\n\n\nb");
    }

    #[tokio::test]
    async fn test_blank_result_shows_warning_and_offers_no_downloads() {
        let app = test_app(FakeEngine::new(Behavior::Text(" \n\x0c")));

        let response = app
            .clone()
            .oneshot(upload(PNG_MAGIC, "blank.png", &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("No text was extracted"));
        assert!(!body.contains("/download/"));

        let key = key_for(PNG_MAGIC, OcrOptions::default(), true);
        for kind in ["txt", "docx"] {
            let response = app
                .clone()
                .oneshot(get(&format!("/download/{key}/{kind}")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_rejected_before_recognition() {
        let engine = FakeEngine::new(Behavior::Text("never"));
        let app = test_app(engine.clone());

        let response = app
            .oneshot(upload(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n", "doc.pdf", &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body_string(response).await.contains("Unsupported image format"));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_option_is_a_bad_request() {
        let engine = FakeEngine::new(Behavior::Text("never"));
        let app = test_app(engine.clone());

        let response = app
            .oneshot(upload(PNG_MAGIC, "a.png", &[("psm", "5")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("page segmentation mode"));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_image_field_is_a_bad_request() {
        let app = test_app(FakeEngine::new(Behavior::Text("never")));
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"psm\"\r\n\r\n3\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/extract")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_engine_failures_render_inline_errors() {
        let app = test_app(FakeEngine::new(Behavior::Unavailable));
        let response = app
            .oneshot(upload(PNG_MAGIC, "a.png", &[]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_string(response).await;
        assert!(body.contains("OCR engine not available"));
        assert!(body.contains("Tesseract Status"));

        let app = test_app(FakeEngine::new(Behavior::Fails));
        let response = app
            .oneshot(upload(PNG_MAGIC, "a.png", &[("lang", "deu")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_string(response).await.contains("Failed loading language"));
    }

    #[tokio::test]
    async fn test_failed_recognition_is_not_cached() {
        let engine = FakeEngine::new(Behavior::Fails);
        let app = test_app(engine.clone());
        for _ in 0..2 {
            app.clone()
                .oneshot(upload(PNG_MAGIC, "a.png", &[]))
                .await
                .unwrap();
        }
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_download_is_not_found() {
        let app = test_app(FakeEngine::new(Behavior::Text("x")));
        for uri in ["/download/deadbeef/txt", "/download/deadbeef/pdf"] {
            let response = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_api_status_reports_probe() {
        let app = test_app(FakeEngine::new(Behavior::Text("x")));
        let response = app.oneshot(get("/api/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["command"], "imgtext-test-missing-tesseract");
        assert_ne!(json["status"]["status"], "ready");
    }
}
