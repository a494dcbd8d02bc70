use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use common::models::ConversionDirection;
use service::{
    convert::{Converter, ConverterScripts, ScriptConverter},
    error::ConversionError,
    settings::ServiceSettings,
    state::{ServiceCollection, Services},
};
use tower::ServiceExt;

const BOUNDARY: &str = "docstron-test-boundary";
const BASE_URL: &str = "http://localhost:5000";
const COPY: &str = "cp \"$1\" \"$2\"\n";
const FAIL: &str = "echo 'Traceback: could not parse pdf' >&2\nexit 1\n";
const SLOW_COPY: &str = "sleep 1\ncp \"$1\" \"$2\"\n";

struct TestApp {
    dir: tempfile::TempDir,
    services: Services,
    router: Router,
}

impl TestApp {
    async fn new(pdf_to_docx: &str, docx_to_pdf: &str) -> TestApp {
        Self::with_max_size(pdf_to_docx, docx_to_pdf, 10 * 1024 * 1024).await
    }

    async fn with_max_size(pdf_to_docx: &str, docx_to_pdf: &str, max_file_size: u64) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let scripts = ConverterScripts {
            interpreter: "sh".to_string(),
            pdf_to_docx: write_script(&dir, "pdf_to_docx.sh", pdf_to_docx),
            docx_to_pdf: write_script(&dir, "docx_to_pdf.sh", docx_to_pdf),
        };
        let settings = test_settings(&dir, scripts.clone(), max_file_size);
        let converter = Arc::new(ScriptConverter {
            scripts,
            timeout: settings.convert_timeout,
        });
        Self::with_converter(dir, settings, converter).await
    }

    async fn with_converter(dir: tempfile::TempDir, settings: ServiceSettings, converter: Arc<dyn Converter>) -> TestApp {
        let services = ServiceCollection::build_with_converter(settings, converter).await.unwrap();
        let router = service::app(services.clone());
        TestApp { dir, services, router }
    }

    async fn send(&self, request: Request<Body>) -> Response<axum::body::BoxBody> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn upload(&self, field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Response<axum::body::BoxBody> {
        self.send(multipart_request(field, file_name, content_type, bytes)).await
    }

    fn temp_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.dir.path().join("uploads").join("tmp"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

fn test_settings(dir: &tempfile::TempDir, scripts: ConverterScripts, max_file_size: u64) -> ServiceSettings {
    ServiceSettings {
        port: 5000,
        public_base_url: BASE_URL.to_string(),
        upload_dir: dir.path().join("uploads"),
        max_file_size,
        parallelism: 2,
        max_queued: 4,
        convert_timeout: Duration::from_secs(10),
        max_age: Duration::from_secs(300),
        sweep_interval: Duration::from_secs(30),
        scripts,
    }
}

/// Writes its result somewhere other than next to the input.
struct SideCopyConverter;

#[async_trait::async_trait]
impl Converter for SideCopyConverter {
    async fn convert(&self, input: &Path, direction: ConversionDirection) -> Result<PathBuf, ConversionError> {
        let output = input.with_extension(format!("side.{}", direction.target().extension()));
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }
}

fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn multipart_request(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri("/api/convert")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: Response<axum::body::BoxBody>) -> Vec<u8> {
    hyper::body::to_bytes(response.into_body()).await.unwrap().to_vec()
}

async fn body_json(response: Response<axum::body::BoxBody>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn download_path(json: &serde_json::Value) -> String {
    let url = json["downloadUrl"].as_str().unwrap();
    assert!(url.starts_with(BASE_URL), "{url}");
    url.trim_start_matches(BASE_URL).to_string()
}

const PDF: &[u8] = b"%PDF-1.4\n1 0 obj <<>> endobj\ntrailer <<>>\n%%EOF\n";

#[tokio::test]
async fn pdf_upload_returns_working_download_url() {
    let app = TestApp::new(COPY, FAIL).await;

    let response = app.upload("file", "report.pdf", "application/pdf", PDF).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let path = download_path(&json);
    assert!(path.starts_with("/uploads/") && path.ends_with(".docx"), "{path}");
    assert_eq!(json["fileName"], "report.docx");
    assert!(json["expiresAt"].is_string());

    let download = app.send(get(&path)).await;
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(
        download.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report.docx\""
    );
    assert_eq!(
        download.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(body_bytes(download).await, PDF);

    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn docx_upload_converts_to_pdf() {
    let app = TestApp::new(FAIL, COPY).await;

    let response = app.upload("file", "notes.DOCX", "application/octet-stream", b"PK\x03\x04docx").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(download_path(&json).ends_with(".pdf"));
    assert_eq!(json["fileName"], "notes.pdf");

    let download = app.send(get(&download_path(&json))).await;
    assert_eq!(download.headers()[header::CONTENT_TYPE], "application/pdf");
}

#[tokio::test]
async fn missing_file_field_is_rejected_without_temp_files() {
    let app = TestApp::new(COPY, COPY).await;

    let response = app.upload("attachment", "report.pdf", "application/pdf", PDF).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, serde_json::json!({ "error": "No file uploaded." }));
    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn empty_file_name_counts_as_no_file() {
    let app = TestApp::new(COPY, COPY).await;

    let response = app.upload("file", "", "application/octet-stream", b"").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, serde_json::json!({ "error": "No file uploaded." }));
    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn non_multipart_request_is_rejected() {
    let app = TestApp::new(COPY, COPY).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/convert")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file uploaded.");
}

#[tokio::test]
async fn failed_conversion_is_500_and_cleans_up() {
    let app = TestApp::new(FAIL, FAIL).await;

    let response = app.upload("file", "broken.pdf", "application/pdf", b"not really a pdf").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, serde_json::json!({ "error": "Error converting file." }));
    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn converter_that_writes_nothing_is_a_failure() {
    let app = TestApp::new("exit 0\n", COPY).await;

    let response = app.upload("file", "report.pdf", "application/pdf", PDF).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn stores_the_file_the_converter_reports() {
    let dir = tempfile::tempdir().unwrap();
    let scripts = ConverterScripts {
        interpreter: "sh".to_string(),
        pdf_to_docx: write_script(&dir, "pdf_to_docx.sh", FAIL),
        docx_to_pdf: write_script(&dir, "docx_to_pdf.sh", FAIL),
    };
    let settings = test_settings(&dir, scripts, 10 * 1024 * 1024);
    let app = TestApp::with_converter(dir, settings, Arc::new(SideCopyConverter)).await;

    let response = app.upload("file", "report.pdf", "application/pdf", PDF).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let download = app.send(get(&download_path(&json))).await;
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(body_bytes(download).await, PDF);
    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn dropped_request_removes_temp_files_and_stops_converter() {
    let app = TestApp::new(SLOW_COPY, SLOW_COPY).await;
    let request = multipart_request("file", "report.pdf", "application/pdf", PDF);
    let handler = tokio::spawn(app.router.clone().oneshot(request));

    tokio::time::timeout(Duration::from_secs(5), async {
        while app.temp_files().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("upload never reached the temp directory");
    tokio::time::sleep(Duration::from_millis(200)).await;

    // same as a client hanging up mid-conversion
    handler.abort();
    assert!(handler.await.unwrap_err().is_cancelled());
    assert!(app.temp_files().is_empty());

    // a surviving converter would write its output after the sleep
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn server_revalidates_extension_and_declared_type() {
    let app = TestApp::new(COPY, COPY).await;

    let wrong_extension = app.upload("file", "picture.png", "image/png", b"png").await;
    assert_eq!(wrong_extension.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(wrong_extension).await["error"], "Please upload a PDF or DOCX file.");

    let no_dot = app.upload("file", "reportpdf", "application/pdf", PDF).await;
    assert_eq!(no_dot.status(), StatusCode::BAD_REQUEST);

    let mismatched = app.upload("file", "report.pdf", "text/html", PDF).await;
    assert_eq!(mismatched.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(mismatched).await["error"], "Please upload a PDF or DOCX file.");

    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn server_enforces_size_limit() {
    let app = TestApp::with_max_size(COPY, COPY, 16).await;

    let response = app.upload("file", "big.pdf", "application/pdf", &[b'x'; 64]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "File size exceeds the 10MB limit.");
    assert!(app.temp_files().is_empty());
}

#[tokio::test]
async fn identical_uploads_get_distinct_artifacts() {
    let app = TestApp::new(COPY, COPY).await;

    let first = body_json(app.upload("file", "same.pdf", "application/pdf", PDF).await).await;
    let second = body_json(app.upload("file", "same.pdf", "application/pdf", PDF).await).await;

    assert_ne!(first["downloadUrl"], second["downloadUrl"]);
    assert_eq!(app.send(get(&download_path(&first))).await.status(), StatusCode::OK);
    assert_eq!(app.send(get(&download_path(&second))).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_results_are_gone() {
    let app = TestApp::new(COPY, COPY).await;
    let json = body_json(app.upload("file", "report.pdf", "application/pdf", PDF).await).await;

    let removed = app.services.result_storage.sweep_expired(chrono::Utc::now() + chrono::Duration::hours(1)).await;
    assert_eq!(removed, 1);

    let response = app.send(get(&download_path(&json))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, serde_json::json!({ "error": "File not found." }));
}

#[tokio::test]
async fn unknown_download_is_404() {
    let app = TestApp::new(COPY, COPY).await;

    let response = app.send(get("/uploads/does-not-exist.docx")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn root_reports_liveness() {
    let app = TestApp::new(COPY, COPY).await;

    let response = app.send(get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"Docstron backend is live!");

    let health = app.send(get("/health")).await;
    assert_eq!(health.status(), StatusCode::OK);

    let links = body_json(app.send(get("/api")).await).await;
    assert_eq!(links["_links"]["convert"], "/api/convert");
}
