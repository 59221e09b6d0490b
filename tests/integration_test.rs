use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::Router;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::collections::HashMap;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Use atomic counter to give each test a unique port
static PORT_COUNTER: AtomicU16 = AtomicU16::new(9400);

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct HealthResponse {
    status: String,
    version: String,
    ocr_url: String,
    upstream_reachable: bool,
}

/// In-process stand-in for the OCR service: answers every POST with a canned
/// status and body, and records the query string it was called with
struct MockOcr {
    addr: std::net::SocketAddr,
    last_query: Arc<Mutex<Option<HashMap<String, String>>>>,
}

impl MockOcr {
    async fn start(status: u16, body: &str) -> Self {
        let last_query: Arc<Mutex<Option<HashMap<String, String>>>> =
            Arc::new(Mutex::new(None));
        let canned = (status, body.to_string());

        let record = last_query.clone();
        let app = Router::new()
            .route(
                "/ocr",
                post(
                    move |State((status, body)): State<(u16, String)>,
                          Query(params): Query<HashMap<String, String>>| async move {
                        *record.lock().unwrap() = Some(params);
                        (axum::http::StatusCode::from_u16(status).unwrap(), body)
                    },
                ),
            )
            .route("/health", get(|| async { "ok" }))
            .with_state(canned);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock OCR service");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, last_query }
    }

    fn url(&self) -> String {
        format!("http://{}/ocr", self.addr)
    }

    fn query(&self) -> HashMap<String, String> {
        self.last_query
            .lock()
            .unwrap()
            .clone()
            .expect("Mock OCR service was never called")
    }
}

struct TestServer {
    child: Child,
    port: u16,
}

impl TestServer {
    async fn start(ocr_url: &str) -> Self {
        let port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);

        let child = Command::new(env!("CARGO_BIN_EXE_ocr-harness"))
            .args([
                "--host",
                "127.0.0.1",
                "--port",
                &port.to_string(),
                "--ocr-url",
                ocr_url,
            ])
            .spawn()
            .expect("Failed to start server");

        let server = Self { child, port };
        server.wait_ready().await;
        server
    }

    async fn wait_ready(&self) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", self.base_url()))
                .send()
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready on port {}", self.port);
    }

    fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

fn submission_form(format: &str, enhance: &str) -> Form {
    let part = Part::bytes(b"fake scan bytes".to_vec())
        .file_name("scan.png")
        .mime_str("image/png")
        .unwrap();

    let mut form = Form::new()
        .part("document", part)
        .text("profile", "printed")
        .text("format", format.to_string());
    if !enhance.is_empty() {
        form = form.text("enhance", enhance.to_string());
    }
    form
}

async fn submit(client: &reqwest::Client, base_url: &str, form: Form) -> (u16, String) {
    let response = client
        .post(base_url)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status().as_u16();
    let body = response.text().await.expect("Failed to read response");
    (status, body)
}

#[tokio::test]
async fn test_form_page() {
    let server = TestServer::start("http://127.0.0.1:1/ocr").await;
    let client = reqwest::Client::new();

    let body = client
        .get(server.base_url())
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read response");

    assert!(body.contains("<form method=\"post\""));
    assert!(body.contains("name=\"document\""));
    for value in ["printed", "handwriting", "legal", "scanned", "english", "multilang"] {
        assert!(body.contains(&format!("value=\"{}\"", value)));
    }
    assert!(!body.contains("OCR Result"));
}

#[tokio::test]
async fn test_text_result_is_escaped() {
    let mock = MockOcr::start(200, "<b>hi</b>").await;
    let server = TestServer::start(&mock.url()).await;
    let client = reqwest::Client::new();

    let (status, body) = submit(&client, &server.base_url(), submission_form("text", "")).await;

    assert_eq!(status, 200);
    assert!(body.contains("OCR Result"));
    assert!(body.contains("&lt;b&gt;hi&lt;/b&gt;"));
    assert!(!body.contains("<b>hi</b>"));
}

#[tokio::test]
async fn test_json_result_is_pretty_printed() {
    let mock = MockOcr::start(200, r#"{"a":1}"#).await;
    let server = TestServer::start(&mock.url()).await;
    let client = reqwest::Client::new();

    let (status, body) = submit(&client, &server.base_url(), submission_form("json", "")).await;

    assert_eq!(status, 200);
    assert!(body.contains("{\n    &quot;a&quot;: 1\n}") || body.contains("{\n    \"a\": 1\n}"));

    let query = mock.query();
    assert_eq!(query.get("profile").map(String::as_str), Some("printed"));
    assert_eq!(query.get("output_format").map(String::as_str), Some("json"));
    assert!(!query.contains_key("enhance"));
}

#[tokio::test]
async fn test_html_result_is_sanitized() {
    let mock = MockOcr::start(
        200,
        "<html><body><script>alert(1)</script><p>hi</p></body></html>",
    )
    .await;
    let server = TestServer::start(&mock.url()).await;
    let client = reqwest::Client::new();

    let (status, body) = submit(&client, &server.base_url(), submission_form("html", "")).await;

    assert_eq!(status, 200);
    assert!(!body.contains("alert(1)"));
    assert!(body.contains("<p>hi</p>"));
}

#[tokio::test]
async fn test_enhance_is_forwarded() {
    let mock = MockOcr::start(200, "text").await;
    let server = TestServer::start(&mock.url()).await;
    let client = reqwest::Client::new();

    submit(&client, &server.base_url(), submission_form("text", "contrast")).await;

    let query = mock.query();
    assert_eq!(query.get("enhance").map(String::as_str), Some("contrast"));
}

#[tokio::test]
async fn test_upstream_error_shows_status_code() {
    let mock = MockOcr::start(404, "not found").await;
    let server = TestServer::start(&mock.url()).await;
    let client = reqwest::Client::new();

    let (status, body) = submit(&client, &server.base_url(), submission_form("text", "")).await;

    assert_eq!(status, 200);
    assert!(body.contains("Code: 404"));
    assert!(body.contains("not found"));
}

#[tokio::test]
async fn test_unreachable_upstream_shows_connection_error() {
    // Port 1 is never listening
    let server = TestServer::start("http://127.0.0.1:1/ocr").await;
    let client = reqwest::Client::new();

    let (status, body) = submit(&client, &server.base_url(), submission_form("text", "")).await;

    assert_eq!(status, 200);
    assert!(body.contains("Could not connect to the OCR API"));
    assert!(!body.contains("<pre>"));
}

#[tokio::test]
async fn test_unknown_profile_is_rejected() {
    let mock = MockOcr::start(200, "text").await;
    let server = TestServer::start(&mock.url()).await;
    let client = reqwest::Client::new();

    let part = Part::bytes(b"fake scan bytes".to_vec())
        .file_name("scan.png")
        .mime_str("image/png")
        .unwrap();
    let form = Form::new().part("document", part).text("profile", "cursive");

    let (status, body) = submit(&client, &server.base_url(), form).await;

    assert_eq!(status, 400);
    assert!(body.contains("Unknown profile: cursive"));
}

#[tokio::test]
async fn test_missing_document_is_rejected() {
    let mock = MockOcr::start(200, "text").await;
    let server = TestServer::start(&mock.url()).await;
    let client = reqwest::Client::new();

    let form = Form::new().text("profile", "printed").text("format", "text");
    let (status, body) = submit(&client, &server.base_url(), form).await;

    assert_eq!(status, 400);
    assert!(body.contains("Missing document"));
}

#[tokio::test]
async fn test_health_reports_upstream_reachability() {
    let mock = MockOcr::start(200, "text").await;
    let server = TestServer::start(&mock.url()).await;
    let client = reqwest::Client::new();

    let response: HealthResponse = client
        .get(format!("{}/health", server.base_url()))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.status, "ok");
    assert_eq!(response.ocr_url, mock.url());
    assert!(response.upstream_reachable);
}

#[tokio::test]
async fn test_health_reports_dead_upstream() {
    let server = TestServer::start("http://127.0.0.1:1/ocr").await;
    let client = reqwest::Client::new();

    let response: HealthResponse = client
        .get(format!("{}/health", server.base_url()))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.status, "ok");
    assert!(!response.upstream_reachable);
}
