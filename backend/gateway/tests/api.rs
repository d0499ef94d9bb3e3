//! HTTP surface tests: a real listener on an ephemeral port, an in-memory
//! backend behind it, and reqwest driving the routes.

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use formlens_core::ServiceError;
use formlens_extraction::MockExtractor;
use formlens_gateway::{build_router, AppState};
use formlens_pipeline::{FeedbackListing, UploadPipeline};
use formlens_sheets::RecordingSheetMirror;
use formlens_storage::{InMemoryFeedbackStore, InMemoryObjectStore};

struct TestServer {
    addr: SocketAddr,
    objects: Arc<InMemoryObjectStore>,
    store: Arc<InMemoryFeedbackStore>,
    sheet: Arc<RecordingSheetMirror>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

async fn serve(extractor: MockExtractor) -> TestServer {
    serve_with(InMemoryObjectStore::new(), extractor).await
}

async fn serve_with(objects: InMemoryObjectStore, extractor: MockExtractor) -> TestServer {
    let objects = Arc::new(objects);
    let store = Arc::new(InMemoryFeedbackStore::new());
    let sheet = Arc::new(RecordingSheetMirror::new());
    let pipeline = UploadPipeline::new(
        objects.clone(),
        Arc::new(extractor),
        store.clone(),
        sheet.clone(),
    );
    let listing = FeedbackListing::new(store.clone());
    let state = Arc::new(AppState::new(pipeline, listing));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    TestServer {
        addr,
        objects,
        store,
        sheet,
    }
}

/// Ten kilobytes of JPEG-looking bytes, the size of a small phone scan.
fn form_image() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(10 * 1024, 0x5A);
    bytes
}

fn image_form(filename: &str) -> Form {
    let part = Part::bytes(form_image())
        .file_name(filename.to_string())
        .mime_str("image/jpeg")
        .unwrap();
    Form::new().part("image", part)
}

#[tokio::test]
async fn upload_digitizes_and_lists_a_form() {
    let server = serve(MockExtractor::new()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/upload"))
        .multipart(image_form("form1.jpg"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    let data = &body["data"];
    let uid = data["uid"].as_str().unwrap().to_string();
    Uuid::parse_str(&uid).unwrap();
    assert_eq!(
        data["imageUrl"].as_str().unwrap(),
        format!("memory://forms/{uid}-form1.jpg")
    );
    assert_eq!(data["Program"], "Happiness Program");
    assert_eq!(data["Name"], "A. Sharma");
    assert!(data["uploadedAt"].as_str().unwrap().ends_with('Z'));

    let stored = server
        .objects
        .object(&format!("forms/{uid}-form1.jpg"))
        .unwrap();
    assert_eq!(stored.bytes, form_image());
    assert_eq!(stored.content_type, "image/jpeg");
    assert_eq!(server.sheet.rows()[0][0], uid);

    let listed: Vec<Value> = client
        .get(server.url("/api/feedback"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], uid.as_str());
    assert_eq!(listed[0]["uid"], uid.as_str());
    assert_eq!(listed[0]["Room No"], "B-201");
}

#[tokio::test]
async fn each_upload_gets_a_fresh_uid() {
    let server = serve(MockExtractor::new()).await;
    let client = reqwest::Client::new();

    let mut uids = Vec::new();
    for _ in 0..2 {
        let body: Value = client
            .post(server.url("/api/upload"))
            .multipart(image_form("form1.jpg"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        uids.push(body["data"]["uid"].as_str().unwrap().to_string());
    }
    assert_ne!(uids[0], uids[1]);

    let listed: Vec<Value> = client
        .get(server.url("/api/feedback"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn upload_without_image_field_is_rejected() {
    let server = serve(MockExtractor::new()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/upload"))
        .multipart(Form::new().text("note", "no file here"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "No image file provided" }));
    assert!(server.objects.is_empty());
    assert!(server.store.is_empty());
}

#[tokio::test]
async fn non_multipart_upload_is_rejected() {
    let server = serve(MockExtractor::new()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/upload"))
        .json(&json!({ "image": "zm9v" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "No image file provided");
}

#[tokio::test]
async fn unprovisioned_storage_surfaces_as_503() {
    let objects = InMemoryObjectStore::failing(ServiceError::unavailable(
        "Storage service not available",
        "Please ensure Firebase Storage is enabled and bucket is created",
        "bucket not found",
    ));
    let server = serve_with(objects, MockExtractor::new()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/upload"))
        .multipart(image_form("form1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Storage service not available");
    assert_eq!(
        body["message"],
        "Please ensure Firebase Storage is enabled and bucket is created"
    );
    assert_eq!(body["details"], "bucket not found");
    assert!(server.store.is_empty());
    assert!(server.sheet.is_empty());
}

#[tokio::test]
async fn unparseable_model_reply_surfaces_as_500() {
    let server = serve(MockExtractor::new().with_reply("I could not read this form")).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/upload"))
        .multipart(image_form("form1.jpg"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Failed to process upload");
    assert_eq!(body["code"], "extraction_parse_error");
    // The image had already been stored by the time extraction ran.
    assert_eq!(server.objects.len(), 1);
    assert!(server.store.is_empty());
}

#[tokio::test]
async fn root_banner_is_served() {
    let server = serve(MockExtractor::new()).await;
    let body: Value = reqwest::get(server.url("/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body,
        json!({ "message": "FormLens OCR Backend Server is running" })
    );
}

#[tokio::test]
async fn health_reports_the_service() {
    let server = serve(MockExtractor::new()).await;
    let body: Value = reqwest::get(server.url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "formlens");
}

#[tokio::test]
async fn feedback_listing_starts_empty_and_never_initializes() {
    let server = serve(MockExtractor::new()).await;

    let res = reqwest::get(server.url("/api/feedback")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: Vec<Value> = res.json().await.unwrap();
    assert!(listed.is_empty());
    assert_eq!(server.store.init_calls(), 0);
}

#[tokio::test]
async fn dashboard_is_served_inline() {
    let server = serve(MockExtractor::new()).await;

    let res = reqwest::get(server.url("/ui")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    assert!(res.text().await.unwrap().contains("FormLens"));
}
