use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use faceblur_core::download::domain::video_fetcher::FetchError;
use faceblur_core::pipeline::blur_remote_video_use_case::{BlurError, BlurOutcome};
use faceblur_server::router;
use faceblur_server::service::BlurService;

// --- Stubs ---

enum Reply {
    Faces(usize),
    ProcessingFails,
    DownloadFails,
}

struct StubService {
    reply: Reply,
    urls: Mutex<Vec<String>>,
}

impl StubService {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            urls: Mutex::new(Vec::new()),
        })
    }
}

impl BlurService for StubService {
    fn blur(&self, url: &str) -> Result<BlurOutcome, BlurError> {
        self.urls.lock().unwrap().push(url.to_string());
        match self.reply {
            Reply::Faces(n) => Ok(BlurOutcome {
                faces_found: n,
                output_path: PathBuf::from("/tmp/abc_blurred.mp4"),
                file_size: 1234,
            }),
            Reply::ProcessingFails => Err(BlurError::Processing("could not open video file".into())),
            Reply::DownloadFails => Err(BlurError::Fetch(FetchError::TempFile(
                std::io::Error::other("disk full"),
            ))),
        }
    }
}

// --- Helpers ---

async fn send(service: Arc<StubService>, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(service).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(body: &str) -> Request<Body> {
    Request::post("/blur")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn missing_url_body() -> Value {
    json!({"success": false, "error": "Missing videoUrl parameter"})
}

// --- Tests ---

#[tokio::test]
async fn health_is_always_ok() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(StubService::new(Reply::ProcessingFails), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "service": "face-blur-microservice"})
    );
}

#[tokio::test]
async fn blur_success_reports_outcome() {
    let service = StubService::new(Reply::Faces(42));
    let (status, body) = send(
        service.clone(),
        post_json(r#"{"videoUrl": "https://cdn.example.com/clip.mp4"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "facesFound": 42,
            "outputPath": "/tmp/abc_blurred.mp4",
            "fileSize": 1234,
            "message": "Blurred 42 faces in video"
        })
    );
    assert_eq!(
        *service.urls.lock().unwrap(),
        vec!["https://cdn.example.com/clip.mp4".to_string()]
    );
}

#[tokio::test]
async fn blur_with_zero_faces_still_succeeds() {
    let (status, body) = send(
        StubService::new(Reply::Faces(0)),
        post_json(r#"{"videoUrl": "https://cdn.example.com/empty.mp4"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["facesFound"], 0);
    assert_eq!(body["message"], "Blurred 0 faces in video");
}

#[tokio::test]
async fn blur_without_video_url_is_bad_request() {
    let service = StubService::new(Reply::Faces(1));
    let (status, body) = send(service.clone(), post_json(r#"{"url": "x"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, missing_url_body());
    assert!(service.urls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn blur_with_invalid_json_is_bad_request() {
    let (status, body) = send(StubService::new(Reply::Faces(1)), post_json("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, missing_url_body());
}

#[tokio::test]
async fn blur_without_body_is_bad_request() {
    let request = Request::post("/blur").body(Body::empty()).unwrap();
    let (status, body) = send(StubService::new(Reply::Faces(1)), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, missing_url_body());
}

#[tokio::test]
async fn blur_with_null_video_url_is_bad_request() {
    let (status, body) = send(
        StubService::new(Reply::Faces(1)),
        post_json(r#"{"videoUrl": null}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, missing_url_body());
}

#[tokio::test]
async fn processing_failure_hides_details() {
    let (status, body) = send(
        StubService::new(Reply::ProcessingFails),
        post_json(r#"{"videoUrl": "https://cdn.example.com/broken.mp4"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "error": "Failed to process video"})
    );
}

#[tokio::test]
async fn download_failure_reports_error_message() {
    let (status, body) = send(
        StubService::new(Reply::DownloadFails),
        post_json(r#"{"videoUrl": "https://cdn.example.com/clip.mp4"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "failed to write temporary video file: disk full"
    );
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let request = Request::get("/nope").body(Body::empty()).unwrap();
    let response = router(StubService::new(Reply::Faces(0)))
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
