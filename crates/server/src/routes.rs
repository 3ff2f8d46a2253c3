use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use faceblur_core::pipeline::blur_remote_video_use_case::{BlurError, BlurOutcome};

use crate::service::BlurService;

pub const SERVICE_NAME: &str = "face-blur-microservice";

const MISSING_URL: &str = "Missing videoUrl parameter";
const PROCESSING_FAILED: &str = "Failed to process video";

type SharedService = Arc<dyn BlurService>;

#[derive(Debug, Deserialize)]
pub struct BlurRequest {
    #[serde(rename = "videoUrl")]
    pub video_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlurResponse {
    pub success: bool,
    pub faces_found: usize,
    pub output_path: String,
    pub file_size: u64,
    pub message: String,
}

impl From<BlurOutcome> for BlurResponse {
    fn from(outcome: BlurOutcome) -> Self {
        Self {
            success: true,
            faces_found: outcome.faces_found,
            output_path: outcome.output_path.to_string_lossy().into_owned(),
            file_size: outcome.file_size,
            message: format!("Blurred {} faces in video", outcome.faces_found),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        success: false,
        error: message.into(),
    };
    (status, Json(body)).into_response()
}

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/blur", post(blur))
        .with_state(service)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

async fn blur(
    State(service): State<SharedService>,
    body: Result<Json<BlurRequest>, JsonRejection>,
) -> Response {
    let url = match body {
        Ok(Json(BlurRequest {
            video_url: Some(url),
        })) => url,
        Ok(_) => return error_response(StatusCode::BAD_REQUEST, MISSING_URL),
        Err(rejection) => {
            log::warn!("Rejected blur request body: {rejection}");
            return error_response(StatusCode::BAD_REQUEST, MISSING_URL);
        }
    };

    log::info!("Received blur request for: {url}");

    let result = tokio::task::spawn_blocking(move || service.blur(&url)).await;

    match result {
        Ok(Ok(outcome)) => {
            log::info!(
                "Blurred {} faces, output {} ({} bytes)",
                outcome.faces_found,
                outcome.output_path.display(),
                outcome.file_size
            );
            (StatusCode::OK, Json(BlurResponse::from(outcome))).into_response()
        }
        Ok(Err(BlurError::Processing(e))) => {
            log::error!("Error processing video: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED)
        }
        Ok(Err(e)) => {
            log::error!("Blur request failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            log::error!("Blur worker panicked: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED)
        }
    }
}
