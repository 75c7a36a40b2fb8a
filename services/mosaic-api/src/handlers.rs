//! HTTP handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use mosaic_common::{FrameTime, MosaicError};

use crate::pipeline::MosaicRequest;
use crate::state::AppState;

/// A [`MosaicError`] rendered as `{error, message}` with its HTTP status.
#[derive(Debug)]
pub struct ApiError(pub MosaicError);

impl From<MosaicError> for ApiError {
    fn from(err: MosaicError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "error": self.0.error_code(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchFramesResponse {
    pub message: String,
    pub session_id: String,
    pub directory: String,
    pub frames: Vec<String>,
    pub skipped: Vec<String>,
    pub cols: u32,
    pub rows: u32,
}

/// POST /fetch-stitched-frames
pub async fn fetch_stitched_frames(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<MosaicRequest>,
) -> Result<Json<FetchFramesResponse>, ApiError> {
    state.metrics.record_mosaic_request();

    let outcome = state.pipeline.generate(&request).await.map_err(|e| {
        warn!(error = %e, "Mosaic request rejected");
        state.metrics.record_error(e.error_code());
        ApiError(e)
    })?;

    Ok(Json(FetchFramesResponse {
        message: "Frames stitched successfully".to_string(),
        session_id: outcome.session.id.to_string(),
        directory: outcome.session.dir().display().to_string(),
        frames: labels(&outcome.frames),
        skipped: labels(&outcome.skipped),
        cols: outcome.cols,
        rows: outcome.rows,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoResponse {
    pub message: String,
    pub video_path: String,
    pub frame_count: usize,
}

/// POST /interpolate-and-generate-video
pub async fn interpolate_and_generate_video(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<VideoRequest>,
) -> Result<Json<VideoResponse>, ApiError> {
    state.metrics.record_video_request();

    let result = match state.sessions.resolve(&request.session_id).await {
        Ok(session) => state.orchestrator.run(&session).await,
        Err(e) => Err(e),
    };

    let artifact = result.map_err(|e| {
        state.metrics.record_error(e.error_code());
        ApiError(e)
    })?;
    state.metrics.record_video_encoded();

    Ok(Json(VideoResponse {
        message: "Interpolation and video generation complete".to_string(),
        video_path: artifact.path.display().to_string(),
        frame_count: artifact.frame_count,
    }))
}

/// DELETE /sessions/:session_id
pub async fn delete_session(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.destroy(&session_id).await?;
    info!(session_id = %session_id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "sessions": state.sessions.tracked_count().await,
        "uptime_secs": state.metrics.uptime_secs(),
    }))
}

/// GET /metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let mut body = state.metrics.render();
    if let Some(handle) = &state.prometheus {
        body.push_str(&handle.render());
    }
    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

fn labels(times: &[FrameTime]) -> Vec<String> {
    times.iter().map(FrameTime::to_hhmm).collect()
}
