//! Reel submission, status, retrieval and deletion handlers.

use std::io::SeekFrom;
use std::path::PathBuf;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::info;
use validator::Validate;

use reel_models::{Job, JobId, ReelRequest, ReelResponse};
use reel_worker::JobPaths;

use crate::error::{ApiError, ApiResult};
use crate::range::{parse_range, RangeRequest};
use crate::state::AppState;

const VIDEO_MIME: &str = "video/mp4";

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Start generating a reel in the background.
pub async fn generate_reel(
    State(state): State<AppState>,
    payload: Result<Json<ReelRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ReelResponse>)> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    request.validate()?;

    let response = state.executor.submit(request).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Current state of a job.
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Job>> {
    let job = state.store.get(&JobId::from_string(job_id)).await?;
    Ok(Json(job))
}

/// Where a completed job's video lives.
fn output_path(state: &AppState, job: &Job) -> PathBuf {
    job.output_path
        .clone()
        .unwrap_or_else(|| JobPaths::new(state.executor.config(), &job.job_id).output_path)
}

/// Open a video for streaming, returning the handle and its size.
async fn open_video(path: &std::path::Path) -> ApiResult<(File, u64)> {
    let file = File::open(path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to open video: {}", e)))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read video metadata: {}", e)))?
        .len();
    Ok((file, len))
}

/// Download the finished MP4 as an attachment.
pub async fn download_reel(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    let job = state.store.get(&JobId::from_string(job_id)).await?;

    if !job.is_completed() {
        return Err(ApiError::bad_request(format!(
            "Video is not ready. Current status: {}",
            job.status
        )));
    }

    let path = output_path(&state, &job);
    if !path.exists() {
        return Err(ApiError::not_found("Video file not found"));
    }

    let (file, len) = open_video(&path).await?;
    info!(job_id = %job.job_id, bytes = len, "serving download");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, VIDEO_MIME)
        .header(header::CONTENT_LENGTH, len)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=reel_{}.mp4", job.job_id.short()),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}

/// Stream the finished MP4 inline, honouring a single byte range.
pub async fn preview_reel(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let job = match state.store.get(&JobId::from_string(job_id)).await {
        Ok(job) if job.is_completed() => job,
        _ => return Err(ApiError::not_found("Video not available")),
    };

    let path = output_path(&state, &job);
    let (mut file, total) = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => open_video(&path).await?,
        _ => return Err(ApiError::not_found("File not found")),
    };

    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    let builder = Response::builder()
        .header(header::CONTENT_TYPE, VIDEO_MIME)
        .header(header::ACCEPT_RANGES, "bytes")
        .header("Cross-Origin-Resource-Policy", "cross-origin");

    let response = match parse_range(range_header, total) {
        RangeRequest::Full => builder
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, total)
            .body(Body::from_stream(ReaderStream::new(file))),
        RangeRequest::Partial(range) => {
            file.seek(SeekFrom::Start(range.start))
                .await
                .map_err(|e| ApiError::internal(format!("Failed to seek video: {}", e)))?;
            let body = Body::from_stream(ReaderStream::new(file.take(range.length())));
            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_RANGE, range.content_range(total))
                .header(header::CONTENT_LENGTH, range.length())
                .body(body)
        }
        RangeRequest::Unsatisfiable => builder
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{}", total))
            .body(Body::empty()),
    };

    response.map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}

/// Remove a job and its files.
pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.executor.delete(&JobId::from_string(job_id)).await?;
    Ok(Json(MessageResponse {
        message: "Job deleted successfully".to_string(),
    }))
}
