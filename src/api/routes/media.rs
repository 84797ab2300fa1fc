//! Metadata lookup and job submission handlers.

use super::{InfoRequest, StartDownloadRequest, StartDownloadResponse, json_body};
use crate::api::AppState;
use crate::error::{Error, Result};
use crate::types::{DownloadRequest, VideoInfo};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

/// POST /api/info - Fetch metadata and available formats
#[utoipa::path(
    post,
    path = "/api/info",
    tag = "media",
    request_body = InfoRequest,
    responses(
        (status = 200, description = "Media metadata and formats", body = VideoInfo),
        (status = 400, description = "Missing or invalid URL", body = crate::error::ApiError),
        (status = 502, description = "The engine could not extract the URL", body = crate::error::ApiError),
        (status = 503, description = "The engine is not installed", body = crate::error::ApiError)
    )
)]
pub async fn get_info(
    State(state): State<AppState>,
    body: std::result::Result<Json<InfoRequest>, JsonRejection>,
) -> Result<Json<VideoInfo>> {
    let request = json_body(body)?;
    let url = request
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| Error::Validation("Missing url".to_string()))?;

    let info = state.downloader.fetch_info(&url).await?;
    Ok(Json(info))
}

/// POST /api/download - Start a background download job
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "media",
    request_body = StartDownloadRequest,
    responses(
        (status = 200, description = "Job accepted", body = StartDownloadResponse),
        (status = 400, description = "Missing url or format_id", body = crate::error::ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    body: std::result::Result<Json<StartDownloadRequest>, JsonRejection>,
) -> Result<Json<StartDownloadResponse>> {
    let request = json_body(body)?;

    let (Some(url), Some(format_id)) = (request.url, request.format_id) else {
        return Err(Error::Validation("Missing url or format_id".to_string()));
    };

    let session_id = state
        .downloader
        .start_download(DownloadRequest {
            url,
            format_id,
            filename: request.filename,
            title: request.title,
        })
        .await?;

    Ok(Json(StartDownloadResponse { session_id }))
}
