//! Audio Handlers

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::application::ResolveAudioUrlQuery;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Resolve
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ResolveAudioUrlRequest {
    pub message_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ResolvedAudioUrlDto {
    pub message_id: Uuid,
    /// null 表示该消息尚无可播放音频
    pub audio_url: Option<String>,
}

pub async fn resolve_audio_url(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveAudioUrlRequest>,
) -> Result<Json<ApiResponse<ResolvedAudioUrlDto>>, ApiError> {
    let result = state
        .resolve_audio_url_handler
        .handle(ResolveAudioUrlQuery {
            message_id: req.message_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(ResolvedAudioUrlDto {
        message_id: result.message_id,
        audio_url: result.audio_url,
    })))
}

// ============================================================================
// Stream
// ============================================================================

/// 流式下载音频（播放 URL 的服务端）
pub async fn stream_clip(
    State(state): State<Arc<AppState>>,
    Path(clip_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let path = state.audio_storage.clip_path(clip_id);

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("Clip not found: {}", clip_id)));
        }
        Err(e) => return Err(ApiError::Internal(e.to_string())),
    };

    let content_length = file
        .metadata()
        .await
        .map(|meta| meta.len())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
