//! Playback Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    ClosePlaybackCommand, OpenPlaybackCommand, PausePlaybackCommand, PlaybackStateQuery,
    PrefetchPlaybackCommand, SeekPlaybackCommand, TogglePlaybackCommand,
};
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Open
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OpenPlaybackRequest {
    pub set_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct OpenPlaybackResponseDto {
    pub playback_id: String,
    pub set_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_playback_id: Option<String>,
}

pub async fn open_playback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenPlaybackRequest>,
) -> Result<Json<ApiResponse<OpenPlaybackResponseDto>>, ApiError> {
    let result = state
        .open_playback_handler
        .handle(OpenPlaybackCommand { set_id: req.set_id })
        .await?;

    Ok(Json(ApiResponse::success(OpenPlaybackResponseDto {
        playback_id: result.playback_id,
        set_id: result.set_id,
        replaced_playback_id: result.replaced_playback_id,
    })))
}

// ============================================================================
// Toggle
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TogglePlaybackRequest {
    pub message_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TogglePlaybackResponseDto {
    pub message_id: Uuid,
    /// restarted / resumed / paused / switched / unavailable / superseded
    pub outcome: &'static str,
}

pub async fn toggle_playback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TogglePlaybackRequest>,
) -> Result<Json<ApiResponse<TogglePlaybackResponseDto>>, ApiError> {
    let result = state
        .toggle_playback_handler
        .handle(TogglePlaybackCommand {
            message_id: req.message_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(TogglePlaybackResponseDto {
        message_id: result.message_id,
        outcome: result.outcome,
    })))
}

// ============================================================================
// Prefetch / Pause / Seek / Close
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PrefetchPlaybackRequest {
    pub message_id: Uuid,
}

pub async fn prefetch_playback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PrefetchPlaybackRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .prefetch_playback_handler
        .handle(PrefetchPlaybackCommand {
            message_id: req.message_id,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

pub async fn pause_playback(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .pause_playback_handler
        .handle(PausePlaybackCommand)
        .await?;

    Ok(Json(ApiResponse::ok()))
}

#[derive(Debug, Deserialize)]
pub struct SeekPlaybackRequest {
    pub seconds: f64,
}

pub async fn seek_playback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeekPlaybackRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .seek_playback_handler
        .handle(SeekPlaybackCommand {
            seconds: req.seconds,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

#[derive(Debug, Serialize)]
pub struct ClosePlaybackResponseDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_playback_id: Option<String>,
}

pub async fn close_playback(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ClosePlaybackResponseDto>>, ApiError> {
    let result = state
        .close_playback_handler
        .handle(ClosePlaybackCommand)
        .await?;

    Ok(Json(ApiResponse::success(ClosePlaybackResponseDto {
        closed_playback_id: result.closed_playback_id,
    })))
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PlaybackStateDto {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_message_id: Option<Uuid>,
    pub position_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    pub is_paused: bool,
    pub has_ended: bool,
}

pub async fn get_playback_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<PlaybackStateDto>>, ApiError> {
    let result = state
        .get_playback_state_handler
        .handle(PlaybackStateQuery)
        .await?;

    Ok(Json(ApiResponse::success(PlaybackStateDto {
        active: result.active,
        playback_id: result.playback_id,
        set_id: result.set_id,
        current_message_id: result.current_message_id,
        position_secs: result.position_secs,
        duration_secs: result.duration_secs,
        is_paused: result.is_paused,
        has_ended: result.has_ended,
    })))
}
