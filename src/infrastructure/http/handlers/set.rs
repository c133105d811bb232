//! Set Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    CreateSetCommand, DeleteSetCommand, GetSetAudioFilesQuery, GetSetQuery, ListSetsQuery,
    ListVoicesQuery, UpdateSetCommand,
};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Create
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSetRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSetResponseDto {
    pub set_id: Uuid,
    pub message_id: Uuid,
}

pub async fn create_set(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSetRequest>,
) -> Result<Json<ApiResponse<CreateSetResponseDto>>, ApiError> {
    let cmd = CreateSetCommand { name: req.name };

    let result = state.create_set_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(CreateSetResponseDto {
        set_id: result.set_id,
        message_id: result.message_id,
    })))
}

// ============================================================================
// Update
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateSetRequest {
    pub set_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub selected_voice_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateSetResponseDto {
    pub set_id: Uuid,
    pub name: String,
    pub selected_voice_id: String,
}

pub async fn update_set(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateSetRequest>,
) -> Result<Json<ApiResponse<UpdateSetResponseDto>>, ApiError> {
    let cmd = UpdateSetCommand {
        set_id: req.set_id,
        name: req.name,
        selected_voice_id: req.selected_voice_id,
    };

    let result = state.update_set_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(UpdateSetResponseDto {
        set_id: result.set_id,
        name: result.name,
        selected_voice_id: result.selected_voice_id,
    })))
}

// ============================================================================
// Delete
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DeleteSetRequest {
    pub set_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DeleteSetResponseDto {
    pub set_id: Uuid,
    pub deleted_messages: usize,
    pub deleted_clips: usize,
}

pub async fn delete_set(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteSetRequest>,
) -> Result<Json<ApiResponse<DeleteSetResponseDto>>, ApiError> {
    let cmd = DeleteSetCommand { set_id: req.set_id };

    let result = state.delete_set_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(DeleteSetResponseDto {
        set_id: result.set_id,
        deleted_messages: result.deleted_messages,
        deleted_clips: result.deleted_clips,
    })))
}

// ============================================================================
// Get / List
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetSetRequest {
    pub set_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SetDto {
    pub id: Uuid,
    pub name: String,
    pub selected_voice_id: String,
    pub message_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::application::SetResponse> for SetDto {
    fn from(set: crate::application::SetResponse) -> Self {
        Self {
            id: set.id,
            name: set.name,
            selected_voice_id: set.selected_voice_id,
            message_count: set.message_count,
            created_at: set.created_at,
            updated_at: set.updated_at,
        }
    }
}

pub async fn get_set(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetSetRequest>,
) -> Result<Json<ApiResponse<SetDto>>, ApiError> {
    let result = state
        .get_set_handler
        .handle(GetSetQuery { set_id: req.set_id })
        .await?;

    Ok(Json(ApiResponse::success(SetDto::from(result))))
}

pub async fn list_sets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<SetDto>>>, ApiError> {
    let result = state.list_sets_handler.handle(ListSetsQuery).await?;

    Ok(Json(ApiResponse::success(
        result.into_iter().map(SetDto::from).collect(),
    )))
}

// ============================================================================
// Audio files (导出清单)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetSetAudioFilesRequest {
    pub set_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SetAudioFileDto {
    pub position: u32,
    pub message_id: Uuid,
    pub audio_url: String,
}

pub async fn get_set_audio_files(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetSetAudioFilesRequest>,
) -> Result<Json<ApiResponse<Vec<SetAudioFileDto>>>, ApiError> {
    let result = state
        .get_set_audio_files_handler
        .handle(GetSetAudioFilesQuery { set_id: req.set_id })
        .await?;

    Ok(Json(ApiResponse::success(
        result
            .into_iter()
            .map(|file| SetAudioFileDto {
                position: file.position,
                message_id: file.message_id,
                audio_url: file.audio_url,
            })
            .collect(),
    )))
}

// ============================================================================
// Voices (内置目录)
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoiceDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub legacy: bool,
}

pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<VoiceDto>>>, ApiError> {
    let result = state.list_voices_handler.handle(ListVoicesQuery).await?;

    Ok(Json(ApiResponse::success(
        result
            .into_iter()
            .map(|voice| VoiceDto {
                id: voice.id,
                name: voice.name,
                description: voice.description,
                legacy: voice.legacy,
            })
            .collect(),
    )))
}
