//! Message Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    CreateMessageCommand, DeleteMessageCommand, GetMessageQuery, ListMessagesQuery,
    MessageResponse, QueryGenerationStatusCommand, SubmitGenerationCommand, UpdateMessageCommand,
};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Create
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub set_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CreateMessageResponseDto {
    pub message_id: Uuid,
    pub set_id: Uuid,
    pub position: u32,
    pub current_text: String,
}

pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Json<ApiResponse<CreateMessageResponseDto>>, ApiError> {
    let result = state
        .create_message_handler
        .handle(CreateMessageCommand { set_id: req.set_id })
        .await?;

    Ok(Json(ApiResponse::success(CreateMessageResponseDto {
        message_id: result.message_id,
        set_id: result.set_id,
        position: result.position,
        current_text: result.current_text,
    })))
}

// ============================================================================
// Update
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateMessageRequest {
    pub message_id: Uuid,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateMessageResponseDto {
    pub message_id: Uuid,
}

pub async fn update_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<Json<ApiResponse<UpdateMessageResponseDto>>, ApiError> {
    let result = state
        .update_message_handler
        .handle(UpdateMessageCommand {
            message_id: req.message_id,
            text: req.text,
        })
        .await?;

    Ok(Json(ApiResponse::success(UpdateMessageResponseDto {
        message_id: result.message_id,
    })))
}

// ============================================================================
// Delete
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DeleteMessageRequest {
    pub message_id: Uuid,
    pub set_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DeleteMessageResponseDto {
    pub message_id: Uuid,
    pub shifted_messages: usize,
}

pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteMessageRequest>,
) -> Result<Json<ApiResponse<DeleteMessageResponseDto>>, ApiError> {
    let result = state
        .delete_message_handler
        .handle(DeleteMessageCommand {
            message_id: req.message_id,
            set_id: req.set_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(DeleteMessageResponseDto {
        message_id: result.message_id,
        shifted_messages: result.shifted_messages,
    })))
}

// ============================================================================
// Get / List
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetMessageRequest {
    pub message_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesRequest {
    pub set_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct GenerationMetaDto {
    pub text: String,
    pub voice_id: String,
    pub clip_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub set_id: Uuid,
    pub position: u32,
    pub current_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_generation: Option<GenerationMetaDto>,
    pub updated_at: String,
}

impl From<MessageResponse> for MessageDto {
    fn from(message: MessageResponse) -> Self {
        Self {
            id: message.id,
            set_id: message.set_id,
            position: message.position,
            current_text: message.current_text,
            last_generation: message.last_generation.map(|meta| GenerationMetaDto {
                text: meta.text,
                voice_id: meta.voice_id,
                clip_id: meta.clip_id,
                duration_ms: meta.duration_ms,
            }),
            updated_at: message.updated_at,
        }
    }
}

pub async fn get_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetMessageRequest>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let result = state
        .get_message_handler
        .handle(GetMessageQuery {
            message_id: req.message_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(MessageDto::from(result))))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListMessagesRequest>,
) -> Result<Json<ApiResponse<Vec<MessageDto>>>, ApiError> {
    let result = state
        .list_messages_handler
        .handle(ListMessagesQuery { set_id: req.set_id })
        .await?;

    Ok(Json(ApiResponse::success(
        result.into_iter().map(MessageDto::from).collect(),
    )))
}

// ============================================================================
// Generation
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitGenerationRequest {
    pub message_id: Uuid,
    /// 客户端编辑态的最新文本（数据库写入是防抖的）
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitGenerationResponseDto {
    pub task_id: String,
    pub message_id: Uuid,
}

pub async fn submit_generation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitGenerationRequest>,
) -> Result<Json<ApiResponse<SubmitGenerationResponseDto>>, ApiError> {
    let result = state
        .submit_generation_handler
        .handle(SubmitGenerationCommand {
            message_id: req.message_id,
            text: req.text,
        })
        .await?;

    Ok(Json(ApiResponse::success(SubmitGenerationResponseDto {
        task_id: result.task_id,
        message_id: result.message_id,
    })))
}

#[derive(Debug, Deserialize)]
pub struct QueryGenerationStatusRequest {
    pub task_id: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationStatusDto {
    pub task_id: String,
    pub message_id: Uuid,
    pub state: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn query_generation_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryGenerationStatusRequest>,
) -> Result<Json<ApiResponse<GenerationStatusDto>>, ApiError> {
    let result = state
        .query_generation_status_handler
        .handle(QueryGenerationStatusCommand {
            task_id: req.task_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(GenerationStatusDto {
        task_id: result.task_id,
        message_id: result.message_id,
        state: result.state.as_str().to_string(),
        created_at: result.created_at.to_rfc3339(),
        completed_at: result.completed_at.map(|t| t.to_rfc3339()),
        error: result.error_message,
    })))
}
