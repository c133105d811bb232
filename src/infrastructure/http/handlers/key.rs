//! Key Handlers
//!
//! API key 只进不出：store 接收明文并加密落库，status 只报告有无

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{ApiKeyStatusQuery, StoreApiKeyCommand};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Deserialize)]
pub struct StoreApiKeyRequest {
    pub api_key: String,
}

// 手写 Debug，避免明文 key 进日志
impl std::fmt::Debug for StoreApiKeyRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreApiKeyRequest")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiKeyStatusDto {
    pub configured: bool,
}

pub async fn store_api_key(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StoreApiKeyRequest>,
) -> Result<Json<ApiResponse<ApiKeyStatusDto>>, ApiError> {
    let result = state
        .store_api_key_handler
        .handle(StoreApiKeyCommand {
            api_key: req.api_key,
        })
        .await?;

    Ok(Json(ApiResponse::success(ApiKeyStatusDto {
        configured: result.configured,
    })))
}

pub async fn api_key_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ApiKeyStatusDto>>, ApiError> {
    let result = state.api_key_status_handler.handle(ApiKeyStatusQuery).await?;

    Ok(Json(ApiResponse::success(ApiKeyStatusDto {
        configured: result.configured,
    })))
}
