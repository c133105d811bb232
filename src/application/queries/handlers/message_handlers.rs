//! Message Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::handlers::resolve_clip_url;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioStoragePort, GenerationMeta, MessageRecord, MessageRepositoryPort, SetRepositoryPort,
};
use crate::application::queries::{GetMessageQuery, ListMessagesQuery, ResolveAudioUrlQuery};

// ============================================================================
// Response DTOs
// ============================================================================

/// 生成元数据响应
#[derive(Debug, Clone)]
pub struct GenerationMetaResponse {
    pub text: String,
    pub voice_id: String,
    pub clip_id: Uuid,
    pub duration_ms: Option<u64>,
}

impl From<&GenerationMeta> for GenerationMetaResponse {
    fn from(meta: &GenerationMeta) -> Self {
        Self {
            text: meta.text.clone(),
            voice_id: meta.voice_id.clone(),
            clip_id: meta.clip_id,
            duration_ms: meta.duration_ms,
        }
    }
}

/// 消息详情响应
#[derive(Debug, Clone)]
pub struct MessageResponse {
    pub id: Uuid,
    pub set_id: Uuid,
    pub position: u32,
    pub current_text: String,
    pub last_generation: Option<GenerationMetaResponse>,
    pub updated_at: String,
}

impl From<MessageRecord> for MessageResponse {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            set_id: record.set_id,
            position: record.position,
            current_text: record.current_text,
            last_generation: record.last_generation.as_ref().map(GenerationMetaResponse::from),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// 播放 URL 解析结果
#[derive(Debug, Clone)]
pub struct ResolvedAudioUrl {
    pub message_id: Uuid,
    /// None 表示该消息尚无可播放音频
    pub audio_url: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetMessage Handler
pub struct GetMessageHandler {
    message_repo: Arc<dyn MessageRepositoryPort>,
}

impl GetMessageHandler {
    pub fn new(message_repo: Arc<dyn MessageRepositoryPort>) -> Self {
        Self { message_repo }
    }

    pub async fn handle(&self, query: GetMessageQuery) -> Result<MessageResponse, ApplicationError> {
        let message = self
            .message_repo
            .find_by_id(query.message_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Message", query.message_id))?;

        Ok(MessageResponse::from(message))
    }
}

/// ListMessages Handler
pub struct ListMessagesHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
    message_repo: Arc<dyn MessageRepositoryPort>,
}

impl ListMessagesHandler {
    pub fn new(
        set_repo: Arc<dyn SetRepositoryPort>,
        message_repo: Arc<dyn MessageRepositoryPort>,
    ) -> Self {
        Self {
            set_repo,
            message_repo,
        }
    }

    pub async fn handle(
        &self,
        query: ListMessagesQuery,
    ) -> Result<Vec<MessageResponse>, ApplicationError> {
        self.set_repo
            .find_by_id(query.set_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Set", query.set_id))?;

        let messages = self.message_repo.find_by_set(query.set_id).await?;
        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }
}

/// ResolveAudioUrl Handler
///
/// 远程客户端的 resolvePlaybackUrl 边界：无音频返回空而不是错误
pub struct ResolveAudioUrlHandler {
    message_repo: Arc<dyn MessageRepositoryPort>,
    audio_storage: Arc<dyn AudioStoragePort>,
    base_url: String,
}

impl ResolveAudioUrlHandler {
    pub fn new(
        message_repo: Arc<dyn MessageRepositoryPort>,
        audio_storage: Arc<dyn AudioStoragePort>,
        base_url: String,
    ) -> Self {
        Self {
            message_repo,
            audio_storage,
            base_url,
        }
    }

    pub async fn handle(
        &self,
        query: ResolveAudioUrlQuery,
    ) -> Result<ResolvedAudioUrl, ApplicationError> {
        // 消息必须存在；是否有音频则是合法的两态
        self.message_repo
            .find_by_id(query.message_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Message", query.message_id))?;

        let url = resolve_clip_url(
            self.message_repo.clone(),
            self.audio_storage.clone(),
            self.base_url.clone(),
            query.message_id,
        )
        .await
        .map_err(|e| ApplicationError::internal(e.to_string()))?;

        Ok(ResolvedAudioUrl {
            message_id: query.message_id,
            audio_url: url.map(|u| u.as_str().to_string()),
        })
    }
}
