//! Set Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioStoragePort, MessageRepositoryPort, SetRecord, SetRepositoryPort,
};
use crate::application::queries::{GetSetAudioFilesQuery, GetSetQuery, ListSetsQuery};

// ============================================================================
// Response DTOs
// ============================================================================

/// 语音集详情响应
#[derive(Debug, Clone)]
pub struct SetResponse {
    pub id: Uuid,
    pub name: String,
    pub selected_voice_id: String,
    pub message_count: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SetRecord> for SetResponse {
    fn from(record: SetRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            selected_voice_id: record.selected_voice_id,
            message_count: record.message_count,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// 语音集内单个已生成音频的下载项
#[derive(Debug, Clone)]
pub struct SetAudioFileResponse {
    pub position: u32,
    pub message_id: Uuid,
    pub audio_url: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetSet Handler
pub struct GetSetHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
}

impl GetSetHandler {
    pub fn new(set_repo: Arc<dyn SetRepositoryPort>) -> Self {
        Self { set_repo }
    }

    pub async fn handle(&self, query: GetSetQuery) -> Result<SetResponse, ApplicationError> {
        let set = self
            .set_repo
            .find_by_id(query.set_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Set", query.set_id))?;

        Ok(SetResponse::from(set))
    }
}

/// ListSets Handler
pub struct ListSetsHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
}

impl ListSetsHandler {
    pub fn new(set_repo: Arc<dyn SetRepositoryPort>) -> Self {
        Self { set_repo }
    }

    pub async fn handle(&self, _query: ListSetsQuery) -> Result<Vec<SetResponse>, ApplicationError> {
        let sets = self.set_repo.find_all().await?;
        Ok(sets.into_iter().map(SetResponse::from).collect())
    }
}

/// GetSetAudioFiles Handler - 导出清单
///
/// 只包含存在已生成音频的消息；指向丢失文件的记录被跳过
pub struct GetSetAudioFilesHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
    message_repo: Arc<dyn MessageRepositoryPort>,
    audio_storage: Arc<dyn AudioStoragePort>,
    base_url: String,
}

impl GetSetAudioFilesHandler {
    pub fn new(
        set_repo: Arc<dyn SetRepositoryPort>,
        message_repo: Arc<dyn MessageRepositoryPort>,
        audio_storage: Arc<dyn AudioStoragePort>,
        base_url: String,
    ) -> Self {
        Self {
            set_repo,
            message_repo,
            audio_storage,
            base_url,
        }
    }

    pub async fn handle(
        &self,
        query: GetSetAudioFilesQuery,
    ) -> Result<Vec<SetAudioFileResponse>, ApplicationError> {
        self.set_repo
            .find_by_id(query.set_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Set", query.set_id))?;

        let messages = self.message_repo.find_by_set(query.set_id).await?;

        let mut files = Vec::new();
        for message in messages {
            let Some(meta) = &message.last_generation else {
                continue;
            };
            if !self.audio_storage.exists(meta.clip_id).await {
                tracing::warn!(
                    message_id = %message.id,
                    clip_id = %meta.clip_id,
                    "Skipping export entry with missing clip"
                );
                continue;
            }
            files.push(SetAudioFileResponse {
                position: message.position,
                message_id: message.id,
                audio_url: format!("{}/api/audio/file/{}", self.base_url, meta.clip_id),
            });
        }

        Ok(files)
    }
}
