//! Set Command Handlers

use std::sync::Arc;

use crate::application::commands::set_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioStoragePort, GenerationTaskPort, MessageRecord, MessageRepositoryPort, SetRecord,
    SetRepositoryPort,
};
use crate::domain::set::{MessageText, Position, SetName, VoiceMessage, VoiceSet, FIRST_MESSAGE_TEXT};
use crate::domain::voice::VoiceId;
use crate::infrastructure::events::EventPublisher;

/// CreateSet Handler - 创建语音集并附带种子消息
pub struct CreateSetHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
    message_repo: Arc<dyn MessageRepositoryPort>,
    event_publisher: Arc<EventPublisher>,
}

impl CreateSetHandler {
    pub fn new(
        set_repo: Arc<dyn SetRepositoryPort>,
        message_repo: Arc<dyn MessageRepositoryPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            set_repo,
            message_repo,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: CreateSetCommand) -> Result<CreateSetResponse, ApplicationError> {
        let name = SetName::new(cmd.name).map_err(ApplicationError::validation)?;

        let set = VoiceSet::new(name);
        let seed = VoiceMessage::new(
            Position::first(),
            MessageText::new(FIRST_MESSAGE_TEXT).map_err(ApplicationError::validation)?,
        );

        let set_record = SetRecord::from(&set);
        self.set_repo.save(&set_record).await?;

        let message_record = MessageRecord::from_entity(set_record.id, &seed);
        self.message_repo.save(&message_record).await?;

        self.event_publisher.publish_set_created(set_record.id);

        tracing::info!(
            set_id = %set_record.id,
            message_id = %message_record.id,
            "Voice set created"
        );

        Ok(CreateSetResponse {
            set_id: set_record.id,
            message_id: message_record.id,
        })
    }
}

/// UpdateSet Handler - 重命名 / 切换音色
pub struct UpdateSetHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
    event_publisher: Arc<EventPublisher>,
}

impl UpdateSetHandler {
    pub fn new(set_repo: Arc<dyn SetRepositoryPort>, event_publisher: Arc<EventPublisher>) -> Self {
        Self {
            set_repo,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: UpdateSetCommand) -> Result<UpdateSetResponse, ApplicationError> {
        let mut record = self
            .set_repo
            .find_by_id(cmd.set_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Set", cmd.set_id))?;

        if let Some(name) = cmd.name {
            let name = SetName::new(name).map_err(ApplicationError::validation)?;
            record.name = name.as_str().to_string();
        }

        if let Some(voice_id) = cmd.selected_voice_id {
            let voice = VoiceId::new(voice_id).map_err(ApplicationError::validation)?;
            record.selected_voice_id = voice.as_str().to_string();
        }

        record.updated_at = chrono::Utc::now();
        self.set_repo.save(&record).await?;

        self.event_publisher.publish_set_updated(record.id);

        tracing::info!(
            set_id = %record.id,
            voice_id = %record.selected_voice_id,
            "Voice set updated"
        );

        Ok(UpdateSetResponse {
            set_id: record.id,
            name: record.name,
            selected_voice_id: record.selected_voice_id,
        })
    }
}

/// DeleteSet Handler - 级联删除消息与已生成音频
pub struct DeleteSetHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
    message_repo: Arc<dyn MessageRepositoryPort>,
    audio_storage: Arc<dyn AudioStoragePort>,
    generation_tasks: Arc<dyn GenerationTaskPort>,
    event_publisher: Arc<EventPublisher>,
}

impl DeleteSetHandler {
    pub fn new(
        set_repo: Arc<dyn SetRepositoryPort>,
        message_repo: Arc<dyn MessageRepositoryPort>,
        audio_storage: Arc<dyn AudioStoragePort>,
        generation_tasks: Arc<dyn GenerationTaskPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            set_repo,
            message_repo,
            audio_storage,
            generation_tasks,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: DeleteSetCommand) -> Result<DeleteSetResponse, ApplicationError> {
        self.set_repo
            .find_by_id(cmd.set_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Set", cmd.set_id))?;

        // 先取消在途合成，避免 Worker 给已删除的消息写回结果
        let cancelled = self.generation_tasks.cancel_for_set(cmd.set_id);

        let messages = self.message_repo.find_by_set(cmd.set_id).await?;

        let mut deleted_clips = 0;
        for message in &messages {
            if let Some(meta) = &message.last_generation {
                self.audio_storage.delete(meta.clip_id).await?;
                deleted_clips += 1;
            }
        }

        let deleted_messages = self.message_repo.delete_by_set(cmd.set_id).await?;
        self.set_repo.delete(cmd.set_id).await?;

        self.event_publisher.publish_set_deleted(cmd.set_id);

        tracing::info!(
            set_id = %cmd.set_id,
            deleted_messages,
            deleted_clips,
            cancelled_tasks = cancelled,
            "Voice set deleted"
        );

        Ok(DeleteSetResponse {
            set_id: cmd.set_id,
            deleted_messages,
            deleted_clips,
        })
    }
}
