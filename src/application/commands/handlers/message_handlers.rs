//! Message Command Handlers

use std::sync::Arc;

use crate::application::commands::message_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioStoragePort, GenerationTaskPort, MessageRecord, MessageRepositoryPort, SetRepositoryPort,
};
use crate::domain::set::{MessageText, Position, VoiceMessage, NEW_MESSAGE_TEXT};
use crate::infrastructure::events::EventPublisher;

/// CreateMessage Handler - 在集合末尾追加一条消息
pub struct CreateMessageHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
    message_repo: Arc<dyn MessageRepositoryPort>,
    event_publisher: Arc<EventPublisher>,
}

impl CreateMessageHandler {
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

    pub async fn handle(
        &self,
        cmd: CreateMessageCommand,
    ) -> Result<CreateMessageResponse, ApplicationError> {
        let mut set = self
            .set_repo
            .find_by_id(cmd.set_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Set", cmd.set_id))?;

        // 新消息总是落在末尾：位置 = 递增后的计数
        set.message_count += 1;
        set.updated_at = chrono::Utc::now();
        let position =
            Position::new(set.message_count).map_err(ApplicationError::validation)?;

        self.set_repo.save(&set).await?;

        let message = VoiceMessage::new(
            position,
            MessageText::new(NEW_MESSAGE_TEXT).map_err(ApplicationError::validation)?,
        );
        let record = MessageRecord::from_entity(cmd.set_id, &message);
        self.message_repo.save(&record).await?;

        self.event_publisher
            .publish_message_created(record.id, cmd.set_id, record.position);

        tracing::info!(
            set_id = %cmd.set_id,
            message_id = %record.id,
            position = record.position,
            "Voice message created"
        );

        Ok(CreateMessageResponse {
            message_id: record.id,
            set_id: cmd.set_id,
            position: record.position,
            current_text: record.current_text,
        })
    }
}

/// UpdateMessage Handler - 更新消息文本
pub struct UpdateMessageHandler {
    message_repo: Arc<dyn MessageRepositoryPort>,
    event_publisher: Arc<EventPublisher>,
}

impl UpdateMessageHandler {
    pub fn new(
        message_repo: Arc<dyn MessageRepositoryPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            message_repo,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateMessageCommand,
    ) -> Result<UpdateMessageResponse, ApplicationError> {
        let mut record = self
            .message_repo
            .find_by_id(cmd.message_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Message", cmd.message_id))?;

        let text = MessageText::new(cmd.text).map_err(ApplicationError::validation)?;

        // current_text 是编辑态，不触碰已生成的音频记录
        record.current_text = text.as_str().to_string();
        record.updated_at = chrono::Utc::now();
        self.message_repo.save(&record).await?;

        self.event_publisher.publish_message_updated(record.id, record.set_id);

        Ok(UpdateMessageResponse {
            message_id: record.id,
        })
    }
}

/// DeleteMessage Handler
///
/// 级联：删除已生成音频、递减集合计数、压缩后续消息位置
pub struct DeleteMessageHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
    message_repo: Arc<dyn MessageRepositoryPort>,
    audio_storage: Arc<dyn AudioStoragePort>,
    generation_tasks: Arc<dyn GenerationTaskPort>,
    event_publisher: Arc<EventPublisher>,
}

impl DeleteMessageHandler {
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

    pub async fn handle(
        &self,
        cmd: DeleteMessageCommand,
    ) -> Result<DeleteMessageResponse, ApplicationError> {
        let mut set = self
            .set_repo
            .find_by_id(cmd.set_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Set", cmd.set_id))?;

        let message = self
            .message_repo
            .find_by_id(cmd.message_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Message", cmd.message_id))?;

        if message.set_id != cmd.set_id {
            return Err(ApplicationError::validation(format!(
                "Message {} does not belong to set {}",
                cmd.message_id, cmd.set_id
            )));
        }

        if set.message_count == 0 {
            return Err(ApplicationError::invalid_state(format!(
                "Set {} has no messages to delete",
                cmd.set_id
            )));
        }

        let cancelled = self.generation_tasks.cancel_for_message(cmd.message_id);

        // 删除已生成的音频文件
        if let Some(meta) = &message.last_generation {
            self.audio_storage.delete(meta.clip_id).await?;
        }

        self.message_repo.delete(cmd.message_id).await?;

        // 位置压缩：后续消息整体前移一位
        let shifted = self
            .message_repo
            .shift_positions_after(cmd.set_id, message.position)
            .await?;

        set.message_count -= 1;
        set.updated_at = chrono::Utc::now();
        self.set_repo.save(&set).await?;

        self.event_publisher
            .publish_message_deleted(cmd.message_id, cmd.set_id);

        tracing::info!(
            set_id = %cmd.set_id,
            message_id = %cmd.message_id,
            shifted_messages = shifted,
            cancelled_tasks = cancelled,
            "Voice message deleted"
        );

        Ok(DeleteMessageResponse {
            message_id: cmd.message_id,
            shifted_messages: shifted,
        })
    }
}
