//! Generation Command Handlers

use std::sync::Arc;

use crate::application::commands::generation_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ApiKeyVaultPort, GenerationTask, GenerationTaskPort, MessageRepositoryPort, SetRepositoryPort,
};
use crate::domain::set::MessageText;
use crate::infrastructure::events::EventPublisher;

/// SubmitGeneration Handler - 提交合成任务
///
/// 只入队并返回 task_id；实际合成由 GenerateWorker 异步执行，
/// 完成通过 WebSocket 事件通知。
pub struct SubmitGenerationHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
    message_repo: Arc<dyn MessageRepositoryPort>,
    key_vault: Arc<dyn ApiKeyVaultPort>,
    generation_tasks: Arc<dyn GenerationTaskPort>,
    event_publisher: Arc<EventPublisher>,
}

impl SubmitGenerationHandler {
    pub fn new(
        set_repo: Arc<dyn SetRepositoryPort>,
        message_repo: Arc<dyn MessageRepositoryPort>,
        key_vault: Arc<dyn ApiKeyVaultPort>,
        generation_tasks: Arc<dyn GenerationTaskPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            set_repo,
            message_repo,
            key_vault,
            generation_tasks,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitGenerationCommand,
    ) -> Result<SubmitGenerationResponse, ApplicationError> {
        let text = MessageText::new(cmd.text).map_err(ApplicationError::validation)?;
        if text.is_empty() {
            return Err(ApplicationError::validation(
                "Cannot generate audio for empty text",
            ));
        }

        let message = self
            .message_repo
            .find_by_id(cmd.message_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Message", cmd.message_id))?;

        // 验证所属语音集仍存在（音色在 Worker 执行时读取）
        self.set_repo
            .find_by_id(message.set_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Set", message.set_id))?;

        // 无 key 直接拒绝，省一次入队；Worker 执行时会再校验
        if !self.key_vault.is_configured().await? {
            return Err(ApplicationError::business_rule("API key not configured"));
        }

        let task = GenerationTask::new(cmd.message_id, message.set_id, text.as_str().to_string());
        let task_id = self
            .generation_tasks
            .submit(task)
            .map_err(|e| ApplicationError::internal(e.to_string()))?;

        self.event_publisher.publish_generation_pending(
            &task_id,
            cmd.message_id,
            message.set_id,
        );

        tracing::info!(
            task_id = %task_id,
            message_id = %cmd.message_id,
            set_id = %message.set_id,
            "Generation task submitted"
        );

        Ok(SubmitGenerationResponse {
            task_id,
            message_id: cmd.message_id,
        })
    }
}

/// QueryGenerationStatus Handler - 查询任务状态
pub struct QueryGenerationStatusHandler {
    generation_tasks: Arc<dyn GenerationTaskPort>,
}

impl QueryGenerationStatusHandler {
    pub fn new(generation_tasks: Arc<dyn GenerationTaskPort>) -> Self {
        Self { generation_tasks }
    }

    pub async fn handle(
        &self,
        cmd: QueryGenerationStatusCommand,
    ) -> Result<GenerationStatusInfo, ApplicationError> {
        let task = self
            .generation_tasks
            .get_task(&cmd.task_id)
            .ok_or_else(|| ApplicationError::not_found_str("Task", &cmd.task_id))?;

        Ok(GenerationStatusInfo {
            task_id: task.task_id,
            message_id: task.message_id,
            state: task.state,
            created_at: task.created_at,
            completed_at: task.completed_at,
            error_message: task.error_message,
        })
    }
}
