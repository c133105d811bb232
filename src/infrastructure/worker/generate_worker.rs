//! Generate Worker - Background Speech Synthesis Processor

use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::application::ports::{
    ApiKeyVaultPort, AudioStoragePort, GenerationMeta, GenerationState, GenerationTaskPort,
    MessageRepositoryPort, SetRepositoryPort, SpeechEnginePort, SynthesisRequest,
};
use crate::infrastructure::adapters::probe::mpeg_duration_ms;
use crate::infrastructure::events::EventPublisher;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct GenerateWorkerConfig {
    /// 最大并发合成数
    pub max_concurrent: usize,
    /// 合成模型 ID
    pub model_id: String,
}

impl Default for GenerateWorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            model_id: crate::domain::voice::catalog::MODEL_ID.to_string(),
        }
    }
}

/// 合成 Worker
///
/// 后台任务处理器，从队列消费任务并执行语音合成
pub struct GenerateWorker {
    config: GenerateWorkerConfig,
    queue_receiver: mpsc::Receiver<String>,
    generation_tasks: Arc<dyn GenerationTaskPort>,
    set_repo: Arc<dyn SetRepositoryPort>,
    message_repo: Arc<dyn MessageRepositoryPort>,
    key_vault: Arc<dyn ApiKeyVaultPort>,
    speech_engine: Arc<dyn SpeechEnginePort>,
    audio_storage: Arc<dyn AudioStoragePort>,
    event_publisher: Arc<EventPublisher>,
}

impl GenerateWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: GenerateWorkerConfig,
        queue_receiver: mpsc::Receiver<String>,
        generation_tasks: Arc<dyn GenerationTaskPort>,
        set_repo: Arc<dyn SetRepositoryPort>,
        message_repo: Arc<dyn MessageRepositoryPort>,
        key_vault: Arc<dyn ApiKeyVaultPort>,
        speech_engine: Arc<dyn SpeechEnginePort>,
        audio_storage: Arc<dyn AudioStoragePort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            generation_tasks,
            set_repo,
            message_repo,
            key_vault,
            speech_engine,
            audio_storage,
            event_publisher,
        }
    }

    /// 启动 Worker
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "GenerateWorker started"
        );

        // 使用 semaphore 控制并发
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.max_concurrent));

        while let Some(task_id) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Failed to acquire semaphore permit");
                    continue;
                }
            };

            let ctx = WorkerContext {
                model_id: self.config.model_id.clone(),
                generation_tasks: self.generation_tasks.clone(),
                set_repo: self.set_repo.clone(),
                message_repo: self.message_repo.clone(),
                key_vault: self.key_vault.clone(),
                speech_engine: self.speech_engine.clone(),
                audio_storage: self.audio_storage.clone(),
                event_publisher: self.event_publisher.clone(),
            };

            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成
                process_task(&task_id, ctx).await;
            });
        }

        tracing::info!("GenerateWorker stopped");
    }
}

/// 单个任务执行所需的依赖
#[derive(Clone)]
struct WorkerContext {
    model_id: String,
    generation_tasks: Arc<dyn GenerationTaskPort>,
    set_repo: Arc<dyn SetRepositoryPort>,
    message_repo: Arc<dyn MessageRepositoryPort>,
    key_vault: Arc<dyn ApiKeyVaultPort>,
    speech_engine: Arc<dyn SpeechEnginePort>,
    audio_storage: Arc<dyn AudioStoragePort>,
    event_publisher: Arc<EventPublisher>,
}

impl WorkerContext {
    fn fail(&self, task_id: &str, message_id: Uuid, set_id: Uuid, error: &str) {
        let _ = self.generation_tasks.set_failed(task_id, error.to_string());
        self.event_publisher
            .publish_generation_failed(task_id, message_id, set_id, error);
    }
}

/// 处理单个任务
async fn process_task(task_id: &str, ctx: WorkerContext) {
    // 获取任务信息
    let task = match ctx.generation_tasks.get_task(task_id) {
        Some(t) => t,
        None => {
            tracing::warn!(task_id = %task_id, "Task not found, skipping");
            return;
        }
    };

    // Check 1: 任务是否已取消
    if ctx.generation_tasks.is_cancelled(task_id) {
        tracing::debug!(task_id = %task_id, "Task cancelled, skipping");
        return;
    }

    // Check 2: 消息与所属语音集是否仍存在
    let _message = match ctx.message_repo.find_by_id(task.message_id).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            ctx.fail(task_id, task.message_id, task.set_id, "Message deleted");
            return;
        }
        Err(e) => {
            ctx.fail(
                task_id,
                task.message_id,
                task.set_id,
                &format!("Database error: {}", e),
            );
            return;
        }
    };

    // 音色在执行时从语音集读取（提交后用户可能已切换）
    let set = match ctx.set_repo.find_by_id(task.set_id).await {
        Ok(Some(s)) => s,
        Ok(None) => {
            ctx.fail(task_id, task.message_id, task.set_id, "Set deleted");
            return;
        }
        Err(e) => {
            ctx.fail(
                task_id,
                task.message_id,
                task.set_id,
                &format!("Database error: {}", e),
            );
            return;
        }
    };

    // API key 解密只在这里发生
    let api_key = match ctx.key_vault.load().await {
        Ok(Some(key)) => key,
        Ok(None) => {
            ctx.fail(task_id, task.message_id, task.set_id, "API key not configured");
            return;
        }
        Err(e) => {
            ctx.fail(
                task_id,
                task.message_id,
                task.set_id,
                &format!("Key vault error: {}", e),
            );
            return;
        }
    };

    // 标记为合成中
    if let Err(e) = ctx
        .generation_tasks
        .set_state(task_id, GenerationState::Generating)
    {
        tracing::error!(task_id = %task_id, error = %e, "Failed to update task state");
        return;
    }
    ctx.event_publisher
        .publish_generation_generating(task_id, task.message_id, task.set_id);

    let response = match ctx
        .speech_engine
        .synthesize(SynthesisRequest {
            text: task.text.clone(),
            voice_id: set.selected_voice_id.clone(),
            model_id: ctx.model_id.clone(),
            api_key,
        })
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(task_id = %task_id, error = %e, "Synthesis failed");
            ctx.fail(task_id, task.message_id, task.set_id, &e.to_string());
            return;
        }
    };

    let duration_ms = mpeg_duration_ms(&response.audio_data);

    let clip_id = Uuid::new_v4();
    if let Err(e) = ctx.audio_storage.store(clip_id, &response.audio_data).await {
        ctx.fail(
            task_id,
            task.message_id,
            task.set_id,
            &format!("Storage error: {}", e),
        );
        return;
    }

    // 合成期间消息可能被删除或任务被取消：丢弃产物
    if ctx.generation_tasks.is_cancelled(task_id) {
        let _ = ctx.audio_storage.delete(clip_id).await;
        tracing::debug!(task_id = %task_id, "Task cancelled after synthesis, clip discarded");
        return;
    }

    let mut message = match ctx.message_repo.find_by_id(task.message_id).await {
        Ok(Some(m)) => m,
        _ => {
            let _ = ctx.audio_storage.delete(clip_id).await;
            ctx.fail(
                task_id,
                task.message_id,
                task.set_id,
                "Message deleted during generation",
            );
            return;
        }
    };

    let previous_clip = message.last_generation.as_ref().map(|meta| meta.clip_id);

    message.last_generation = Some(GenerationMeta {
        text: task.text.clone(),
        voice_id: set.selected_voice_id.clone(),
        clip_id,
        duration_ms,
    });
    message.updated_at = chrono::Utc::now();

    if let Err(e) = ctx.message_repo.save(&message).await {
        let _ = ctx.audio_storage.delete(clip_id).await;
        ctx.fail(
            task_id,
            task.message_id,
            task.set_id,
            &format!("Database error: {}", e),
        );
        return;
    }

    // 新记录落库后旧音频才可删
    if let Some(old_clip) = previous_clip {
        if old_clip != clip_id {
            if let Err(e) = ctx.audio_storage.delete(old_clip).await {
                tracing::warn!(clip_id = %old_clip, error = %e, "Failed to delete stale clip");
            }
        }
    }

    let _ = ctx
        .generation_tasks
        .set_state(task_id, GenerationState::Ready);
    ctx.event_publisher
        .publish_generation_ready(task_id, task.message_id, task.set_id, duration_ms);

    tracing::info!(
        task_id = %task_id,
        message_id = %task.message_id,
        clip_id = %clip_id,
        duration_ms = ?duration_ms,
        audio_size = response.audio_data.len(),
        "Generation completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::GenerationTask;
    use crate::infrastructure::adapters::crypto::AesKeyVault;
    use crate::infrastructure::adapters::speech::FakeSpeechClient;
    use crate::infrastructure::adapters::storage::FileClipStorage;
    use crate::infrastructure::memory::InMemoryGenerationTasks;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteCredentialRepository,
        SqliteMessageRepository, SqliteSetRepository,
    };
    use chrono::Utc;

    struct TestRig {
        _dir: tempfile::TempDir,
        ctx: WorkerContext,
        tasks: Arc<InMemoryGenerationTasks>,
        set_repo: Arc<SqliteSetRepository>,
        message_repo: Arc<SqliteMessageRepository>,
        storage: Arc<FileClipStorage>,
        _queue_rx: mpsc::Receiver<String>,
    }

    async fn rig(with_key: bool) -> TestRig {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let set_repo = Arc::new(SqliteSetRepository::new(pool.clone()));
        let message_repo = Arc::new(SqliteMessageRepository::new(pool.clone()));
        let credential_repo = Arc::new(SqliteCredentialRepository::new(pool));
        let vault = Arc::new(AesKeyVault::new("test-secret", credential_repo).unwrap());
        if with_key {
            vault.store("sk-test").await.unwrap();
        }

        let dir = tempfile::TempDir::new().unwrap();
        let storage = Arc::new(FileClipStorage::new(dir.path()).await.unwrap());

        let (queue_tx, queue_rx) = mpsc::channel(16);
        let tasks = Arc::new(InMemoryGenerationTasks::new(queue_tx));

        let ctx = WorkerContext {
            model_id: "eleven_multilingual_v2".to_string(),
            generation_tasks: tasks.clone(),
            set_repo: set_repo.clone(),
            message_repo: message_repo.clone(),
            key_vault: vault,
            speech_engine: Arc::new(FakeSpeechClient::with_defaults()),
            audio_storage: storage.clone(),
            event_publisher: Arc::new(EventPublisher::new()),
        };

        TestRig {
            _dir: dir,
            ctx,
            tasks,
            set_repo,
            message_repo,
            storage,
            _queue_rx: queue_rx,
        }
    }

    async fn seed_set_and_message(rig: &TestRig) -> (Uuid, Uuid) {
        let set_id = Uuid::new_v4();
        let message_id = Uuid::new_v4();

        rig.set_repo
            .save(&crate::application::ports::SetRecord {
                id: set_id,
                name: "Set".to_string(),
                selected_voice_id: "iP95p4xoKVk53GoZ742B".to_string(),
                message_count: 1,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        rig.message_repo
            .save(&crate::application::ports::MessageRecord {
                id: message_id,
                set_id,
                position: 1,
                current_text: "Hello".to_string(),
                last_generation: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        (set_id, message_id)
    }

    #[tokio::test]
    async fn test_process_task_happy_path() {
        let rig = rig(true).await;
        let (set_id, message_id) = seed_set_and_message(&rig).await;

        let task = GenerationTask::new(message_id, set_id, "Hello there".to_string());
        let task_id = rig.tasks.submit(task).unwrap();

        process_task(&task_id, rig.ctx.clone()).await;

        assert_eq!(rig.tasks.get_state(&task_id), Some(GenerationState::Ready));

        let message = rig.message_repo.find_by_id(message_id).await.unwrap().unwrap();
        let meta = message.last_generation.unwrap();
        assert_eq!(meta.text, "Hello there");
        assert_eq!(meta.voice_id, "iP95p4xoKVk53GoZ742B");
        assert!(rig.storage.exists(meta.clip_id).await);
    }

    #[tokio::test]
    async fn test_regeneration_replaces_old_clip() {
        let rig = rig(true).await;
        let (set_id, message_id) = seed_set_and_message(&rig).await;

        let first = rig
            .tasks
            .submit(GenerationTask::new(message_id, set_id, "One".to_string()))
            .unwrap();
        process_task(&first, rig.ctx.clone()).await;
        let first_clip = rig
            .message_repo
            .find_by_id(message_id)
            .await
            .unwrap()
            .unwrap()
            .last_generation
            .unwrap()
            .clip_id;

        let second = rig
            .tasks
            .submit(GenerationTask::new(message_id, set_id, "Two".to_string()))
            .unwrap();
        process_task(&second, rig.ctx.clone()).await;

        let meta = rig
            .message_repo
            .find_by_id(message_id)
            .await
            .unwrap()
            .unwrap()
            .last_generation
            .unwrap();
        assert_ne!(meta.clip_id, first_clip);
        assert_eq!(meta.text, "Two");
        assert!(!rig.storage.exists(first_clip).await);
        assert!(rig.storage.exists(meta.clip_id).await);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_task() {
        let rig = rig(false).await;
        let (set_id, message_id) = seed_set_and_message(&rig).await;

        let task_id = rig
            .tasks
            .submit(GenerationTask::new(message_id, set_id, "Hello".to_string()))
            .unwrap();
        process_task(&task_id, rig.ctx.clone()).await;

        let task = rig.tasks.get_task(&task_id).unwrap();
        assert_eq!(task.state, GenerationState::Failed);
        assert_eq!(task.error_message.as_deref(), Some("API key not configured"));
    }

    #[tokio::test]
    async fn test_cancelled_task_is_skipped() {
        let rig = rig(true).await;
        let (set_id, message_id) = seed_set_and_message(&rig).await;

        let task_id = rig
            .tasks
            .submit(GenerationTask::new(message_id, set_id, "Hello".to_string()))
            .unwrap();
        rig.tasks.cancel_for_message(message_id);

        process_task(&task_id, rig.ctx.clone()).await;

        assert_eq!(
            rig.tasks.get_state(&task_id),
            Some(GenerationState::Cancelled)
        );
        let message = rig.message_repo.find_by_id(message_id).await.unwrap().unwrap();
        assert!(message.last_generation.is_none());
    }

    #[tokio::test]
    async fn test_deleted_message_fails_task() {
        let rig = rig(true).await;
        let (set_id, _message_id) = seed_set_and_message(&rig).await;

        let ghost = Uuid::new_v4();
        let task_id = rig
            .tasks
            .submit(GenerationTask::new(ghost, set_id, "Hello".to_string()))
            .unwrap();
        process_task(&task_id, rig.ctx.clone()).await;

        let task = rig.tasks.get_task(&task_id).unwrap();
        assert_eq!(task.state, GenerationState::Failed);
        assert_eq!(task.error_message.as_deref(), Some("Message deleted"));
    }
}
