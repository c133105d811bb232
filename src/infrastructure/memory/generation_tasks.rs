//! In-Memory Generation Task Manager Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::application::ports::{
    GenerationState, GenerationTask, GenerationTaskError, GenerationTaskPort,
};

/// 内存任务管理器
pub struct InMemoryGenerationTasks {
    /// task_id -> GenerationTask
    tasks: DashMap<String, GenerationTask>,
    /// message_id -> Set<task_id>
    message_tasks: DashMap<Uuid, HashSet<String>>,
    /// set_id -> Set<task_id>
    set_tasks: DashMap<Uuid, HashSet<String>>,
    /// 任务队列发送端
    queue_sender: mpsc::Sender<String>,
}

impl InMemoryGenerationTasks {
    pub fn new(queue_sender: mpsc::Sender<String>) -> Self {
        Self {
            tasks: DashMap::new(),
            message_tasks: DashMap::new(),
            set_tasks: DashMap::new(),
            queue_sender,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn cancel_ids<'a>(&self, task_ids: impl Iterator<Item = &'a String>) -> usize {
        let mut cancelled_count = 0;

        for task_id in task_ids {
            if let Some(mut task) = self.tasks.get_mut(task_id) {
                if task.state == GenerationState::Pending {
                    task.state = GenerationState::Cancelled;
                    task.completed_at = Some(Utc::now());
                    cancelled_count += 1;
                }
            }
        }

        cancelled_count
    }
}

impl GenerationTaskPort for InMemoryGenerationTasks {
    fn submit(&self, task: GenerationTask) -> Result<String, GenerationTaskError> {
        let task_id = task.task_id.clone();
        let message_id = task.message_id;
        let set_id = task.set_id;

        // 存储任务
        self.tasks.insert(task_id.clone(), task);

        // 关联到消息与语音集
        self.message_tasks
            .entry(message_id)
            .or_insert_with(HashSet::new)
            .insert(task_id.clone());
        self.set_tasks
            .entry(set_id)
            .or_insert_with(HashSet::new)
            .insert(task_id.clone());

        // 发送到队列
        self.queue_sender
            .try_send(task_id.clone())
            .map_err(|e| {
                tracing::warn!(task_id = %task_id, error = %e, "Failed to enqueue task");
                GenerationTaskError::QueueUnavailable
            })?;

        tracing::debug!(task_id = %task_id, message_id = %message_id, "Task submitted");
        Ok(task_id)
    }

    fn cancel_for_message(&self, message_id: Uuid) -> usize {
        let cancelled = self
            .message_tasks
            .get(&message_id)
            .map(|ids| self.cancel_ids(ids.iter()))
            .unwrap_or(0);

        tracing::debug!(
            message_id = %message_id,
            cancelled_count = cancelled,
            "Pending message tasks cancelled"
        );
        cancelled
    }

    fn cancel_for_set(&self, set_id: Uuid) -> usize {
        let cancelled = self
            .set_tasks
            .get(&set_id)
            .map(|ids| self.cancel_ids(ids.iter()))
            .unwrap_or(0);

        tracing::debug!(
            set_id = %set_id,
            cancelled_count = cancelled,
            "Pending set tasks cancelled"
        );
        cancelled
    }

    fn is_cancelled(&self, task_id: &str) -> bool {
        self.tasks
            .get(task_id)
            .map(|t| t.state == GenerationState::Cancelled)
            .unwrap_or(true) // 不存在的任务视为已取消
    }

    fn get_state(&self, task_id: &str) -> Option<GenerationState> {
        self.tasks.get(task_id).map(|t| t.state)
    }

    fn set_state(&self, task_id: &str, state: GenerationState) -> Result<(), GenerationTaskError> {
        let mut task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| GenerationTaskError::NotFound(task_id.to_string()))?;

        let old_state = task.state;
        task.state = state;

        if matches!(
            state,
            GenerationState::Ready | GenerationState::Failed | GenerationState::Cancelled
        ) {
            task.completed_at = Some(Utc::now());
        }

        tracing::debug!(
            task_id = %task_id,
            old_state = ?old_state,
            new_state = ?state,
            "Task state changed"
        );
        Ok(())
    }

    fn set_failed(&self, task_id: &str, error: String) -> Result<(), GenerationTaskError> {
        let mut task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| GenerationTaskError::NotFound(task_id.to_string()))?;

        task.state = GenerationState::Failed;
        task.error_message = Some(error);
        task.completed_at = Some(Utc::now());
        Ok(())
    }

    fn get_task(&self, task_id: &str) -> Option<GenerationTask> {
        self.tasks.get(task_id).map(|t| t.clone())
    }

    fn get_tasks_by_message(&self, message_id: Uuid) -> Vec<GenerationTask> {
        self.message_tasks
            .get(&message_id)
            .map(|task_ids| {
                task_ids
                    .iter()
                    .filter_map(|id| self.tasks.get(id).map(|t| t.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_lifecycle() {
        let (tx, mut rx) = mpsc::channel(100);
        let manager = InMemoryGenerationTasks::new(tx);

        let task = GenerationTask::new(Uuid::new_v4(), Uuid::new_v4(), "Hello".to_string());
        let message_id = task.message_id;
        let task_id = manager.submit(task).unwrap();

        // Check queue
        assert_eq!(rx.try_recv().unwrap(), task_id);

        // Get state
        assert_eq!(manager.get_state(&task_id), Some(GenerationState::Pending));

        // Set state
        manager
            .set_state(&task_id, GenerationState::Generating)
            .unwrap();
        assert_eq!(
            manager.get_state(&task_id),
            Some(GenerationState::Generating)
        );

        // Generating 任务不会被 cancel_for_message 取消
        assert_eq!(manager.cancel_for_message(message_id), 0);
    }

    #[tokio::test]
    async fn test_cancel_for_message_and_set() {
        let (tx, _rx) = mpsc::channel(100);
        let manager = InMemoryGenerationTasks::new(tx);
        let message_id = Uuid::new_v4();
        let set_id = Uuid::new_v4();

        for i in 0..3 {
            let task = GenerationTask::new(message_id, set_id, format!("Text {}", i));
            manager.submit(task).unwrap();
        }
        let other = GenerationTask::new(Uuid::new_v4(), set_id, "Other".to_string());
        manager.submit(other).unwrap();

        // 按消息取消只触及该消息的任务
        assert_eq!(manager.cancel_for_message(message_id), 3);
        for task in manager.get_tasks_by_message(message_id) {
            assert_eq!(task.state, GenerationState::Cancelled);
        }

        // 按集合取消扫掉剩下的
        assert_eq!(manager.cancel_for_set(set_id), 1);
    }

    #[tokio::test]
    async fn test_missing_task_counts_as_cancelled() {
        let (tx, _rx) = mpsc::channel(100);
        let manager = InMemoryGenerationTasks::new(tx);

        assert!(manager.is_cancelled("no-such-task"));
    }

    #[tokio::test]
    async fn test_set_failed_records_error() {
        let (tx, _rx) = mpsc::channel(100);
        let manager = InMemoryGenerationTasks::new(tx);

        let task = GenerationTask::new(Uuid::new_v4(), Uuid::new_v4(), "Hello".to_string());
        let task_id = manager.submit(task).unwrap();

        manager.set_failed(&task_id, "boom".to_string()).unwrap();

        let task = manager.get_task(&task_id).unwrap();
        assert_eq!(task.state, GenerationState::Failed);
        assert_eq!(task.error_message.as_deref(), Some("boom"));
        assert!(task.completed_at.is_some());
    }
}
