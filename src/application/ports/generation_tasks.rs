//! Generation Task Port - 生成任务管理
//!
//! 定义合成任务生命周期的抽象接口，具体实现在 infrastructure/memory 层

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Generation Task 错误
#[derive(Debug, Error)]
pub enum GenerationTaskError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Task already exists: {0}")]
    AlreadyExists(String),

    #[error("Queue full or closed")]
    QueueUnavailable,
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    /// 等待合成
    Pending,
    /// 正在合成
    Generating,
    /// 合成完成
    Ready,
    /// 合成失败
    Failed,
    /// 已取消
    Cancelled,
}

impl GenerationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationState::Pending => "pending",
            GenerationState::Generating => "generating",
            GenerationState::Ready => "ready",
            GenerationState::Failed => "failed",
            GenerationState::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(GenerationState::Pending),
            "generating" => Some(GenerationState::Generating),
            "ready" => Some(GenerationState::Ready),
            "failed" => Some(GenerationState::Failed),
            "cancelled" => Some(GenerationState::Cancelled),
            _ => None,
        }
    }
}

/// 合成任务
#[derive(Debug, Clone)]
pub struct GenerationTask {
    pub task_id: String,
    pub message_id: Uuid,
    pub set_id: Uuid,
    /// 提交时刻的文本（客户端编辑态的最新值，数据库写入是防抖的）
    pub text: String,
    pub state: GenerationState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl GenerationTask {
    pub fn new(message_id: Uuid, set_id: Uuid, text: String) -> Self {
        Self {
            task_id: Uuid::new_v4().to_string(),
            message_id,
            set_id,
            text,
            state: GenerationState::Pending,
            created_at: Utc::now(),
            completed_at: None,
            error_message: None,
        }
    }
}

/// Generation Task Port
///
/// 管理合成任务的生命周期，所有状态存储在内存中
pub trait GenerationTaskPort: Send + Sync {
    /// 提交任务到队列，返回 task_id
    fn submit(&self, task: GenerationTask) -> Result<String, GenerationTaskError>;

    /// 取消某条消息的所有 pending 任务，返回取消数量
    fn cancel_for_message(&self, message_id: Uuid) -> usize;

    /// 取消某个语音集的所有 pending 任务，返回取消数量
    fn cancel_for_set(&self, set_id: Uuid) -> usize;

    /// 检查任务是否已取消
    fn is_cancelled(&self, task_id: &str) -> bool;

    /// 获取任务状态
    fn get_state(&self, task_id: &str) -> Option<GenerationState>;

    /// 设置任务状态
    fn set_state(&self, task_id: &str, state: GenerationState) -> Result<(), GenerationTaskError>;

    /// 设置任务失败并记录错误
    fn set_failed(&self, task_id: &str, error: String) -> Result<(), GenerationTaskError>;

    /// 获取任务
    fn get_task(&self, task_id: &str) -> Option<GenerationTask>;

    /// 获取某条消息的所有任务
    fn get_tasks_by_message(&self, message_id: Uuid) -> Vec<GenerationTask>;
}
