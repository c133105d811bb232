//! Generation Commands - 合成任务相关命令

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::ports::GenerationState;

/// 提交合成任务命令
///
/// text 取客户端编辑态的最新值（数据库写入是防抖的）；
/// 音色在 Worker 执行时从语音集读取，不随命令传递
#[derive(Debug, Clone)]
pub struct SubmitGenerationCommand {
    pub message_id: Uuid,
    pub text: String,
}

/// 提交合成任务响应
#[derive(Debug, Clone)]
pub struct SubmitGenerationResponse {
    pub task_id: String,
    pub message_id: Uuid,
}

/// 查询任务状态命令
#[derive(Debug, Clone)]
pub struct QueryGenerationStatusCommand {
    pub task_id: String,
}

/// 任务状态信息
#[derive(Debug, Clone)]
pub struct GenerationStatusInfo {
    pub task_id: String,
    pub message_id: Uuid,
    pub state: GenerationState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}
