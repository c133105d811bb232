//! Set Commands - 语音集相关命令

use uuid::Uuid;

/// 创建语音集命令 - 附带一条种子消息
#[derive(Debug, Clone)]
pub struct CreateSetCommand {
    pub name: String,
}

/// 创建语音集响应
#[derive(Debug, Clone)]
pub struct CreateSetResponse {
    pub set_id: Uuid,
    pub message_id: Uuid,
}

/// 更新语音集命令 - 重命名和/或切换音色
#[derive(Debug, Clone)]
pub struct UpdateSetCommand {
    pub set_id: Uuid,
    pub name: Option<String>,
    pub selected_voice_id: Option<String>,
}

/// 更新语音集响应
#[derive(Debug, Clone)]
pub struct UpdateSetResponse {
    pub set_id: Uuid,
    pub name: String,
    pub selected_voice_id: String,
}

/// 删除语音集命令 - 级联删除消息与已生成音频
#[derive(Debug, Clone)]
pub struct DeleteSetCommand {
    pub set_id: Uuid,
}

/// 删除语音集响应
#[derive(Debug, Clone)]
pub struct DeleteSetResponse {
    pub set_id: Uuid,
    pub deleted_messages: usize,
    pub deleted_clips: usize,
}
