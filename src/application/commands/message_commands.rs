//! Message Commands - 语音消息相关命令

use uuid::Uuid;

/// 追加消息命令 - 新消息总是落在集合末尾
#[derive(Debug, Clone)]
pub struct CreateMessageCommand {
    pub set_id: Uuid,
}

/// 追加消息响应
#[derive(Debug, Clone)]
pub struct CreateMessageResponse {
    pub message_id: Uuid,
    pub set_id: Uuid,
    pub position: u32,
    pub current_text: String,
}

/// 更新消息文本命令
#[derive(Debug, Clone)]
pub struct UpdateMessageCommand {
    pub message_id: Uuid,
    pub text: String,
}

/// 更新消息文本响应
#[derive(Debug, Clone)]
pub struct UpdateMessageResponse {
    pub message_id: Uuid,
}

/// 删除消息命令
///
/// 级联：删除已生成音频、递减集合计数、压缩后续消息位置
#[derive(Debug, Clone)]
pub struct DeleteMessageCommand {
    pub message_id: Uuid,
    pub set_id: Uuid,
}

/// 删除消息响应
#[derive(Debug, Clone)]
pub struct DeleteMessageResponse {
    pub message_id: Uuid,
    pub shifted_messages: usize,
}
