//! Message Queries - 语音消息相关查询

use uuid::Uuid;

/// 获取消息详情
#[derive(Debug, Clone)]
pub struct GetMessageQuery {
    pub message_id: Uuid,
}

/// 列出语音集的所有消息（position 升序）
#[derive(Debug, Clone)]
pub struct ListMessagesQuery {
    pub set_id: Uuid,
}

/// 解析消息的播放 URL
///
/// 消息无已生成音频时返回空，这不是错误
#[derive(Debug, Clone)]
pub struct ResolveAudioUrlQuery {
    pub message_id: Uuid,
}
