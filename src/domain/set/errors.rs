//! Set Context - Errors

use thiserror::Error;

use super::{MessageId, SetId};

#[derive(Debug, Error)]
pub enum SetError {
    #[error("语音集不存在: {0}")]
    NotFound(SetId),

    #[error("消息不存在: {0}")]
    MessageNotFound(MessageId),

    #[error("无效的名称: {0}")]
    InvalidName(String),

    #[error("无效的消息文本: {0}")]
    InvalidText(String),

    #[error("无效的消息位置: {0}")]
    InvalidPosition(String),

    #[error("未知音色: {0}")]
    UnknownVoice(String),

    #[error("语音集已无消息可删: {0}")]
    EmptySet(SetId),
}
