//! Set Context - 语音集限界上下文
//!
//! 职责:
//! - 语音集聚合管理
//! - 语音消息实体（位置、文本、最近一次生成记录）
//! - 位置压缩与消息计数不变量

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::VoiceSet;
pub use entities::VoiceMessage;
pub use errors::SetError;
pub use value_objects::{ClipId, GenerationRecord, MessageId, MessageText, Position, SetId, SetName};

/// 新建语音集时种子消息的文本
pub const FIRST_MESSAGE_TEXT: &str = "Your first voice message.";

/// 追加消息时的占位文本
pub const NEW_MESSAGE_TEXT: &str = "Create a voice message...";
