//! Set Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::voice::VoiceId;

/// 语音集唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetId(Uuid);

impl SetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语音消息唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 生成音频的存储标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(Uuid);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语音集名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetName(String);

impl SetName {
    pub fn new(name: impl Into<String>) -> Result<Self, &'static str> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("语音集名称不能为空");
        }
        if name.len() > 100 {
            return Err("语音集名称长度不能超过100字符");
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 消息文本
///
/// 编辑态允许为空；生成命令要求非空
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    /// 单条消息文本的最大长度（与合成服务单次请求限制对齐）
    pub const MAX_LEN: usize = 5000;

    pub fn new(text: impl Into<String>) -> Result<Self, &'static str> {
        let text = text.into();
        if text.len() > Self::MAX_LEN {
            return Err("消息文本长度不能超过5000字符");
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for MessageText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 消息在语音集内的位置（1 起始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position(u32);

impl Position {
    pub fn new(value: u32) -> Result<Self, &'static str> {
        if value == 0 {
            return Err("消息位置从1开始");
        }
        Ok(Self(value))
    }

    pub fn first() -> Self {
        Self(1)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// 前移一位（删除前序消息后的位置压缩）
    pub fn shifted_down(&self) -> Result<Self, &'static str> {
        Self::new(self.0 - 1)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 最近一次生成记录
///
/// 不变量:
/// - 每条消息至多关联一个最近生成的音频
/// - text/voice_id 记录生成时刻的输入，消息文本后续可被编辑
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// 生成时使用的文本
    pub text: String,
    /// 生成时使用的音色
    pub voice_id: VoiceId,
    /// 生成音频的存储标识
    pub clip_id: ClipId,
    /// 音频时长（毫秒），解析失败时为 None
    pub duration_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_name_validation() {
        assert!(SetName::new("My set").is_ok());
        assert!(SetName::new("").is_err());
        assert!(SetName::new("   ").is_err());
        assert!(SetName::new("a".repeat(101)).is_err());
    }

    #[test]
    fn test_message_text_allows_empty_but_caps_length() {
        let empty = MessageText::new("").unwrap();
        assert!(empty.is_empty());
        assert!(MessageText::new("a".repeat(MessageText::MAX_LEN)).is_ok());
        assert!(MessageText::new("a".repeat(MessageText::MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_position_is_one_based() {
        assert!(Position::new(0).is_err());
        assert_eq!(Position::first().value(), 1);
        assert_eq!(Position::new(3).unwrap().shifted_down().unwrap().value(), 2);
        assert!(Position::first().shifted_down().is_err());
    }
}
