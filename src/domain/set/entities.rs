//! Set Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GenerationRecord, MessageId, MessageText, Position};

/// 语音消息 - 语音集内的最小生成/播放单位
///
/// 不变量:
/// - position 在所属语音集内唯一且连续（1 起始）
/// - 至多保留一条最近生成记录；重新生成会替换旧记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceMessage {
    id: MessageId,
    position: Position,
    current_text: MessageText,
    last_generation: Option<GenerationRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VoiceMessage {
    /// 创建新消息
    pub fn new(position: Position, text: MessageText) -> Self {
        let now = Utc::now();
        Self {
            id: MessageId::new(),
            position,
            current_text: text,
            last_generation: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 更新消息文本
    ///
    /// current_text 是编辑态，不影响已生成的音频记录
    pub fn update_text(&mut self, text: MessageText) {
        self.current_text = text;
        self.updated_at = Utc::now();
    }

    /// 记录一次完成的生成
    pub fn record_generation(&mut self, record: GenerationRecord) {
        self.last_generation = Some(record);
        self.updated_at = Utc::now();
    }

    /// 重定位（删除前序消息后的位置压缩）
    pub fn reposition(&mut self, position: Position) {
        self.position = position;
        self.updated_at = Utc::now();
    }

    /// 是否已生成过音频
    pub fn has_generated_audio(&self) -> bool {
        self.last_generation.is_some()
    }

    // Getters
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn current_text(&self) -> &MessageText {
        &self.current_text
    }

    pub fn last_generation(&self) -> Option<&GenerationRecord> {
        self.last_generation.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::set::ClipId;
    use crate::domain::voice::VoiceId;

    #[test]
    fn test_message_creation() {
        let message = VoiceMessage::new(
            Position::first(),
            MessageText::new("Hello there").unwrap(),
        );

        assert_eq!(message.position().value(), 1);
        assert_eq!(message.current_text().as_str(), "Hello there");
        assert!(!message.has_generated_audio());
    }

    #[test]
    fn test_record_generation_keeps_latest_only() {
        let mut message =
            VoiceMessage::new(Position::first(), MessageText::new("Hello").unwrap());

        let first_clip = ClipId::new();
        message.record_generation(GenerationRecord {
            text: "Hello".to_string(),
            voice_id: VoiceId::default_voice(),
            clip_id: first_clip,
            duration_ms: Some(1200),
        });

        let second_clip = ClipId::new();
        message.record_generation(GenerationRecord {
            text: "Hello again".to_string(),
            voice_id: VoiceId::default_voice(),
            clip_id: second_clip,
            duration_ms: None,
        });

        let record = message.last_generation().unwrap();
        assert_eq!(record.clip_id, second_clip);
        assert_eq!(record.text, "Hello again");
    }

    #[test]
    fn test_edit_does_not_touch_generation_record() {
        let mut message =
            VoiceMessage::new(Position::first(), MessageText::new("Hello").unwrap());
        message.record_generation(GenerationRecord {
            text: "Hello".to_string(),
            voice_id: VoiceId::default_voice(),
            clip_id: ClipId::new(),
            duration_ms: None,
        });

        message.update_text(MessageText::new("Edited").unwrap());

        assert_eq!(message.current_text().as_str(), "Edited");
        assert_eq!(message.last_generation().unwrap().text, "Hello");
    }
}
