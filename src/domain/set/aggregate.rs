//! Set Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SetError, SetId, SetName};
use crate::domain::voice::VoiceId;

/// VoiceSet 聚合根
///
/// 不变量:
/// - message_count 与集合内实际消息数一致
/// - selected_voice 必须来自内置音色目录
/// - 新建集合自带一条种子消息，因此 message_count 从 1 起步
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSet {
    id: SetId,
    name: SetName,
    selected_voice: VoiceId,
    message_count: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VoiceSet {
    /// 创建新语音集（默认使用目录中的第一个音色）
    pub fn new(name: SetName) -> Self {
        let now = Utc::now();
        Self {
            id: SetId::new(),
            name,
            selected_voice: VoiceId::default_voice(),
            message_count: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// 重命名
    pub fn rename(&mut self, name: SetName) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    /// 切换音色
    pub fn select_voice(&mut self, voice_id: VoiceId) {
        self.selected_voice = voice_id;
        self.updated_at = Utc::now();
    }

    /// 追加消息后的计数更新，返回新消息应占的位置
    pub fn message_appended(&mut self) -> u32 {
        self.message_count += 1;
        self.updated_at = Utc::now();
        self.message_count
    }

    /// 删除消息后的计数更新
    pub fn message_removed(&mut self) -> Result<(), SetError> {
        if self.message_count == 0 {
            return Err(SetError::EmptySet(self.id));
        }
        self.message_count -= 1;
        self.updated_at = Utc::now();
        Ok(())
    }

    // Getters
    pub fn id(&self) -> &SetId {
        &self.id
    }

    pub fn name(&self) -> &SetName {
        &self.name
    }

    pub fn selected_voice(&self) -> &VoiceId {
        &self.selected_voice
    }

    pub fn message_count(&self) -> u32 {
        self.message_count
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
    use crate::domain::voice::catalog;

    #[test]
    fn test_set_creation_defaults() {
        let set = VoiceSet::new(SetName::new("Intro lines").unwrap());

        assert_eq!(set.name().as_str(), "Intro lines");
        assert_eq!(set.message_count(), 1);
        assert_eq!(set.selected_voice().as_str(), catalog::all()[0].id);
    }

    #[test]
    fn test_message_count_tracking() {
        let mut set = VoiceSet::new(SetName::new("Intro lines").unwrap());

        assert_eq!(set.message_appended(), 2);
        assert_eq!(set.message_appended(), 3);
        set.message_removed().unwrap();
        assert_eq!(set.message_count(), 2);
    }

    #[test]
    fn test_message_removed_from_empty_set_fails() {
        let mut set = VoiceSet::new(SetName::new("Intro lines").unwrap());
        set.message_removed().unwrap();
        assert!(set.message_removed().is_err());
    }
}
