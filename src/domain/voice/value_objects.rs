//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};

use super::catalog;

/// 音色标识
///
/// 不变量:
/// - 必须是内置音色目录中的 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Result<Self, &'static str> {
        let id = id.into();
        if catalog::find(&id).is_none() {
            return Err("音色不在内置目录中");
        }
        Ok(Self(id))
    }

    /// 目录默认音色
    pub fn default_voice() -> Self {
        Self(catalog::default_voice().id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 对应的目录条目
    pub fn catalog_entry(&self) -> &'static catalog::CatalogVoice {
        // VoiceId 构造时已校验目录成员资格
        catalog::find(&self.0).expect("voice id validated at construction")
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_id_accepts_catalog_member() {
        let voice = VoiceId::new("pFZP5JQG7iQjIQuC4Bku").unwrap();
        assert_eq!(voice.catalog_entry().name, "Lily");
    }

    #[test]
    fn test_voice_id_rejects_unknown() {
        assert!(VoiceId::new("nope").is_err());
    }

    #[test]
    fn test_default_voice() {
        assert_eq!(
            VoiceId::default_voice().as_str(),
            catalog::default_voice().id
        );
    }
}
