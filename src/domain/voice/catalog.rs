//! Voice Catalog - 内置音色目录
//!
//! 上游语音合成服务提供的固定音色清单。目录不落库，音色 ID 直接存入
//! 语音集记录，校验在 VoiceId 构造时完成。

/// 合成模型 ID
pub const MODEL_ID: &str = "eleven_multilingual_v2";

/// 目录音色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogVoice {
    /// 上游服务的音色 ID
    pub id: &'static str,
    /// 展示名称
    pub name: &'static str,
    /// 风格描述
    pub description: &'static str,
    /// 是否为上游的 legacy 音色
    pub legacy: bool,
}

const VOICES: &[CatalogVoice] = &[
    CatalogVoice {
        id: "jBpfuIE2acCO8z3wKNLl",
        name: "Gigi",
        description: "Animation, Young, Energetic",
        legacy: true,
    },
    CatalogVoice {
        id: "iP95p4xoKVk53GoZ742B",
        name: "Chris",
        description: "Conversational, Natural, Friendly",
        legacy: false,
    },
    CatalogVoice {
        id: "nPczCjzI2devNBz1zQrb",
        name: "Brian",
        description: "Professional Narration, Documentary",
        legacy: false,
    },
    CatalogVoice {
        id: "pFZP5JQG7iQjIQuC4Bku",
        name: "Lily",
        description: "Soft Narration, Audiobooks",
        legacy: false,
    },
    CatalogVoice {
        id: "onwK4e9ZLuTAKqWW03F9",
        name: "Daniel",
        description: "News, Broadcast Style",
        legacy: false,
    },
    CatalogVoice {
        id: "knrPHWnBmmDHMoiMeP3l",
        name: "Santa Claus",
        description: "Jolly, Character Voice",
        legacy: true,
    },
    CatalogVoice {
        id: "jsCqWAovK2LkecY7zXl4",
        name: "Freya",
        description: "Young Character Voice, Fantasy",
        legacy: true,
    },
    CatalogVoice {
        id: "CwhRBWXzGAHq8TQ4Fs17",
        name: "Grace",
        description: "Professional Narration, Calm",
        legacy: true,
    },
    CatalogVoice {
        id: "piTKgcLEGmPE4e6mEKli",
        name: "Nicole",
        description: "ASMR, Soothing",
        legacy: true,
    },
    CatalogVoice {
        id: "pqHfZKP75CvOlQylNhV4",
        name: "Bill",
        description: "Deep Narration, Authoritative",
        legacy: false,
    },
    CatalogVoice {
        id: "t0jbNlBVZ17f02VDIeMI",
        name: "Jessie",
        description: "Young Character Voice, Playful",
        legacy: true,
    },
    CatalogVoice {
        id: "VR6AewLTigWG4xSOukaG",
        name: "Arnold",
        description: "Deep Character Voice, Action",
        legacy: true,
    },
    CatalogVoice {
        id: "pMsXgVXv3BLzUgSXRplE",
        name: "Serena",
        description: "Warm Narration, Engaging",
        legacy: true,
    },
    CatalogVoice {
        id: "zcAOhNBS3c14rBihAFp1",
        name: "Giovanni",
        description: "Italian Accent, Expressive",
        legacy: true,
    },
    CatalogVoice {
        id: "z9fAnlkpzviPz146aGWa",
        name: "Glinda",
        description: "Fantasy Character, Whimsical",
        legacy: true,
    },
];

/// 目录中的所有音色
pub fn all() -> &'static [CatalogVoice] {
    VOICES
}

/// 按 ID 查找音色
pub fn find(id: &str) -> Option<&'static CatalogVoice> {
    VOICES.iter().find(|voice| voice.id == id)
}

/// 新建语音集的默认音色（目录第一项）
pub fn default_voice() -> &'static CatalogVoice {
    &VOICES[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_fifteen_voices() {
        assert_eq!(all().len(), 15);
    }

    #[test]
    fn test_find_known_voice() {
        let voice = find("nPczCjzI2devNBz1zQrb").unwrap();
        assert_eq!(voice.name, "Brian");
        assert!(!voice.legacy);
    }

    #[test]
    fn test_find_unknown_voice() {
        assert!(find("does-not-exist").is_none());
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<_> = all().iter().map(|v| v.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn test_default_voice_is_first_entry() {
        assert_eq!(default_voice().id, all()[0].id);
    }
}
