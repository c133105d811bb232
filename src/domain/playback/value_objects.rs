//! Playback Context - Value Objects

use serde::{Deserialize, Serialize};

/// 播放 URL - 指向一段已生成音频的可解析链接
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackUrl(String);

impl PlaybackUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, &'static str> {
        let url = url.into();
        if url.is_empty() {
            return Err("播放 URL 不能为空");
        }
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaybackUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_url_rejects_empty() {
        assert!(PlaybackUrl::new("").is_err());
        assert!(PlaybackUrl::new("http://localhost/a.mp3").is_ok());
    }
}
