//! Fake Speech Client - 用于测试的合成客户端
//!
//! 始终返回固定的音频数据，不实际调用上游服务

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{
    SpeechEnginePort, SpeechError, SynthesisRequest, SynthesisResponse,
};

/// Fake Speech Client 配置
#[derive(Debug, Clone)]
pub struct FakeSpeechClientConfig {
    /// 固定返回的音频数据
    pub audio_data: Vec<u8>,
    /// 响应声明的内容类型
    pub content_type: String,
}

impl Default for FakeSpeechClientConfig {
    fn default() -> Self {
        Self {
            // 最小的 MPEG frame 头，够撑过"非空载荷"检查
            audio_data: vec![0xff, 0xfb, 0x90, 0x00],
            content_type: "audio/mpeg".to_string(),
        }
    }
}

/// Fake Speech Client
///
/// 用于测试与离线开发，记录请求次数
pub struct FakeSpeechClient {
    config: FakeSpeechClientConfig,
    request_count: AtomicUsize,
}

impl FakeSpeechClient {
    pub fn new(config: FakeSpeechClientConfig) -> Self {
        Self {
            config,
            request_count: AtomicUsize::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeSpeechClientConfig::default())
    }

    /// 已处理的请求数
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechEnginePort for FakeSpeechClient {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisResponse, SpeechError> {
        if request.api_key.is_empty() {
            return Err(SpeechError::Unauthorized("missing api key".to_string()));
        }

        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::debug!(
            voice_id = %request.voice_id,
            text_len = request.text.len(),
            count,
            "Fake synthesis"
        );

        Ok(SynthesisResponse {
            audio_data: self.config.audio_data.clone(),
            content_type: self.config.content_type.clone(),
            request_id: Some(format!("fake-{}", count)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_client_returns_fixed_audio() {
        let client = FakeSpeechClient::with_defaults();

        let response = client
            .synthesize(SynthesisRequest {
                text: "Hello".to_string(),
                voice_id: "iP95p4xoKVk53GoZ742B".to_string(),
                model_id: "eleven_multilingual_v2".to_string(),
                api_key: "key".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.content_type, "audio/mpeg");
        assert!(!response.audio_data.is_empty());
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_fake_client_rejects_missing_key() {
        let client = FakeSpeechClient::with_defaults();

        let result = client
            .synthesize(SynthesisRequest {
                text: "Hello".to_string(),
                voice_id: "iP95p4xoKVk53GoZ742B".to_string(),
                model_id: "eleven_multilingual_v2".to_string(),
                api_key: String::new(),
            })
            .await;

        assert!(matches!(result, Err(SpeechError::Unauthorized(_))));
    }
}
