//! ElevenLabs Client - 调用 ElevenLabs HTTP API
//!
//! 实现 SpeechEnginePort trait
//!
//! 上游 API:
//! POST {base}/v1/text-to-speech/{voice_id}
//! Header: xi-api-key: <API key>
//! Request: {"text": "...", "model_id": "..."}  (JSON)
//! Response: audio/mpeg binary

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{
    SpeechEnginePort, SpeechError, SynthesisRequest, SynthesisResponse,
};

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct TextToSpeechBody {
    /// 要合成的文本
    text: String,
    /// 合成模型 ID
    model_id: String,
}

/// ElevenLabs 客户端配置
#[derive(Debug, Clone)]
pub struct ElevenLabsClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for ElevenLabsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ElevenLabsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// ElevenLabs 客户端
///
/// API key 随请求传入（来自 Key Vault），客户端自身不持有凭据
pub struct ElevenLabsClient {
    client: Client,
    config: ElevenLabsClientConfig,
}

impl ElevenLabsClient {
    /// 创建新的 ElevenLabs 客户端
    pub fn new(config: ElevenLabsClientConfig) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpeechError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 使用默认配置创建客户端
    pub fn with_default_config() -> Result<Self, SpeechError> {
        Self::new(ElevenLabsClientConfig::default())
    }

    /// 获取合成 URL
    fn synthesis_url(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}", self.config.base_url, voice_id)
    }

    /// 获取健康检查 URL（公开端点，无需 key）
    fn health_url(&self) -> String {
        format!("{}/v1/models", self.config.base_url)
    }
}

#[async_trait]
impl SpeechEnginePort for ElevenLabsClient {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisResponse, SpeechError> {
        let body = TextToSpeechBody {
            text: request.text.clone(),
            model_id: request.model_id.clone(),
        };

        tracing::debug!(
            url = %self.synthesis_url(&request.voice_id),
            text_len = body.text.len(),
            voice_id = %request.voice_id,
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(&self.synthesis_url(&request.voice_id))
            .header("xi-api-key", &request.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SpeechError::Timeout
                } else if e.is_connect() {
                    SpeechError::NetworkError(format!("Cannot connect to speech service: {}", e))
                } else {
                    SpeechError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeechError::Unauthorized(error_text));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SpeechError::VoiceNotFound(request.voice_id.clone()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeechError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        // 从 headers 提取元数据
        let headers = response.headers();
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();
        let request_id = headers
            .get("request-id")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        // 直接获取音频字节
        let audio_data = response
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio_data.is_empty() {
            return Err(SpeechError::InvalidResponse(
                "Empty audio payload".to_string(),
            ));
        }

        tracing::info!(
            voice_id = %request.voice_id,
            request_id = ?request_id,
            audio_size = audio_data.len(),
            "Synthesis completed"
        );

        Ok(SynthesisResponse {
            audio_data,
            content_type,
            request_id,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(&self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => !response.status().is_server_error(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ElevenLabsClientConfig::default();
        assert_eq!(config.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_config_builder() {
        let config = ElevenLabsClientConfig::new("http://localhost:9000").with_timeout(30);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_synthesis_url() {
        let client = ElevenLabsClient::with_default_config().unwrap();
        assert_eq!(
            client.synthesis_url("nPczCjzI2devNBz1zQrb"),
            "https://api.elevenlabs.io/v1/text-to-speech/nPczCjzI2devNBz1zQrb"
        );
    }
}
