//! Speech Engine Port - 语音合成引擎抽象
//!
//! 定义文本转语音的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 语音合成错误
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API key missing or rejected: {0}")]
    Unauthorized(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Voice not found: {0}")]
    VoiceNotFound(String),
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 要合成的文本
    pub text: String,
    /// 上游音色 ID
    pub voice_id: String,
    /// 合成模型 ID
    pub model_id: String,
    /// 上游服务的 API key（每次请求携带，不在客户端内持久化）
    pub api_key: String,
}

/// 合成响应
#[derive(Debug, Clone)]
pub struct SynthesisResponse {
    /// 音频数据（MPEG）
    pub audio_data: Vec<u8>,
    /// 响应声明的内容类型
    pub content_type: String,
    /// 上游请求 ID（用于日志和追踪）
    pub request_id: Option<String>,
}

/// Speech Engine Port
///
/// 外部语音合成服务的抽象接口
#[async_trait]
pub trait SpeechEnginePort: Send + Sync {
    /// 执行一次合成
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResponse, SpeechError>;

    /// 检查合成服务是否可达
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
