//! API Key Vault Port - 凭据加密存取
//!
//! 上游服务 API key 的加密存取抽象，具体实现在 infrastructure/adapters 层。
//! HTTP 层只暴露"已配置/未配置"，明文只在生成 Worker 内部短暂存在。

use async_trait::async_trait;
use thiserror::Error;

/// Key Vault 错误
#[derive(Debug, Error)]
pub enum ApiKeyVaultError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

/// API Key Vault Port
#[async_trait]
pub trait ApiKeyVaultPort: Send + Sync {
    /// 加密并保存 API key（覆盖旧值）
    async fn store(&self, api_key: &str) -> Result<(), ApiKeyVaultError>;

    /// 解密读取 API key；未配置时为 None
    async fn load(&self) -> Result<Option<String>, ApiKeyVaultError>;

    /// 是否已配置（不解密）
    async fn is_configured(&self) -> Result<bool, ApiKeyVaultError>;
}
