//! Audio Storage Port - 生成音频的存储抽象
//!
//! 定义音频文件存取的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Audio Storage 错误
#[derive(Debug, Error)]
pub enum AudioStorageError {
    #[error("Clip not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Audio Storage Port
///
/// 以 clip_id 为键的扁平音频文件存储
#[async_trait]
pub trait AudioStoragePort: Send + Sync {
    /// 存储一段音频，返回落盘路径
    async fn store(&self, clip_id: Uuid, data: &[u8]) -> Result<PathBuf, AudioStorageError>;

    /// 读取一段音频
    async fn read(&self, clip_id: Uuid) -> Result<Vec<u8>, AudioStorageError>;

    /// 删除一段音频；不存在时为 no-op
    async fn delete(&self, clip_id: Uuid) -> Result<(), AudioStorageError>;

    /// 音频是否存在
    async fn exists(&self, clip_id: Uuid) -> bool;

    /// 音频的落盘路径（不检查存在性）
    fn clip_path(&self, clip_id: Uuid) -> PathBuf;
}
