//! File Clip Storage - 文件系统音频存储实现
//!
//! 实现 AudioStoragePort trait：扁平目录，clip_id 即文件名

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{AudioStorageError, AudioStoragePort};

/// 生成音频的文件扩展名（上游返回 MPEG）
const CLIP_EXTENSION: &str = "mp3";

/// 文件系统音频存储
pub struct FileClipStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileClipStorage {
    /// 创建新的文件存储
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, AudioStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait]
impl AudioStoragePort for FileClipStorage {
    fn clip_path(&self, clip_id: Uuid) -> PathBuf {
        self.base_dir.join(format!("{}.{}", clip_id, CLIP_EXTENSION))
    }

    async fn store(&self, clip_id: Uuid, data: &[u8]) -> Result<PathBuf, AudioStorageError> {
        let path = self.clip_path(clip_id);

        fs::write(&path, data)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        tracing::debug!(
            clip_id = %clip_id,
            size = data.len(),
            "Clip stored"
        );

        Ok(path)
    }

    async fn read(&self, clip_id: Uuid) -> Result<Vec<u8>, AudioStorageError> {
        let path = self.clip_path(clip_id);

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AudioStorageError::NotFound(clip_id.to_string()))
            }
            Err(e) => Err(AudioStorageError::IoError(e.to_string())),
        }
    }

    async fn delete(&self, clip_id: Uuid) -> Result<(), AudioStorageError> {
        let path = self.clip_path(clip_id);

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(clip_id = %clip_id, "Clip deleted");
                Ok(())
            }
            // 不存在视为成功（删除是幂等的）
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AudioStorageError::IoError(e.to_string())),
        }
    }

    async fn exists(&self, clip_id: Uuid) -> bool {
        fs::try_exists(self.clip_path(clip_id)).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_storage() -> (TempDir, FileClipStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileClipStorage::new(dir.path()).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_store_and_read() {
        let (_dir, storage) = test_storage().await;
        let clip_id = Uuid::new_v4();

        let path = storage.store(clip_id, b"audio bytes").await.unwrap();
        assert!(path.ends_with(format!("{}.mp3", clip_id)));

        let data = storage.read(clip_id).await.unwrap();
        assert_eq!(data, b"audio bytes");
        assert!(storage.exists(clip_id).await);
    }

    #[tokio::test]
    async fn test_read_missing_clip() {
        let (_dir, storage) = test_storage().await;

        let result = storage.read(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AudioStorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, storage) = test_storage().await;
        let clip_id = Uuid::new_v4();

        storage.store(clip_id, b"audio").await.unwrap();
        storage.delete(clip_id).await.unwrap();
        storage.delete(clip_id).await.unwrap();

        assert!(!storage.exists(clip_id).await);
    }
}
