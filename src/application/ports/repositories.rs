//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::set::{GenerationRecord, VoiceMessage, VoiceSet};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Set Repository
// ============================================================================

/// 语音集实体（用于持久化）
#[derive(Debug, Clone)]
pub struct SetRecord {
    pub id: Uuid,
    pub name: String,
    pub selected_voice_id: String,
    pub message_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&VoiceSet> for SetRecord {
    fn from(set: &VoiceSet) -> Self {
        Self {
            id: *set.id().as_uuid(),
            name: set.name().as_str().to_string(),
            selected_voice_id: set.selected_voice().as_str().to_string(),
            message_count: set.message_count(),
            created_at: set.created_at(),
            updated_at: set.updated_at(),
        }
    }
}

/// Set Repository Port
#[async_trait]
pub trait SetRepositoryPort: Send + Sync {
    /// 保存语音集（upsert）
    async fn save(&self, set: &SetRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找语音集
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SetRecord>, RepositoryError>;

    /// 获取所有语音集（按更新时间倒序）
    async fn find_all(&self) -> Result<Vec<SetRecord>, RepositoryError>;

    /// 删除语音集
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// 最近一次生成的元数据（用于持久化）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationMeta {
    /// 生成时使用的文本
    pub text: String,
    /// 生成时使用的音色 ID
    pub voice_id: String,
    /// 生成音频的存储标识
    pub clip_id: Uuid,
    /// 音频时长（毫秒）
    pub duration_ms: Option<u64>,
}

impl From<&GenerationRecord> for GenerationMeta {
    fn from(record: &GenerationRecord) -> Self {
        Self {
            text: record.text.clone(),
            voice_id: record.voice_id.as_str().to_string(),
            clip_id: *record.clip_id.as_uuid(),
            duration_ms: record.duration_ms,
        }
    }
}

/// 语音消息实体（用于持久化）
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: Uuid,
    pub set_id: Uuid,
    pub position: u32,
    pub current_text: String,
    pub last_generation: Option<GenerationMeta>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageRecord {
    /// 从领域实体构建记录
    pub fn from_entity(set_id: Uuid, message: &VoiceMessage) -> Self {
        Self {
            id: *message.id().as_uuid(),
            set_id,
            position: message.position().value(),
            current_text: message.current_text().as_str().to_string(),
            last_generation: message.last_generation().map(GenerationMeta::from),
            created_at: message.created_at(),
            updated_at: message.updated_at(),
        }
    }

}

/// Message Repository Port
#[async_trait]
pub trait MessageRepositoryPort: Send + Sync {
    /// 保存消息（upsert）
    async fn save(&self, message: &MessageRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找消息
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageRecord>, RepositoryError>;

    /// 获取语音集的所有消息（按 position 升序）
    async fn find_by_set(&self, set_id: Uuid) -> Result<Vec<MessageRecord>, RepositoryError>;

    /// 删除消息
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 删除语音集的所有消息，返回删除数量
    async fn delete_by_set(&self, set_id: Uuid) -> Result<usize, RepositoryError>;

    /// 位置压缩：把指定位置之后的消息整体前移一位
    async fn shift_positions_after(
        &self,
        set_id: Uuid,
        position: u32,
    ) -> Result<usize, RepositoryError>;
}

// ============================================================================
// Credential Repository
// ============================================================================

/// 加密凭据实体（用于持久化）
///
/// ciphertext/nonce 由 ApiKeyVault 写入，仓储不理解其内容
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// 凭据名（如 "elevenlabs_api_key"）
    pub name: String,
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

/// Credential Repository Port
#[async_trait]
pub trait CredentialRepositoryPort: Send + Sync {
    /// 保存凭据（upsert）
    async fn save(&self, credential: &CredentialRecord) -> Result<(), RepositoryError>;

    /// 按名称查找凭据
    async fn find_by_name(&self, name: &str) -> Result<Option<CredentialRecord>, RepositoryError>;

    /// 删除凭据
    async fn delete(&self, name: &str) -> Result<(), RepositoryError>;
}
