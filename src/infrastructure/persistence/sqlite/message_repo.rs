//! SQLite Message Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{
    GenerationMeta, MessageRecord, MessageRepositoryPort, RepositoryError,
};

/// SQLite Message Repository
pub struct SqliteMessageRepository {
    pool: DbPool,
}

impl SqliteMessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, set_id, position, current_text, gen_text, gen_voice_id, gen_clip_id, gen_duration_ms, created_at, updated_at";

#[derive(FromRow)]
struct MessageRow {
    id: String,
    set_id: String,
    position: i64,
    current_text: String,
    gen_text: Option<String>,
    gen_voice_id: Option<String>,
    gen_clip_id: Option<String>,
    gen_duration_ms: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<MessageRow> for MessageRecord {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        // gen_* 列整组出现：text/voice/clip 任一缺失都视为无生成记录
        let last_generation = match (row.gen_text, row.gen_voice_id, row.gen_clip_id) {
            (Some(text), Some(voice_id), Some(clip_id)) => Some(GenerationMeta {
                text,
                voice_id,
                clip_id: Uuid::parse_str(&clip_id)
                    .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
                duration_ms: row.gen_duration_ms.map(|d| d as u64),
            }),
            _ => None,
        };

        Ok(MessageRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            set_id: Uuid::parse_str(&row.set_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            position: row.position as u32,
            current_text: row.current_text,
            last_generation,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

#[async_trait]
impl MessageRepositoryPort for SqliteMessageRepository {
    async fn save(&self, message: &MessageRecord) -> Result<(), RepositoryError> {
        let (gen_text, gen_voice_id, gen_clip_id, gen_duration_ms) =
            match &message.last_generation {
                Some(meta) => (
                    Some(meta.text.clone()),
                    Some(meta.voice_id.clone()),
                    Some(meta.clip_id.to_string()),
                    meta.duration_ms.map(|d| d as i64),
                ),
                None => (None, None, None, None),
            };

        sqlx::query(
            r#"
            INSERT INTO voice_messages
                (id, set_id, position, current_text, gen_text, gen_voice_id, gen_clip_id, gen_duration_ms, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                position = excluded.position,
                current_text = excluded.current_text,
                gen_text = excluded.gen_text,
                gen_voice_id = excluded.gen_voice_id,
                gen_clip_id = excluded.gen_clip_id,
                gen_duration_ms = excluded.gen_duration_ms,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.set_id.to_string())
        .bind(message.position as i64)
        .bind(&message.current_text)
        .bind(gen_text)
        .bind(gen_voice_id)
        .bind(gen_clip_id)
        .bind(gen_duration_ms)
        .bind(message.created_at.to_rfc3339())
        .bind(message.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageRecord>, RepositoryError> {
        let sql = format!("SELECT {} FROM voice_messages WHERE id = ?", SELECT_COLUMNS);
        let row: Option<MessageRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(MessageRecord::try_from).transpose()
    }

    async fn find_by_set(&self, set_id: Uuid) -> Result<Vec<MessageRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM voice_messages WHERE set_id = ? ORDER BY position ASC",
            SELECT_COLUMNS
        );
        let rows: Vec<MessageRow> = sqlx::query_as(&sql)
            .bind(set_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(MessageRecord::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM voice_messages WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn delete_by_set(&self, set_id: Uuid) -> Result<usize, RepositoryError> {
        let result = sqlx::query("DELETE FROM voice_messages WHERE set_id = ?")
            .bind(set_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() as usize)
    }

    async fn shift_positions_after(
        &self,
        set_id: Uuid,
        position: u32,
    ) -> Result<usize, RepositoryError> {
        let result = sqlx::query(
            "UPDATE voice_messages SET position = position - 1 WHERE set_id = ? AND position > ?",
        )
        .bind(set_id.to_string())
        .bind(position as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn test_pool() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn sample_message(set_id: Uuid, position: u32) -> MessageRecord {
        MessageRecord {
            id: Uuid::new_v4(),
            set_id,
            position,
            current_text: format!("Message {}", position),
            last_generation: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find_without_generation() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        let message = sample_message(Uuid::new_v4(), 1);

        repo.save(&message).await.unwrap();

        let found = repo.find_by_id(message.id).await.unwrap().unwrap();
        assert_eq!(found.position, 1);
        assert!(found.last_generation.is_none());
    }

    #[tokio::test]
    async fn test_generation_meta_round_trips() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        let mut message = sample_message(Uuid::new_v4(), 1);
        let clip_id = Uuid::new_v4();
        message.last_generation = Some(GenerationMeta {
            text: "Hello".to_string(),
            voice_id: "iP95p4xoKVk53GoZ742B".to_string(),
            clip_id,
            duration_ms: Some(1234),
        });

        repo.save(&message).await.unwrap();

        let found = repo.find_by_id(message.id).await.unwrap().unwrap();
        let meta = found.last_generation.unwrap();
        assert_eq!(meta.clip_id, clip_id);
        assert_eq!(meta.duration_ms, Some(1234));
        assert_eq!(meta.text, "Hello");
    }

    #[tokio::test]
    async fn test_find_by_set_orders_by_position() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        let set_id = Uuid::new_v4();

        for position in [3, 1, 2] {
            repo.save(&sample_message(set_id, position)).await.unwrap();
        }

        let messages = repo.find_by_set(set_id).await.unwrap();
        let positions: Vec<u32> = messages.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_shift_positions_after_compacts_ordering() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        let set_id = Uuid::new_v4();

        let messages: Vec<MessageRecord> =
            (1..=4).map(|p| sample_message(set_id, p)).collect();
        for message in &messages {
            repo.save(message).await.unwrap();
        }

        // 删除位置 2，后续前移
        repo.delete(messages[1].id).await.unwrap();
        let shifted = repo.shift_positions_after(set_id, 2).await.unwrap();
        assert_eq!(shifted, 2);

        let remaining = repo.find_by_set(set_id).await.unwrap();
        let positions: Vec<u32> = remaining.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_delete_by_set() {
        let repo = SqliteMessageRepository::new(test_pool().await);
        let set_id = Uuid::new_v4();

        for position in 1..=3 {
            repo.save(&sample_message(set_id, position)).await.unwrap();
        }
        repo.save(&sample_message(Uuid::new_v4(), 1)).await.unwrap();

        let deleted = repo.delete_by_set(set_id).await.unwrap();
        assert_eq!(deleted, 3);
        assert!(repo.find_by_set(set_id).await.unwrap().is_empty());
    }
}
