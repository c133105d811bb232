//! SQLite Set Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{RepositoryError, SetRecord, SetRepositoryPort};

/// SQLite Set Repository
pub struct SqliteSetRepository {
    pool: DbPool,
}

impl SqliteSetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SetRow {
    id: String,
    name: String,
    selected_voice_id: String,
    message_count: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SetRow> for SetRecord {
    type Error = RepositoryError;

    fn try_from(row: SetRow) -> Result<Self, Self::Error> {
        Ok(SetRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            name: row.name,
            selected_voice_id: row.selected_voice_id,
            message_count: row.message_count as u32,
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
impl SetRepositoryPort for SqliteSetRepository {
    async fn save(&self, set: &SetRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO voice_sets (id, name, selected_voice_id, message_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                selected_voice_id = excluded.selected_voice_id,
                message_count = excluded.message_count,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(set.id.to_string())
        .bind(&set.name)
        .bind(&set.selected_voice_id)
        .bind(set.message_count as i64)
        .bind(set.created_at.to_rfc3339())
        .bind(set.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SetRecord>, RepositoryError> {
        let row: Option<SetRow> = sqlx::query_as(
            "SELECT id, name, selected_voice_id, message_count, created_at, updated_at FROM voice_sets WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(SetRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<SetRecord>, RepositoryError> {
        let rows: Vec<SetRow> = sqlx::query_as(
            "SELECT id, name, selected_voice_id, message_count, created_at, updated_at FROM voice_sets ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(SetRecord::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM voice_sets WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
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

    fn sample_record() -> SetRecord {
        SetRecord {
            id: Uuid::new_v4(),
            name: "Intro lines".to_string(),
            selected_voice_id: "iP95p4xoKVk53GoZ742B".to_string(),
            message_count: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = SqliteSetRepository::new(test_pool().await);
        let record = sample_record();

        repo.save(&record).await.unwrap();

        let found = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Intro lines");
        assert_eq!(found.message_count, 1);
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let repo = SqliteSetRepository::new(test_pool().await);
        let mut record = sample_record();

        repo.save(&record).await.unwrap();
        record.name = "Renamed".to_string();
        record.message_count = 3;
        repo.save(&record).await.unwrap();

        let found = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Renamed");
        assert_eq!(found.message_count, 3);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = SqliteSetRepository::new(test_pool().await);
        let record = sample_record();

        repo.save(&record).await.unwrap();
        repo.delete(record.id).await.unwrap();

        assert!(repo.find_by_id(record.id).await.unwrap().is_none());
    }
}
