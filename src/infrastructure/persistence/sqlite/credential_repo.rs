//! SQLite Credential Repository
//!
//! 存储 Key Vault 产出的密文与 nonce，不理解其内容

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{CredentialRecord, CredentialRepositoryPort, RepositoryError};

/// SQLite Credential Repository
pub struct SqliteCredentialRepository {
    pool: DbPool,
}

impl SqliteCredentialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CredentialRow {
    name: String,
    ciphertext: Vec<u8>,
    nonce: Vec<u8>,
    updated_at: String,
}

impl TryFrom<CredentialRow> for CredentialRecord {
    type Error = RepositoryError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Ok(CredentialRecord {
            name: row.name,
            ciphertext: row.ciphertext,
            nonce: row.nonce,
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl CredentialRepositoryPort for SqliteCredentialRepository {
    async fn save(&self, credential: &CredentialRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO credentials (name, ciphertext, nonce, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                ciphertext = excluded.ciphertext,
                nonce = excluded.nonce,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&credential.name)
        .bind(&credential.ciphertext)
        .bind(&credential.nonce)
        .bind(credential.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CredentialRecord>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(
            "SELECT name, ciphertext, nonce, updated_at FROM credentials WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(CredentialRecord::try_from).transpose()
    }

    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM credentials WHERE name = ?")
            .bind(name)
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

    async fn test_repo() -> SqliteCredentialRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteCredentialRepository::new(pool)
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_value() {
        let repo = test_repo().await;

        repo.save(&CredentialRecord {
            name: "elevenlabs_api_key".to_string(),
            ciphertext: vec![1, 2, 3],
            nonce: vec![9; 12],
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

        repo.save(&CredentialRecord {
            name: "elevenlabs_api_key".to_string(),
            ciphertext: vec![4, 5, 6],
            nonce: vec![8; 12],
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

        let found = repo.find_by_name("elevenlabs_api_key").await.unwrap().unwrap();
        assert_eq!(found.ciphertext, vec![4, 5, 6]);
        assert_eq!(found.nonce, vec![8; 12]);
    }

    #[tokio::test]
    async fn test_missing_credential_is_none() {
        let repo = test_repo().await;
        assert!(repo.find_by_name("nope").await.unwrap().is_none());
    }
}
