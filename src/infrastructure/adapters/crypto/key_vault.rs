//! AES Key Vault - API key 加密存取实现
//!
//! 实现 ApiKeyVaultPort trait
//!
//! 方案：AES-256-GCM；密钥由环境密钥经 SHA-256 派生，
//! 每次加密使用新的 12 字节随机 nonce，密文与 nonce 一起落库。

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::application::ports::{
    ApiKeyVaultError, ApiKeyVaultPort, CredentialRecord, CredentialRepositoryPort,
};

/// 环境变量：加密密钥材料
pub const ENCRYPTION_SECRET_ENV: &str = "VOSET_ENCRYPTION_SECRET";

/// 凭据在 credentials 表中的名称
const CREDENTIAL_NAME: &str = "elevenlabs_api_key";

/// GCM nonce 长度（字节）
const NONCE_LEN: usize = 12;

/// AES Key Vault
pub struct AesKeyVault {
    cipher: Aes256Gcm,
    credential_repo: Arc<dyn CredentialRepositoryPort>,
}

impl AesKeyVault {
    /// 用给定密钥材料创建 Vault
    pub fn new(
        secret: &str,
        credential_repo: Arc<dyn CredentialRepositoryPort>,
    ) -> Result<Self, ApiKeyVaultError> {
        if secret.is_empty() {
            return Err(ApiKeyVaultError::EncryptionFailed(
                "encryption secret is empty".to_string(),
            ));
        }

        // SHA-256(secret) → 32 字节 AES-256 密钥
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&digest);

        Ok(Self {
            cipher: Aes256Gcm::new(key),
            credential_repo,
        })
    }

    /// 从环境变量读取密钥材料创建 Vault
    pub fn from_env(
        credential_repo: Arc<dyn CredentialRepositoryPort>,
    ) -> Result<Self, ApiKeyVaultError> {
        let secret = std::env::var(ENCRYPTION_SECRET_ENV).map_err(|_| {
            ApiKeyVaultError::EncryptionFailed(format!("{} is not set", ENCRYPTION_SECRET_ENV))
        })?;
        Self::new(&secret, credential_repo)
    }
}

#[async_trait]
impl ApiKeyVaultPort for AesKeyVault {
    async fn store(&self, api_key: &str) -> Result<(), ApiKeyVaultError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, api_key.as_bytes())
            .map_err(|e| ApiKeyVaultError::EncryptionFailed(e.to_string()))?;

        self.credential_repo
            .save(&CredentialRecord {
                name: CREDENTIAL_NAME.to_string(),
                ciphertext,
                nonce: nonce.to_vec(),
                updated_at: Utc::now(),
            })
            .await
            .map_err(|e| ApiKeyVaultError::StorageError(e.to_string()))?;

        Ok(())
    }

    async fn load(&self) -> Result<Option<String>, ApiKeyVaultError> {
        let Some(record) = self
            .credential_repo
            .find_by_name(CREDENTIAL_NAME)
            .await
            .map_err(|e| ApiKeyVaultError::StorageError(e.to_string()))?
        else {
            return Ok(None);
        };

        if record.nonce.len() != NONCE_LEN {
            return Err(ApiKeyVaultError::DecryptionFailed(format!(
                "unexpected nonce length: {}",
                record.nonce.len()
            )));
        }

        let nonce = Nonce::from_slice(&record.nonce);
        let plaintext = self
            .cipher
            .decrypt(nonce, record.ciphertext.as_ref())
            .map_err(|e| ApiKeyVaultError::DecryptionFailed(e.to_string()))?;

        let api_key = String::from_utf8(plaintext)
            .map_err(|e| ApiKeyVaultError::DecryptionFailed(e.to_string()))?;

        Ok(Some(api_key))
    }

    async fn is_configured(&self) -> Result<bool, ApiKeyVaultError> {
        let record = self
            .credential_repo
            .find_by_name(CREDENTIAL_NAME)
            .await
            .map_err(|e| ApiKeyVaultError::StorageError(e.to_string()))?;
        Ok(record.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteCredentialRepository,
    };

    async fn test_repo() -> Arc<SqliteCredentialRepository> {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Arc::new(SqliteCredentialRepository::new(pool))
    }

    #[tokio::test]
    async fn test_round_trip() {
        let repo = test_repo().await;
        let vault = AesKeyVault::new("test-secret", repo).unwrap();

        assert!(!vault.is_configured().await.unwrap());
        assert_eq!(vault.load().await.unwrap(), None);

        vault.store("sk-very-secret").await.unwrap();

        assert!(vault.is_configured().await.unwrap());
        assert_eq!(vault.load().await.unwrap().as_deref(), Some("sk-very-secret"));
    }

    #[tokio::test]
    async fn test_store_overwrites_with_fresh_nonce() {
        let repo = test_repo().await;
        let vault = AesKeyVault::new("test-secret", repo.clone()).unwrap();

        vault.store("first").await.unwrap();
        let first = repo.find_by_name("elevenlabs_api_key").await.unwrap().unwrap();

        vault.store("second").await.unwrap();
        let second = repo.find_by_name("elevenlabs_api_key").await.unwrap().unwrap();

        assert_ne!(first.nonce, second.nonce);
        assert_eq!(vault.load().await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_wrong_secret_fails_decryption() {
        let repo = test_repo().await;

        let vault = AesKeyVault::new("secret-a", repo.clone()).unwrap();
        vault.store("sk-key").await.unwrap();

        let other = AesKeyVault::new("secret-b", repo).unwrap();
        assert!(matches!(
            other.load().await,
            Err(ApiKeyVaultError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_empty_secret_rejected() {
        // new() 在触达仓储之前就拒绝空密钥
        struct NoopRepo;
        #[async_trait]
        impl CredentialRepositoryPort for NoopRepo {
            async fn save(
                &self,
                _credential: &CredentialRecord,
            ) -> Result<(), crate::application::ports::RepositoryError> {
                Ok(())
            }
            async fn find_by_name(
                &self,
                _name: &str,
            ) -> Result<Option<CredentialRecord>, crate::application::ports::RepositoryError>
            {
                Ok(None)
            }
            async fn delete(
                &self,
                _name: &str,
            ) -> Result<(), crate::application::ports::RepositoryError> {
                Ok(())
            }
        }

        assert!(AesKeyVault::new("", Arc::new(NoopRepo)).is_err());
    }
}
