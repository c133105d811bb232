//! Key Command Handlers

use std::sync::Arc;

use crate::application::commands::key_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::ApiKeyVaultPort;

/// StoreApiKey Handler - 加密保存上游 API key
///
/// 明文不落日志、不回传；HTTP 层只能看到 configured 标志
pub struct StoreApiKeyHandler {
    key_vault: Arc<dyn ApiKeyVaultPort>,
}

impl StoreApiKeyHandler {
    pub fn new(key_vault: Arc<dyn ApiKeyVaultPort>) -> Self {
        Self { key_vault }
    }

    pub async fn handle(
        &self,
        cmd: StoreApiKeyCommand,
    ) -> Result<StoreApiKeyResponse, ApplicationError> {
        if cmd.api_key.trim().is_empty() {
            return Err(ApplicationError::validation("API key cannot be empty"));
        }

        self.key_vault.store(cmd.api_key.trim()).await?;

        tracing::info!("API key stored");

        Ok(StoreApiKeyResponse { configured: true })
    }
}
