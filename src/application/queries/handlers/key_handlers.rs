//! Key Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::ApiKeyVaultPort;
use crate::application::queries::ApiKeyStatusQuery;

/// API key 状态响应
#[derive(Debug, Clone)]
pub struct ApiKeyStatusResponse {
    pub configured: bool,
}

/// ApiKeyStatus Handler - 只报告有无，不解密
pub struct ApiKeyStatusHandler {
    key_vault: Arc<dyn ApiKeyVaultPort>,
}

impl ApiKeyStatusHandler {
    pub fn new(key_vault: Arc<dyn ApiKeyVaultPort>) -> Self {
        Self { key_vault }
    }

    pub async fn handle(
        &self,
        _query: ApiKeyStatusQuery,
    ) -> Result<ApiKeyStatusResponse, ApplicationError> {
        let configured = self.key_vault.is_configured().await?;
        Ok(ApiKeyStatusResponse { configured })
    }
}
