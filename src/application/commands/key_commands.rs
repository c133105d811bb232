//! Key Commands - API key 相关命令

/// 保存 API key 命令
#[derive(Debug, Clone)]
pub struct StoreApiKeyCommand {
    pub api_key: String,
}

/// 保存 API key 响应
#[derive(Debug, Clone)]
pub struct StoreApiKeyResponse {
    pub configured: bool,
}
