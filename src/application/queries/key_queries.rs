//! Key Queries - API key 状态查询

/// 查询 API key 是否已配置（绝不回传明文）
#[derive(Debug, Clone)]
pub struct ApiKeyStatusQuery;
