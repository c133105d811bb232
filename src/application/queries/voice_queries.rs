//! Voice Queries - 音色目录查询

/// 列出内置音色目录
#[derive(Debug, Clone)]
pub struct ListVoicesQuery;
